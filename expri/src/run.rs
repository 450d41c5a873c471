use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::Path,
    process::ExitCode,
    rc::Rc,
};

use expr_core::{
    eval::prelude::{Evaluator, Limits},
    interpreter::prelude::Interpreter,
    lexer::prelude::Lexer,
    parser::prelude::{Expression, Parser, Statements},
    utils::prelude::{Error, SourceFile, WarningEmitter},
};
use utf8_chars::BufReadCharsExt;

use crate::{
    cli::{print_aborted, print_error, print_finished, print_running},
    signal::Signals,
    ConsoleWarningEmitter,
};

/// Text read so far, kept so diagnostics can quote it.
pub type CapturedSource = Rc<RefCell<String>>;

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    Ok(BufReader::new(File::open(path)?))
}

/// Streams the characters of `reader`, recording them in `captured`. A read
/// error ends the stream and is left in `failure`.
fn capture<'a>(
    reader: &'a mut BufReader<File>,
    captured: CapturedSource,
    failure: Rc<RefCell<Option<Error>>>,
) -> impl Iterator<Item = char> + 'a {
    reader.chars().map_while(move |ch| match ch {
        Ok(ch) => {
            captured.borrow_mut().push(ch);
            Some(ch)
        },
        Err(err) => {
            *failure.borrow_mut() = Some(err.into());
            None
        }
    })
}

/// Executes a file statement by statement, printing every result.
pub fn run(path: &Path, limits: Limits) -> ExitCode {
    let mut reader = match open(path) {
        Ok(reader) => reader,
        Err(err) => {
            print_error(&err, None);
            return ExitCode::FAILURE;
        }
    };

    let signals = Signals::install_or_default();

    let src = CapturedSource::default();
    let failure = Rc::new(RefCell::new(None));

    let warnings = Rc::new(ConsoleWarningEmitter::file(path, src.clone()));

    let evaluator = Evaluator::new()
        .with_limits(limits)
        .with_warnings(WarningEmitter::new(warnings))
        .with_interrupt(signals.interrupt());

    let mut interpreter = Interpreter::with_evaluator(
        capture(&mut reader, src.clone(), failure.clone()),
        evaluator
    );

    print_running(&path.display().to_string());
    let start = std::time::Instant::now();

    while let Some(statement) = interpreter.next_statement() {
        match signals.evaluating(|| interpreter.evaluate(&statement)) {
            Ok(value) => println!("{value}"),
            Err(err) => {
                let src = src.borrow();
                print_error(&err, Some(SourceFile { path, src: &src }));

                if err.is_fatal() {
                    print_aborted(&path.display().to_string());
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    if let Some(err) = failure.borrow_mut().take() {
        print_error(&err, None);
        return ExitCode::FAILURE;
    }

    print_finished(std::time::Instant::now() - start);

    ExitCode::SUCCESS
}

/// Dumps one S-expression per statement, stopping at the first statement
/// that does not parse.
pub fn print(path: &Path, limits: Limits) -> ExitCode {
    let mut reader = match open(path) {
        Ok(reader) => reader,
        Err(err) => {
            print_error(&err, None);
            return ExitCode::FAILURE;
        }
    };

    let src = CapturedSource::default();
    let failure = Rc::new(RefCell::new(None));

    let chars = capture(&mut reader, src.clone(), failure.clone());
    let parser = Parser::new(Lexer::new(chars)).with_max_depth(limits.max_nesting_depth);

    for statement in Statements::new(parser) {
        if let Expression::Invalid(error) = &statement {
            let src = src.borrow();
            print_error(&Error::Parse(error.clone()), Some(SourceFile { path, src: &src }));

            return ExitCode::FAILURE;
        }

        println!("{statement}");
    }

    if let Some(err) = failure.borrow_mut().take() {
        print_error(&err, None);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
