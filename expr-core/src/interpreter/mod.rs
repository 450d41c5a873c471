
pub mod prelude {
    pub use super::{run_source, Interpreter, Outcome};
}

use crate::{
    environment::prelude::Value,
    eval::prelude::Evaluator,
    lexer::prelude::Lexer,
    parser::prelude::{Expression, Parser, Statements},
    utils::prelude::Error,
};

/// A statement together with what evaluating it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub statement: Expression,
    pub result: Result<Value, Error>,
}

/// Pulls statements from a character supply and evaluates them one by one
/// until the input ends or a statement is exactly `exit`.
pub struct Interpreter<I: Iterator<Item = char>> {
    statements: Statements<Lexer<I>>,
    evaluator: Evaluator,
    halted: bool,
}

impl<I: Iterator<Item = char>> Interpreter<I> {
    pub fn new(input: I) -> Self {
        Self::with_evaluator(input, Evaluator::new())
    }

    /// The parser takes its nesting limit from the evaluator's [`Limits`].
    ///
    /// [`Limits`]: crate::eval::prelude::Limits
    pub fn with_evaluator(input: I, evaluator: Evaluator) -> Self {
        let parser = Parser::new(Lexer::new(input))
            .with_max_depth(evaluator.limits().max_nesting_depth);

        Self {
            statements: Statements::new(parser),
            evaluator,
            halted: false,
        }
    }

    /// Next statement to evaluate. `exit` is never returned: it halts the
    /// stream before anything after it is read.
    pub fn next_statement(&mut self) -> Option<Expression> {
        if self.halted {
            return None;
        }

        match self.statements.next() {
            Some(statement) if statement.is_exit() => {
                self.halted = true;
                None
            },
            statement => statement,
        }
    }

    pub fn evaluate(&mut self, statement: &Expression) -> Result<Value, Error> {
        match statement {
            Expression::Invalid(error) => Err(Error::Parse(error.clone())),
            _ => Ok(self.evaluator.evaluate(statement)?),
        }
    }

    /// True once `exit` has been seen.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn into_evaluator(self) -> Evaluator {
        self.evaluator
    }
}

impl<I: Iterator<Item = char>> Iterator for Interpreter<I> {
    type Item = Outcome;

    fn next(&mut self) -> Option<Self::Item> {
        let statement = self.next_statement()?;
        let result = self.evaluate(&statement);

        Some(Outcome { statement, result })
    }
}

/// Evaluates a whole source text with a fresh evaluator.
pub fn run_source(src: &str) -> Vec<Result<Value, Error>> {
    Interpreter::new(src.chars())
        .map(|outcome| outcome.result)
        .collect()
}
