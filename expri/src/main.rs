mod cli;
mod console;
mod repl;
mod rlpl;
mod rppl;
mod run;
mod signal;

use std::{path::{Path, PathBuf}, process::ExitCode};

use clap::{Parser, Subcommand};
use expr_core::{
    eval::prelude::{Limits, DEFAULT_MAX_CALL_DEPTH},
    parser::prelude::DEFAULT_MAX_NESTING_DEPTH,
    utils::prelude::{Error, SourceFile, Warning, WarningEmitterIO},
};
use run::CapturedSource;

#[derive(Parser)]
#[command(version, about = "Interpreter for a small line oriented expression language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Maximum depth of nested function calls
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
    /// Maximum nesting of operators, groups and blocks within a statement
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    max_nesting_depth: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Runs a source file, printing the value of every statement
    Run {
        /// Path of source file
        path: PathBuf,
    },
    /// Prints the syntax tree of every statement in a source file
    Print {
        /// Path of source file
        path: PathBuf,
    },
    /// Starts the interactive interpreter (the default)
    Repl,
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let limits = Limits {
        max_call_depth: cli.max_call_depth,
        max_nesting_depth: cli.max_nesting_depth,
    };

    match cli.command.unwrap_or(Command::Repl) {
        Command::Run { path } => run::run(&path, limits),
        Command::Print { path } => run::print(&path, limits),
        Command::Repl => repl::start(limits),
        Command::Rlpl => exit_code(rlpl::start()),
        Command::Rppl => exit_code(rppl::start()),
    }
}

fn exit_code(result: std::io::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cli::print_error(&Error::from(err), None);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, and only when `RUST_LOG` asks for them.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Prints warnings to stderr, quoting the script when there is one.
#[derive(Debug, Clone)]
pub struct ConsoleWarningEmitter {
    source: Option<(PathBuf, CapturedSource)>,
}

impl ConsoleWarningEmitter {
    pub fn console() -> Self {
        Self { source: None }
    }

    pub fn file(path: &Path, src: CapturedSource) -> Self {
        Self { source: Some((path.to_path_buf(), src)) }
    }
}

impl WarningEmitterIO for ConsoleWarningEmitter {
    fn emit_warning(&self, warning: Warning) {
        let buffer_writer = crate::cli::stderr_buffer_writer();
        let mut buffer = buffer_writer.buffer();

        match &self.source {
            Some((path, src)) => {
                let src = src.borrow();
                warning.pretty(&mut buffer, Some(SourceFile { path: path.as_path(), src: &src }));
            },
            None => warning.pretty(&mut buffer, None),
        }

        buffer_writer
            .print(&buffer)
            .expect("Writing warning to stderr");
    }
}
