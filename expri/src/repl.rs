use std::{cell::Cell, process::ExitCode, rc::Rc};

use expr_core::{
	eval::prelude::{Evaluator, Limits},
	interpreter::prelude::Interpreter,
	utils::prelude::WarningEmitter,
};

use crate::{
	cli::print_error,
	console::ConsoleSource,
	signal::Signals,
	ConsoleWarningEmitter,
};

/// Interactive session. Ends on `exit`, end of input, Ctrl-C at the prompt
/// or a fatal error.
pub fn start(limits: Limits) -> ExitCode {
	let signals = Signals::install_or_default();
	let fresh = Rc::new(Cell::new(true));

	let evaluator = Evaluator::new()
		.with_limits(limits)
		.with_warnings(WarningEmitter::new(Rc::new(ConsoleWarningEmitter::console())))
		.with_interrupt(signals.interrupt());

	let mut interpreter = Interpreter::with_evaluator(ConsoleSource::new(fresh.clone()), evaluator);

	while let Some(statement) = interpreter.next_statement() {
		match signals.evaluating(|| interpreter.evaluate(&statement)) {
			Ok(value) => println!("{value}"),
			Err(err) => {
				print_error(&err, None);

				if err.is_fatal() {
					return ExitCode::FAILURE;
				}
			}
		}

		fresh.set(true);
	}

	ExitCode::SUCCESS
}
