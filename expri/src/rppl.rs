use expr_core::parser::prelude::{statements, Expression};

use crate::console::read_command;

pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	while let Some(input) = read_command(&stdin)? {
		for statement in statements(input.chars()) {
			match statement {
				Expression::Invalid(err) => {
					let (title, hints) = err.details();

					println!("Parse error: {title}: {err}.");
					for hint in hints {
						println!("\t{hint}");
					}
				},
				statement => println!("{statement}"),
			}
		}
	}

	Ok(())
}
