use expr_core::lexer::prelude::Lexer;

use crate::console::read_command;

pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	while let Some(input) = read_command(&stdin)? {
		for token in Lexer::new(input.chars()) {
			println!("{token}");
		}
	}

	Ok(())
}
