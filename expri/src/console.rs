use std::{cell::Cell, collections::VecDeque, io::Write, rc::Rc};

pub const PROMPT: &str = ">> ";
pub const CONTINUATION_PROMPT: &str = ".. ";

/// Characters typed at the terminal, one line read per prompt.
///
/// A line is only read when the interpreter asks for a character past the
/// end of the previous one, so each statement is evaluated as soon as its
/// line is complete.
pub struct ConsoleSource {
	stdin: std::io::Stdin,
	buffer: VecDeque<char>,
	/// Set by the driver once a statement completed; the next line then gets
	/// the primary prompt instead of the continuation one.
	fresh: Rc<Cell<bool>>,
	done: bool,
}

impl ConsoleSource {
	pub fn new(fresh: Rc<Cell<bool>>) -> Self {
		Self {
			stdin: std::io::stdin(),
			buffer: VecDeque::new(),
			fresh,
			done: false,
		}
	}

	fn read_line(&mut self) -> std::io::Result<usize> {
		let prompt = if self.fresh.get() { PROMPT } else { CONTINUATION_PROMPT };

		print!("{prompt}");
		std::io::stdout().flush()?;

		let mut line = String::new();
		let read = self.stdin.read_line(&mut line)?;

		if !line.trim().is_empty() {
			self.fresh.set(false);
		}

		self.buffer.extend(line.chars());

		Ok(read)
	}
}

impl Iterator for ConsoleSource {
	type Item = char;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(ch) = self.buffer.pop_front() {
			return Some(ch);
		}

		if self.done {
			return None;
		}

		match self.read_line() {
			Ok(0) | Err(_) => {
				self.done = true;
				println!();
				None
			},
			Ok(_) => self.buffer.pop_front(),
		}
	}
}

/// Prompts until a non-blank line arrives. `None` on end of input or `.exit`.
pub fn read_command(stdin: &std::io::Stdin) -> std::io::Result<Option<String>> {
	loop {
		print!("{PROMPT}");
		std::io::stdout().flush()?;

		let mut line = String::new();
		if stdin.read_line(&mut line)? == 0 {
			return Ok(None);
		}

		match line.trim_end_matches(['\n', '\r']) {
			"" => continue,
			".exit" => return Ok(None),
			command => return Ok(Some(command.to_owned())),
		}
	}
}
