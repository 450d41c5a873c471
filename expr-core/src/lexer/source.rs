use std::iter::Fuse;

use crate::utils::prelude::SrcSpan;

/// Forward-only cursor over a character supply.
///
/// The current character is pulled lazily: `advance` only drops it, and the
/// next `current` call asks the supply for a new one. An interactive supply
/// is therefore never asked for more input than the lexer needs to finish
/// the token it is working on.
#[derive(Debug)]
pub struct CharSource<I: Iterator<Item = char>> {
	input: Fuse<I>,
	current: Option<Option<char>>,
	offset: u32,
	line: u32,
	column: u32,
}

impl<I: Iterator<Item = char>> CharSource<I> {
	pub fn new(input: I) -> Self {
		Self {
			input: input.fuse(),
			current: None,
			offset: 0,
			line: 1,
			column: 1,
		}
	}

	pub fn current(&mut self) -> Option<char> {
		match self.current {
			Some(ch) => ch,
			None => {
				let ch = self.input.next();
				self.current = Some(ch);
				ch
			}
		}
	}

	/// Consumes the current character and returns it.
	pub fn advance(&mut self) -> Option<char> {
		let ch = self.current()?;
		self.current = None;

		self.offset += ch.len_utf8() as u32;

		if ch == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}

		Some(ch)
	}

	pub fn line(&self) -> u32 {
		self.line
	}

	pub fn column(&self) -> u32 {
		self.column
	}

	pub fn offset(&self) -> u32 {
		self.offset
	}

	/// Zero-width span at the cursor.
	pub fn position(&self) -> SrcSpan {
		SrcSpan::point(self.offset, self.line, self.column)
	}
}
