use std::fmt::Display;

/// Byte range of a lexeme plus the line and column where it starts.
/// Lines and columns count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SrcSpan {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl SrcSpan {
	pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
		Self { start, end, line, column }
	}

	pub fn point(offset: u32, line: u32, column: u32) -> Self {
		Self::new(offset, offset, line, column)
	}

	/// Span covering `self` through the end of `other`, positioned at `self`.
	pub fn to(self, other: SrcSpan) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
			line: self.line,
			column: self.column,
		}
	}
}

impl Display for SrcSpan {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "line {}, column {}", self.line, self.column)
	}
}
