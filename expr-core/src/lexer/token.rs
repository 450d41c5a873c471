use std::fmt::Display;

use crate::utils::prelude::SrcSpan;

pub const KEYWORDS: [&str; 7] = ["exit", "true", "false", "if", "end", "while", "def"];

/// Characters that fuse into a single operator lexeme when adjacent.
pub const OPERATOR_CHARS: [char; 12] = ['+', '-', '*', '/', '=', '!', '|', '&', '(', ')', '<', '>'];

/// Characters that always form a lexeme of their own, even inside an
/// operator run.
pub const SPLIT_CHARS: [char; 2] = [',', ')'];

/// Binding power of `)` and `,`: never enough to continue an expression.
pub const CLOSING_BINDING_POWER: i32 = 0;

/// Operators with no table entry always reach the infix handler, which
/// rejects them.
pub const UNKNOWN_OPERATOR_BINDING_POWER: i32 = i32::MAX;

/// Invalid tokens never parse as infix.
pub const INVALID_BINDING_POWER: i32 = i32::MIN;

pub fn is_keyword(word: &str) -> bool {
	KEYWORDS.contains(&word)
}

pub fn is_operator_char(ch: char) -> bool {
	OPERATOR_CHARS.contains(&ch)
}

/// Left binding power of an operator lexeme. Higher binds tighter.
pub fn binding_power(operator: &str) -> Option<i32> {
	Some(match operator {
		")" | "," => CLOSING_BINDING_POWER,
		"=" => 10,
		"||" => 20,
		"&&" => 30,
		"==" | "!=" => 40,
		"<" | ">" => 45,
		"+" | "-" => 50,
		"*" | "/" => 60,
		"(" => 70,
		_ => return None
	})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	Identifier,
	Number,
	Operator,
	Delimiter,
	Keyword,
	Invalid,
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kind = match self {
			TokenKind::Identifier => "Identifier",
			TokenKind::Number => "Number",
			TokenKind::Operator => "Operator",
			TokenKind::Delimiter => "Delimiter",
			TokenKind::Keyword => "Keyword",
			TokenKind::Invalid => "Invalid",
		};

		write!(f, "{kind}")
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	pub text: String,
	pub span: SrcSpan,
	/// Left binding power, fixed at construction.
	pub lbp: i32,
}

impl Token {
	pub fn new(kind: TokenKind, text: impl Into<String>, span: SrcSpan) -> Self {
		let text = text.into();

		let lbp = match kind {
			TokenKind::Operator => binding_power(&text).unwrap_or(UNKNOWN_OPERATOR_BINDING_POWER),
			TokenKind::Invalid => INVALID_BINDING_POWER,
			TokenKind::Identifier
			| TokenKind::Number
			| TokenKind::Keyword
			| TokenKind::Delimiter => 0,
		};

		Self { kind, text, span, lbp }
	}

	pub fn line(&self) -> u32 {
		self.span.line
	}

	pub fn column(&self) -> u32 {
		self.span.column
	}

	pub fn is_keyword(&self, keyword: &str) -> bool {
		self.kind == TokenKind::Keyword && self.text == keyword
	}

	pub fn is_operator(&self, operator: &str) -> bool {
		self.kind == TokenKind::Operator && self.text == operator
	}

	pub fn is_delimiter(&self) -> bool {
		self.kind == TokenKind::Delimiter
	}

	/// Tokens that close a statement: a newline, or the `end` of the
	/// enclosing block.
	pub fn ends_statement(&self) -> bool {
		self.is_delimiter() || self.is_keyword("end")
	}

	/// Human-readable name used in diagnostics.
	pub fn describe(&self) -> String {
		match self.kind {
			TokenKind::Delimiter => "end of line".to_string(),
			TokenKind::Keyword => format!("the keyword `{}`", self.text),
			TokenKind::Number => format!("the number `{}`", self.text),
			TokenKind::Identifier => format!("the identifier `{}`", self.text),
			TokenKind::Operator | TokenKind::Invalid => format!("`{}`", self.text),
		}
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let text = if self.is_delimiter() { "\\n" } else { self.text.as_str() };

		write!(f, "{}: \"{}\" Line: {} Column: {}", self.kind, text, self.line(), self.column())
	}
}
