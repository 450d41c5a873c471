use std::fmt::Display;

use tracing::trace;

use super::source::CharSource;
use super::token::{is_keyword, is_operator_char, Token, TokenKind, SPLIT_CHARS};

#[derive(Debug)]
pub struct Lexer<I: Iterator<Item = char>> {
	source: CharSource<I>,
}

impl<I: Iterator<Item = char>> Display for Lexer<I> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f,
			"Lexer {{\n\toffset: {},\n\tline: {}, column: {}\n}}",
			self.source.offset(), self.source.line(), self.source.column()
		)
	}
}

impl<I: Iterator<Item = char>> Lexer<I> {
	pub fn new(input: I) -> Self {
		Self {
			source: CharSource::new(input),
		}
	}

	/// Produces the next token, or `None` once the input is exhausted.
	///
	/// Never fails: a character that starts no lexeme becomes an
	/// [`TokenKind::Invalid`] token and the parser reports it.
	pub fn next_token(&mut self) -> Option<Token> {
		self.skip_whitespace();

		let token = match self.source.current()? {
			'\n' => self.eat_one_char(TokenKind::Delimiter),
			ch if SPLIT_CHARS.contains(&ch) => self.eat_one_char(TokenKind::Operator),
			ch if ch.is_alphabetic() || ch == '_' => self.lex_word(),
			ch if ch.is_ascii_digit() => self.lex_number(),
			ch if is_operator_char(ch) => self.lex_operator(),
			_ => self.eat_one_char(TokenKind::Invalid),
		};

		trace!(kind = %token.kind, text = ?token.text, line = token.line(), column = token.column(), "token");

		Some(token)
	}

	fn skip_whitespace(&mut self) {
		while matches!(self.source.current(), Some(' ' | '\t' | '\r')) {
			self.source.advance();
		}
	}

	fn eat_one_char(&mut self, kind: TokenKind) -> Token {
		let start = self.source.position();
		let text: String = self.source.advance().into_iter().collect();

		Token::new(kind, text, start.to(self.source.position()))
	}

	/// Consumes characters while `accept` holds for them.
	fn eat_while(&mut self, text: &mut String, mut accept: impl FnMut(char) -> bool) {
		while let Some(ch) = self.source.current() {
			if !accept(ch) {
				break;
			}

			text.push(ch);
			self.source.advance();
		}
	}

	fn lex_word(&mut self) -> Token {
		let start = self.source.position();
		let mut word = String::new();

		self.eat_while(&mut word, |ch| ch.is_alphanumeric() || ch == '_');

		let kind = if is_keyword(&word) {
			TokenKind::Keyword
		} else {
			TokenKind::Identifier
		};

		Token::new(kind, word, start.to(self.source.position()))
	}

	fn lex_number(&mut self) -> Token {
		let start = self.source.position();
		let mut value = String::new();
		let mut has_period = false;

		self.eat_while(&mut value, |ch| match ch {
			'0'..='9' => true,
			'.' if !has_period => {
				has_period = true;
				true
			},
			_ => false
		});

		Token::new(TokenKind::Number, value, start.to(self.source.position()))
	}

	fn lex_operator(&mut self) -> Token {
		let start = self.source.position();
		let mut operator = String::new();

		self.eat_while(&mut operator, |ch| is_operator_char(ch) && !SPLIT_CHARS.contains(&ch));

		Token::new(TokenKind::Operator, operator, start.to(self.source.position()))
	}
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
	type Item = Token;

	fn next(&mut self) -> Option<Self::Item> {
		self.next_token()
	}
}
