use crate::lexer::prelude::{Lexer, Token};
use super::ast::Expression;
use super::parser::Parser;

/// Yields one statement per call; malformed statements come back as
/// [`Expression::Invalid`] and the stream carries on with the next line.
pub struct Statements<T: Iterator<Item = Token>> {
    parser: Parser<T>,
}

impl<T: Iterator<Item = Token>> Statements<T> {
    pub fn new(parser: Parser<T>) -> Self {
        Self { parser }
    }
}

impl<T: Iterator<Item = Token>> Iterator for Statements<T> {
    type Item = Expression;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.parse_statement()
    }
}

pub fn statements<I: Iterator<Item = char>>(input: I) -> Statements<Lexer<I>> {
    Statements::new(Parser::new(Lexer::new(input)))
}

pub fn parse_program(src: &str) -> Vec<Expression> {
    statements(src.chars()).collect()
}
