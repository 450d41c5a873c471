use std::fmt::Display;

use crate::{lexer::prelude::{Token, TokenKind}, utils::prelude::SrcSpan};
use super::error::ParseError;

/// One parsed statement. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Number, identifier reference or boolean keyword.
    Leaf(Token),
    Unary {
        operator: Token,
        operand: Box<Expression>,
    },
    Binary {
        operator: Token,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `if` or `while`, told apart by the keyword.
    Block {
        keyword: Token,
        condition: Box<Expression>,
        body: Vec<Expression>,
    },
    FuncDef {
        name: Token,
        params: Vec<Token>,
        body: Vec<Expression>,
    },
    FuncCall {
        name: Token,
        arguments: Vec<Expression>,
    },
    /// A statement the parser gave up on.
    Invalid(ParseError),
}

impl Expression {
    /// True for a statement that is exactly the `exit` keyword.
    pub fn is_exit(&self) -> bool {
        matches!(self, Expression::Leaf(token) if token.is_keyword("exit"))
    }

    /// Name of the variable when the expression is a plain identifier.
    pub fn as_identifier(&self) -> Option<&Token> {
        match self {
            Expression::Leaf(token) if token.kind == TokenKind::Identifier => Some(token),
            _ => None
        }
    }

    pub fn span(&self) -> SrcSpan {
        match self {
            Expression::Leaf(token) => token.span,
            Expression::Unary { operator, operand } => operator.span.to(operand.span()),
            Expression::Binary { left, right, .. } => left.span().to(right.span()),
            Expression::Block { keyword, condition, body } => {
                let span = keyword.span.to(condition.span());
                body.last().map_or(span, |last| span.to(last.span()))
            },
            Expression::FuncDef { name, params, body } => {
                let span = params.last().map_or(name.span, |param| name.span.to(param.span));
                body.last().map_or(span, |last| span.to(last.span()))
            },
            Expression::FuncCall { name, arguments } => {
                arguments.last().map_or(name.span, |last| name.span.to(last.span()))
            },
            Expression::Invalid(error) => error.span,
        }
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Leaf(token) => write!(f, "{}", token.text),
            Expression::Unary { operator, operand } => write!(f, "({} {})", operator.text, operand),
            Expression::Binary { operator, left, right } => {
                write!(f, "({} {} {})", operator.text, left, right)
            },
            Expression::Block { keyword, condition, body } => {
                write!(f, "({} {} ({}))", keyword.text, condition, join(body))
            },
            Expression::FuncDef { name, params, body } => {
                let params = params.iter()
                    .map(|param| param.text.as_str())
                    .collect::<Vec<&str>>()
                    .join(" ");

                write!(f, "(def {} ({}) ({}))", name.text, params, join(body))
            },
            Expression::FuncCall { name, arguments } => {
                if arguments.is_empty() {
                    write!(f, "(call {})", name.text)
                } else {
                    write!(f, "(call {} {})", name.text, join(arguments))
                }
            },
            Expression::Invalid(error) => write!(f, "(invalid {error})"),
        }
    }
}
