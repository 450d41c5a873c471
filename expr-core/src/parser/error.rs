use thiserror::Error;

use crate::utils::prelude::SrcSpan;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character `{ch}`")]
    UnexpectedCharacter { ch: String },
    #[error("unknown prefix operator: {found}")]
    UnknownPrefixOperator { found: String },
    #[error("unknown infix operator `{operator}`")]
    UnknownInfixOperator { operator: String },
    #[error("expected `)`, found {found}")]
    ExpectedClosingParen { found: String },
    #[error("expected `,` or `)`, found {found}")]
    ExpectedSeparator { found: String },
    #[error("expected end of line, found {found}")]
    ExpectedNewline { found: String },
    #[error("expected `end` to close `{keyword}`")]
    ExpectedEnd { keyword: String },
    #[error("expected a function name after `def`, found {found}")]
    ExpectedFunctionName { found: String },
    #[error("expected `(` to open the parameter list, found {found}")]
    ExpectedParameterList { found: String },
    #[error("function parameters must be identifiers, found {found}")]
    ParameterNotIdentifier { found: String },
    #[error("only a function name can be called")]
    CallTargetNotIdentifier,
    #[error("only a variable can be assigned to")]
    NotAnLValue,
    #[error("expected 1 or 2 entries in the list, found {count}")]
    ArgumentCount { count: usize },
    #[error("function `{name}` has an empty body")]
    EmptyFunctionBody { name: String },
    #[error("expression nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{error} at {span}")]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan
}

impl ParseError {
    pub fn new(error: ParseErrorType, span: SrcSpan) -> Self {
        Self { error, span }
    }

    /// Short title plus extra hint lines for diagnostics.
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::UnexpectedEof => ("Unexpected end of input", vec![]),
            ParseErrorType::UnexpectedCharacter { .. } => ("Unexpected character", vec![]),
            ParseErrorType::UnknownPrefixOperator { .. } => ("Expected expression", vec![]),
            ParseErrorType::UnknownInfixOperator { .. } => (
                "Unknown operator",
                vec!["Adjacent operator characters form one operator; separate them with spaces.".into()]
            ),
            ParseErrorType::ExpectedClosingParen { .. }
            | ParseErrorType::ExpectedSeparator { .. } => ("Unclosed parenthesis", vec![]),
            ParseErrorType::ExpectedNewline { .. } => ("Expected end of statement", vec![]),
            ParseErrorType::ExpectedEnd { .. } => ("Missing `end`", vec![]),
            ParseErrorType::ExpectedFunctionName { .. }
            | ParseErrorType::ExpectedParameterList { .. }
            | ParseErrorType::ParameterNotIdentifier { .. }
            | ParseErrorType::EmptyFunctionBody { .. } => ("Malformed function definition", vec![]),
            ParseErrorType::CallTargetNotIdentifier => ("Malformed call", vec![]),
            ParseErrorType::NotAnLValue => ("Invalid assignment target", vec![]),
            ParseErrorType::ArgumentCount { .. } => (
                "Wrong number of entries",
                vec!["Functions take one or two arguments.".into()]
            ),
            ParseErrorType::NestingTooDeep { .. } => (
                "Expression too deep",
                vec!["Split the expression with intermediate variables.".into()]
            ),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan) -> ParseResult<T> {
    Err(ParseError { error, span })
}
