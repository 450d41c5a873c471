use thiserror::Error;

use crate::{environment::prelude::ValueType, parser::prelude::ParseError, utils::prelude::SrcSpan};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("undefined variable `{name}`")]
    UndefinedVariable {
        name: String,
        span: SrcSpan,
    },
    #[error("function `{name}` taking {arity} argument(s) is not defined")]
    UndefinedFunction {
        name: String,
        arity: usize,
        span: SrcSpan,
    },
    #[error("`{operator}` expects {expected}, found {found}")]
    TypeMismatch {
        operator: String,
        expected: ValueType,
        found: ValueType,
        span: SrcSpan,
    },
    #[error("condition of `{keyword}` must be Bool, found {found}")]
    NonBooleanCondition {
        keyword: String,
        found: ValueType,
        span: SrcSpan,
    },
    #[error("only a variable can be assigned to")]
    NotAnLValue {
        span: SrcSpan,
    },
    #[error("operator `{operator}` has no action")]
    UnknownOperator {
        operator: String,
        span: SrcSpan,
    },
    #[error("malformed number `{text}`")]
    MalformedNumber {
        text: String,
        span: SrcSpan,
    },
    #[error("`{text}` cannot be used as a value")]
    InvalidLeaf {
        text: String,
        span: SrcSpan,
    },
    #[error("maximum call depth of {limit} exceeded")]
    CallDepthExceeded {
        limit: usize,
        span: SrcSpan,
    },
    #[error("interrupted")]
    Interrupted,
    #[error("{}", .0.error)]
    Invalid(ParseError),
}

impl EvalError {
    pub fn span(&self) -> Option<SrcSpan> {
        match self {
            EvalError::UndefinedVariable { span, .. }
            | EvalError::UndefinedFunction { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::NonBooleanCondition { span, .. }
            | EvalError::NotAnLValue { span }
            | EvalError::UnknownOperator { span, .. }
            | EvalError::MalformedNumber { span, .. }
            | EvalError::InvalidLeaf { span, .. }
            | EvalError::CallDepthExceeded { span, .. } => Some(*span),
            EvalError::Invalid(error) => Some(error.span),
            EvalError::Interrupted => None,
        }
    }

    /// A broken lexer or parser table, not bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalError::UnknownOperator { .. } | EvalError::MalformedNumber { .. })
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
