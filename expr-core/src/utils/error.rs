use termcolor::Buffer;
use thiserror::Error;

use crate::{
    eval::prelude::EvalError,
    parser::prelude::ParseError,
    utils::prelude::SrcSpan,
};
use super::diagnostic::{Diagnostic, Label, Level, Location, SourceFile};

/// Everything a statement can fail with, as seen by whoever drives the
/// interpreter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{}{}", .0, at_span(.0.span()))]
    Eval(#[from] EvalError),
    #[error("IO operation failed: {err}")]
    StdIo {
        err: std::io::ErrorKind
    }
}

fn at_span(span: Option<SrcSpan>) -> String {
    span.map(|span| format!(" at {span}")).unwrap_or_default()
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StdIo { err: err.kind() }
    }
}

impl Error {
    /// Fatal errors come from broken lexer or parser tables rather than from
    /// user input; the driver stops on them.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Eval(error) => error.is_fatal(),
            Error::Parse(_) | Error::StdIo { .. } => false,
        }
    }

    pub fn span(&self) -> Option<SrcSpan> {
        match self {
            Error::Parse(error) => Some(error.span),
            Error::Eval(error) => error.span(),
            Error::StdIo { .. } => None,
        }
    }

    pub fn pretty_string(&self, file: Option<SourceFile>) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor, file);
        String::from_utf8(nocolor.into_inner()).expect("Error printing produced invalid utf8")
    }

    pub fn pretty(&self, buf: &mut Buffer, file: Option<SourceFile>) {
        self.to_diagnostic(file).write(buf);
    }

    pub fn to_diagnostic<'a>(&self, file: Option<SourceFile<'a>>) -> Diagnostic<'a> {
        let (title, message) = match self {
            Error::Parse(error) => ("Syntax error", error.error.to_string()),
            Error::Eval(error) if error.is_fatal() => ("Internal error", error.to_string()),
            Error::Eval(error) => ("Evaluation error", error.to_string()),
            Error::StdIo { err } => ("Standard IO error", err.to_string()),
        };

        let span = self.span();

        let location = match (file, span) {
            (Some(file), Some(span)) => Some(Location {
                file,
                label: Label {
                    text: Some(message.clone()),
                    span,
                },
            }),
            _ => None,
        };

        let hints = match self {
            Error::Parse(error) => error.details().1,
            Error::Eval(_) | Error::StdIo { .. } => vec![],
        };

        // The label already carries the message when a snippet is shown.
        let text = match location {
            Some(_) => hints.join("\n"),
            None => std::iter::once(message)
                .chain(hints)
                .collect::<Vec<String>>()
                .join("\n"),
        };

        Diagnostic {
            title: title.into(),
            text,
            level: Level::Error,
            span,
            location,
        }
    }
}
