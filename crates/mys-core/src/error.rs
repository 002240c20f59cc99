use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Line/column of an error's anchor node. Lines are 1-based, columns are
/// 0-based byte offsets, matching the host parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// The closed set of error kinds the transpiler reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The host parser rejected the input.
    Syntax,
    /// A semantic violation of the Mys rules.
    Compile,
    /// A construct the surface syntax allows but Mys never will.
    Language,
    /// An unreachable branch was reached; a transpiler bug.
    Internal,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::Compile => "CompileError",
            Self::Language => "LanguageError",
            Self::Internal => "InternalError",
        }
    }
}

/// A transpilation error: kind, lowercase message, and the span of the
/// node that triggered it. Every phase fails fast with the first error.
#[derive(Debug, Clone, Error, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, Some(span))
    }

    pub fn compile(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Compile, message, Some(span))
    }

    pub fn language(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Language, message, Some(span))
    }

    pub fn internal(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::new(ErrorKind::Internal, message, span)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
