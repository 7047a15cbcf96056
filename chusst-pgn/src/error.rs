//! Errors reported while reading PGN text.

use crate::reader::{Span, TokenKind};

use std::fmt;
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lex,
    Syntax,
    Structural,
    Resource,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let category = match self {
            ErrorCategory::Lex => "lexical error",
            ErrorCategory::Syntax => "syntax error",
            ErrorCategory::Structural => "structural error",
            ErrorCategory::Resource => "resource error",
        };
        write!(f, "{}", category)
    }
}

/// What the parser ran into when it needed something else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Found {
    Token { kind: TokenKind, text: String },
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Found::Token { kind, text } => write!(f, "{} '{}'", kind, text.escape_debug()),
            Found::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Set of token kinds acceptable at some point of the grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expected(pub Vec<TokenKind>);

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "nothing"),
            [single] => write!(f, "{}", single),
            [init @ .., last] => {
                let init: Vec<String> = init.iter().map(ToString::to_string).collect();
                write!(f, "{} or {}", init.join(", "), last)
            }
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PgnError {
    #[error("{span}: {message}")]
    Lex { message: String, span: Span },

    #[error("{span}: expected {expected}, found {found}")]
    Syntax {
        expected: Expected,
        found: Found,
        span: Span,
    },

    #[error("{span}: {message}")]
    Structural { message: String, span: Span },

    #[error("{span}: variations nested deeper than {limit} levels")]
    Resource { limit: usize, span: Span },
}

impl PgnError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PgnError::Lex { .. } => ErrorCategory::Lex,
            PgnError::Syntax { .. } => ErrorCategory::Syntax,
            PgnError::Structural { .. } => ErrorCategory::Structural,
            PgnError::Resource { .. } => ErrorCategory::Resource,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PgnError::Lex { span, .. }
            | PgnError::Syntax { span, .. }
            | PgnError::Structural { span, .. }
            | PgnError::Resource { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }

    pub fn column(&self) -> usize {
        self.span().column
    }
}

/// Failure to obtain the text to parse.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("could not read PGN source: {0}")]
    Io(#[from] std::io::Error),
}
