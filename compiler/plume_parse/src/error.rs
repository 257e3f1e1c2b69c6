//! Parse errors.
//!
//! The end-of-input cases are dedicated variants, not message substrings:
//! an incremental caller asks [`ParseError::is_incomplete`] to decide
//! whether to buffer more input instead of reporting a hard error.

use std::fmt;

use plume_diagnostic::{render, Diagnostic};
use plume_ir::Pos;
use plume_lexer::LexError;

/// What the parser stumbled on.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SyntaxErrorKind {
    /// Input ended where a specific token was required.
    #[error("Expected '{expected}' but reached end of input.")]
    UnexpectedEndOfInput { expected: String },

    /// Input ended where an expression or member was still open.
    #[error("Unexpected end of input.")]
    IncompleteInput,

    #[error("Expected '{expected}' but found '{found}'.")]
    UnexpectedToken { expected: String, found: String },

    #[error("Unexpected '{found}'.")]
    Unexpected { found: String },

    #[error("Expected identifier or operator as method name, but found '{found}'.")]
    ExpectedFunctionName { found: String },
}

/// A parse failure: either a lexical error surfacing through the token
/// stream, or a syntax error with position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    Lexical(LexError),
    Syntax { kind: SyntaxErrorKind, pos: Pos },
}

impl ParseError {
    pub fn syntax(kind: SyntaxErrorKind, pos: Pos) -> Self {
        ParseError::Syntax { kind, pos }
    }

    /// The distinguished "end of input while parsing" signal: the input was
    /// well-formed so far but incomplete, so a line-buffering driver should
    /// request more input instead of reporting.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            ParseError::Syntax {
                kind: SyntaxErrorKind::UnexpectedEndOfInput { .. }
                    | SyntaxErrorKind::IncompleteInput,
                ..
            }
        )
    }

    pub fn pos(&self) -> Pos {
        match self {
            ParseError::Lexical(e) => e.pos,
            ParseError::Syntax { pos, .. } => *pos,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        match self {
            ParseError::Lexical(e) => e.into_diagnostic(),
            ParseError::Syntax { kind, pos } => Diagnostic::error(kind.to_string(), pos),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lexical(e) => e.fmt(f),
            ParseError::Syntax { kind, pos } => write!(f, "{}", render(*pos, &kind.to_string())),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lexical(e)
    }
}
