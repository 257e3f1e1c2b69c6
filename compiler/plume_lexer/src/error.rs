//! Lexical errors.

use std::fmt;

use plume_diagnostic::{render, Diagnostic};
use plume_ir::Pos;

/// What went wrong while scanning.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("Unrecognized token '{symbol}'.")]
    UnrecognizedSymbol { symbol: char },

    #[error("Unrecognized number literal.")]
    MalformedNumber,

    #[error("Invalid string literal.")]
    MalformedString,
}

/// A lexical error: fail-fast, no recovery, 0-based position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub pos: Pos,
}

impl LexError {
    pub fn new(kind: LexErrorKind, pos: Pos) -> Self {
        LexError { kind, pos }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.kind.to_string(), self.pos)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self.pos, &self.kind.to_string()))
    }
}

impl std::error::Error for LexError {}
