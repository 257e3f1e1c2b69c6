//! The session-level error sum.

use std::fmt;

use plume_diagnostic::Diagnostic;
use plume_eval::EvalError;
use plume_parse::ParseError;
use plume_types::TypeError;

/// Any failure a driver can see from one top-level unit: lexical/syntax
/// (including the typed incomplete-input signal), semantic, or runtime.
#[derive(Clone, Debug)]
pub enum SessionError {
    Parse(ParseError),
    Semantic(TypeError),
    Runtime(EvalError),
}

impl SessionError {
    /// Whether a line-buffering driver should request more input instead of
    /// reporting this error.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, SessionError::Parse(e) if e.is_incomplete())
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        match self {
            SessionError::Parse(e) => e.into_diagnostic(),
            SessionError::Semantic(e) => e.into_diagnostic(),
            SessionError::Runtime(e) => e.into_diagnostic(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Parse(e) => e.fmt(f),
            SessionError::Semantic(e) => e.fmt(f),
            SessionError::Runtime(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ParseError> for SessionError {
    fn from(e: ParseError) -> Self {
        SessionError::Parse(e)
    }
}

impl From<TypeError> for SessionError {
    fn from(e: TypeError) -> Self {
        SessionError::Semantic(e)
    }
}

impl From<EvalError> for SessionError {
    fn from(e: EvalError) -> Self {
        SessionError::Runtime(e)
    }
}
