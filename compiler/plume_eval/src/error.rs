//! Runtime errors.
//!
//! Most of these are defense in depth: after a successful check they signal
//! a checker/evaluator inconsistency rather than a user mistake. The
//! genuine user-reachable cases are division by zero and host I/O trouble.

use std::fmt;

use plume_diagnostic::{render, Diagnostic};
use plume_ir::Pos;

/// What went wrong at evaluation time.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    /// No overload resolvable at evaluation time, which checking should
    /// have made impossible.
    #[error("No function '{function}' defined in class '{class}'.")]
    UnresolvedOverload { function: String, class: String },

    #[error("Reference to an undefined identifier '{name}'.")]
    UndefinedReference { name: String },

    #[error("Undefined type '{name}'.")]
    UndefinedClass { name: String },

    #[error("Class '{class}' has no superclass.")]
    NoSuperclass { class: String },

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Malformed {what} literal '{spelling}'.")]
    MalformedLiteral {
        what: &'static str,
        spelling: String,
    },

    /// The value's class does not conform to what the checker inferred.
    #[error(
        "Internal type inconsistency: value of class '{found}' where '{expected}' was inferred."
    )]
    InconsistentType { found: String, expected: String },

    #[error("Internal: expression reached evaluation without a type annotation.")]
    Unannotated,

    #[error("Unknown native hook '{hook}'.")]
    UnknownNative { hook: String },

    /// A native body saw a receiver or argument without the payload its
    /// contract requires.
    #[error("Native function '{hook}' called against an incompatible value.")]
    NativeContract { hook: String },

    #[error("Condition did not evaluate to a boolean value.")]
    NotABoolean,
}

/// A runtime error with position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub pos: Pos,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, pos: Pos) -> Self {
        EvalError { kind, pos }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.kind.to_string(), self.pos)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self.pos, &self.kind.to_string()))
    }
}

impl std::error::Error for EvalError {}
