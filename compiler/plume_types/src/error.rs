//! Semantic errors: everything the checker and the class registry reject.
//!
//! Names and types are resolved to strings at construction so the error is
//! self-contained once it leaves the phase that produced it.

use std::fmt;

use plume_diagnostic::{render, Diagnostic};
use plume_ir::Pos;

/// What rule was violated.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TypeErrorKind {
    #[error("Undefined type '{name}'.")]
    UndefinedType { name: String },

    #[error("Class '{name}' is already defined.")]
    DuplicateClass { name: String },

    #[error("Class '{name}' introduces a superclass cycle.")]
    SuperclassCycle { name: String },

    #[error("Reference to an undefined identifier '{name}'.")]
    UndefinedIdentifier { name: String },

    #[error("Assignment to an undefined variable '{name}'.")]
    AssignmentToUndefined { name: String },

    #[error("Value assigned to '{name}' does not conform to the declared type '{declared}'.")]
    AssignmentTypeMismatch { name: String, declared: String },

    #[error("Cannot cast an object of type '{from}' to '{to}'.")]
    InvalidCast { from: String, to: String },

    #[error("Duplicate class parameter name '{parameter}' in class '{class}' definition.")]
    DuplicateClassParameter { parameter: String, class: String },

    #[error("Duplicate parameter name '{parameter}' in function '{function}'.")]
    DuplicateParameter { parameter: String, function: String },

    #[error("Class '{class}' constructor called with wrong number of arguments.")]
    ConstructorArity { class: String },

    #[error(
        "Class '{class}' constructor argument type '{argument}' does not conform \
         to declared type '{parameter}'."
    )]
    ConstructorArgumentMismatch {
        class: String,
        argument: String,
        parameter: String,
    },

    #[error("Function '{signature}' is already defined in class '{class}'.")]
    DuplicateSignature { signature: String, class: String },

    #[error("No suitable function '{signature}' found in superclass(es) to override.")]
    NothingToOverride { signature: String },

    #[error(
        "Function '{function}' value type '{body}' does not conform to return type '{declared}'."
    )]
    ReturnTypeMismatch {
        function: String,
        body: String,
        declared: String,
    },

    #[error("No function '{function}' defined in class '{class}'.")]
    NoSuchFunction { function: String, class: String },

    #[error("Function '{function}' of class '{class}' cannot be applied to '({arguments})'.")]
    NotApplicable {
        function: String,
        class: String,
        arguments: String,
    },

    #[error(
        "Call to function '{function}' of class '{class}' is ambiguous for \
         arguments '({arguments})'."
    )]
    AmbiguousCall {
        function: String,
        class: String,
        arguments: String,
    },

    #[error("Function '{function}' of class '{class}' is private.")]
    PrivateFunction { function: String, class: String },

    #[error(
        "Condition of the {construct} evaluates to a value of type '{found}', \
         must evaluate to a boolean value."
    )]
    ConditionNotBoolean {
        construct: &'static str,
        found: String,
    },

    #[error("Duplicate identifier '{name}' in let binding.")]
    DuplicateBinding { name: String },

    #[error("An instance variable named '{name}' is already in scope.")]
    PropertyAlreadyInScope { name: String },

    #[error("Value of type '{value}' cannot be assigned to variable '{name}' of type '{declared}'.")]
    PropertyTypeMismatch {
        name: String,
        value: String,
        declared: String,
    },

    #[error(
        "Assigned value to variable '{name}' of type '{value}' does not conform \
         to its declared type '{declared}'."
    )]
    BindingTypeMismatch {
        name: String,
        value: String,
        declared: String,
    },

    #[error("Class '{class}' has no superclass.")]
    NoSuperclass { class: String },
}

/// A semantic error with position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub pos: Pos,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, pos: Pos) -> Self {
        TypeError { kind, pos }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.kind.to_string(), self.pos)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self.pos, &self.kind.to_string()))
    }
}

impl std::error::Error for TypeError {}
