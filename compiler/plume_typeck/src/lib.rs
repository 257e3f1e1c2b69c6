//! Static type checking for the Plume interpreter.
//!
//! The checker walks the AST once, writing every expression's inferred-type
//! slot and validating class, inheritance and overload rules. The evaluator
//! consumes the same AST afterwards, unchanged.

pub mod checker;
mod env;

pub use checker::{
    check_class, check_expr, check_function, check_program, check_property, TypeResult,
};
pub use env::TypeEnvironment;

#[cfg(test)]
mod tests;
