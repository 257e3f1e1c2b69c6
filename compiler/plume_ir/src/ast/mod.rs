//! The abstract syntax tree.
//!
//! Expression children are `Rc<Expr>` so the evaluator's lazy-parameter
//! thunks can share the checker-annotated nodes instead of cloning them.

mod def;
mod expr;

pub use def::{Class, Formal, Function, Program, Property};
pub use expr::{Binding, Expr, ExprKind, TypeSlot};
