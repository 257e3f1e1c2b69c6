//! Tree-walking evaluator and runtime model for the Plume interpreter.
//!
//! The runtime model is an explicit address-based memory: a [`Store`] of
//! reusable slots, a scope-stacked [`Environment`] mapping identifiers to
//! addresses, and [`Obj`] values carrying class tag, ordered properties,
//! a flattened method table and an optional native payload. Lazy parameters
//! live in the store as thunks until their first reference forces and
//! memoizes them.

mod context;
mod environment;
mod error;
mod evaluator;
pub mod runtime;
mod store;
mod value;

pub use context::{Context, NativeFn, NativeTable};
pub use environment::Environment;
pub use error::{EvalError, EvalErrorKind};
pub use evaluator::{
    call_function, call_native, evaluate, evaluate_property, execute_call, force_reference,
    to_display_string,
};
pub use store::{Address, Store};
pub use value::{
    default_value, make_bool, make_double, make_int, make_null, make_string, make_void, Cell,
    NativeValue, Obj, Thunk, Value,
};

/// Result alias for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests;
