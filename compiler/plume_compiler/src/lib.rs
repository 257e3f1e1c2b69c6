//! Portable Plume driver.
//!
//! An IO-free pipeline over the phase crates, suitable for embedding: a
//! [`Session`] classifies one complete top-level unit at a time (class,
//! property, function or expression), routes it through parse → check →
//! evaluate, and keeps the class registry, `Predef` receiver and result
//! bindings coherent — including rolling back any tentatively-registered
//! definition whose check fails.
//!
//! ```text
//! plume_ir, plume_lexer, plume_parse, plume_types, plume_typeck, plume_eval
//!                          ↓
//!                    plume_compiler  ← this crate
//! ```

mod error;
mod session;

pub use error::SessionError;
pub use session::{ParseOutcome, Session, SessionResult};

#[cfg(test)]
mod tests;
