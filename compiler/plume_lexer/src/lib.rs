//! Lexer for the Plume interpreter.
//!
//! Source text goes in, [`Token`]s come out. Recognition is first-character
//! dispatch: literals (identifier/keyword, number, string), operators,
//! delimiters, dot, newline. Numeric and string literals are recognized by
//! the explicit finite-state machines in [`fsm`].
//!
//! [`Token`]: plume_ir::Token

pub mod char_class;
mod error;
pub mod fsm;
mod lexer;

pub use error::{LexError, LexErrorKind};
pub use lexer::{LexResult, Lexer};
