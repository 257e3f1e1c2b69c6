//! Recursive-descent parser for the Plume interpreter.
//!
//! Entry points mirror the language's top-level units:
//! [`Parser::parse_expression`], [`Parser::parse_class`],
//! [`Parser::parse_function`], [`Parser::parse_property`] and
//! [`Parser::parse_program`]. Each returns an AST node or fails fast with a
//! [`ParseError`]; incomplete input is reported through a typed variant so
//! an incremental caller can buffer more lines instead of giving up.

mod error;
mod items;
mod parser;

pub use error::{ParseError, SyntaxErrorKind};
pub use parser::{ParseResult, Parser};

#[cfg(test)]
mod tests;
