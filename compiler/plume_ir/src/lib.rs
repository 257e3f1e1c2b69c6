//! Plume IR - shared front-end data model.
//!
//! This crate contains the data structures every other Plume crate builds on:
//! - `Pos` for 0-based source positions
//! - `Name` for interned identifiers, plus the `StringInterner`
//! - `Token` and `TokenKind` for lexer output
//! - The AST: expressions with a write-once inferred-type slot, and the
//!   definition nodes (`Class`, `Function`, `Property`, `Formal`, `Program`)
//!
//! Nodes are immutable after construction except for the one-shot type
//! annotation performed through [`TypeSlot`].

pub mod ast;
mod interner;
mod name;
mod pos;
mod token;

pub use ast::{Binding, Class, Expr, ExprKind, Formal, Function, Program, Property, TypeSlot};
pub use interner::{SharedInterner, StringInterner};
pub use name::{builtin, Name};
pub use pos::Pos;
pub use token::{Token, TokenKind};
