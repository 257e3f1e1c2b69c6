//! Diagnostics for the Plume interpreter.
//!
//! Every phase error renders through [`render`]: `"{line+1}:{col+1}:
//! {message}"`, or the bare message when the position is the origin
//! sentinel, meaning "no position available".

use std::fmt;

use plume_ir::Pos;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A rendered, position-carrying message a driver can show to a user.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub pos: Pos,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>, pos: Pos) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            pos,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self.pos, &self.message))
    }
}

/// Format a message with its 1-based position prefix.
///
/// The origin position `(0, 0)` is the "no position available" sentinel and
/// yields the bare message.
pub fn render(pos: Pos, message: &str) -> String {
    if pos.is_origin() {
        message.to_owned()
    } else {
        format!("{pos}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positions_render_one_based() {
        assert_eq!(render(Pos::new(2, 7), "boom"), "3:8: boom");
    }

    #[test]
    fn origin_renders_bare() {
        assert_eq!(render(Pos::ORIGIN, "boom"), "boom");
    }
}
