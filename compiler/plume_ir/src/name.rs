//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// A `Name` is a 32-bit index into the session's [`StringInterner`]; equality
/// and hashing are O(1). Identifiers, type names, operator spellings and raw
/// literal spellings are all interned.
///
/// [`StringInterner`]: crate::StringInterner
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Pre-interned names for the builtin classes.
///
/// [`StringInterner::new`] interns these spellings first, in declaration
/// order, so the constants below are stable across sessions.
///
/// [`StringInterner::new`]: crate::StringInterner::new
pub mod builtin {
    use super::Name;

    pub const OBJECT: Name = Name::from_raw(1);
    pub const INT: Name = Name::from_raw(2);
    pub const DOUBLE: Name = Name::from_raw(3);
    pub const STRING: Name = Name::from_raw(4);
    pub const BOOL: Name = Name::from_raw(5);
    pub const VOID: Name = Name::from_raw(6);
    pub const NULL: Name = Name::from_raw(7);
    pub const PREDEF: Name = Name::from_raw(8);
    pub const MATH: Name = Name::from_raw(9);
    pub const IO: Name = Name::from_raw(10);

    /// Spellings matching the constants above, in raw-index order.
    pub(crate) const SPELLINGS: &[&str] = &[
        "Object", "Int", "Double", "String", "Bool", "Void", "Null", "Predef", "Math", "IO",
    ];

    /// Whether `name` is one of the primitive classes.
    ///
    /// `Null` is deliberately not primitive: a null value conforms to every
    /// non-primitive type.
    #[inline]
    pub fn is_primitive(name: Name) -> bool {
        matches!(name, INT | DOUBLE | STRING | BOOL | VOID)
    }
}
