//! String interner for identifiers, type names and literal spellings.
//!
//! A session owns one interner, shared between the lexer, parser, checker
//! and evaluator through the cheaply-clonable [`SharedInterner`] handle.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::name::{builtin, Name};

struct Inner {
    map: FxHashMap<Arc<str>, u32>,
    strings: Vec<Arc<str>>,
}

/// Interns strings to compact [`Name`] indices.
///
/// Lookup and equality on interned names are O(1). The empty string and the
/// builtin class spellings are pre-interned so [`builtin`] constants resolve
/// in every session.
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create an interner with the empty string and builtin class names
    /// pre-interned.
    pub fn new() -> Self {
        let mut inner = Inner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(64),
        };

        let empty: Arc<str> = Arc::from("");
        inner.map.insert(Arc::clone(&empty), 0);
        inner.strings.push(empty);

        for spelling in builtin::SPELLINGS {
            let index = u32::try_from(inner.strings.len()).unwrap_or(u32::MAX);
            let shared: Arc<str> = Arc::from(*spelling);
            inner.map.insert(Arc::clone(&shared), index);
            inner.strings.push(shared);
        }

        StringInterner {
            inner: RwLock::new(inner),
        }
    }

    /// Intern a string, returning its stable `Name`.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&index) = self.inner.read().map.get(s) {
            return Name::from_raw(index);
        }

        let mut inner = self.inner.write();
        // Re-check under the write lock: another caller may have interned
        // the same string between the read and the write.
        if let Some(&index) = inner.map.get(s) {
            return Name::from_raw(index);
        }

        let index = u32::try_from(inner.strings.len()).unwrap_or(u32::MAX);
        let shared: Arc<str> = Arc::from(s);
        inner.map.insert(Arc::clone(&shared), index);
        inner.strings.push(shared);
        Name::from_raw(index)
    }

    /// Resolve a `Name` back to its string.
    ///
    /// Returns the empty string for a name that was never interned here.
    pub fn resolve(&self, name: Name) -> Arc<str> {
        let inner = self.inner.read();
        inner
            .strings
            .get(name.raw() as usize)
            .map_or_else(|| Arc::from(""), Arc::clone)
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Whether the interner is empty (never true: `""` is pre-interned).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        StringInterner::new()
    }
}

/// Shared handle to a [`StringInterner`].
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Intern a string.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.0.intern(s)
    }

    /// Resolve a name to its string.
    #[inline]
    pub fn resolve(&self, name: Name) -> Arc<str> {
        self.0.resolve(name)
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}
