//! Lexical environment: identifier to store address, scope-stacked.

use rustc_hash::FxHashMap;

use plume_ir::Name;

use crate::store::Address;

/// A stack of scopes mapping identifiers to store addresses; lookup walks
/// innermost to outermost.
#[derive(Default)]
pub struct Environment {
    scopes: Vec<FxHashMap<Name, Address>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { scopes: Vec::new() }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind an identifier in the innermost scope. A no-op without an open
    /// scope.
    pub fn add(&mut self, name: Name, address: Address) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, address);
        }
    }

    pub fn find(&self, name: Name) -> Option<Address> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
