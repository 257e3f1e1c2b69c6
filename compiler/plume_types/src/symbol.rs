//! Scoped symbol table.

use rustc_hash::FxHashMap;

use plume_ir::{Name, Pos};

/// A declared identifier: name, type (possibly not yet known), declaration
/// position.
///
/// The type is optional because a `let` binding may be declared without a
/// type or initializer; its type is fixed by the first assignment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Symbol {
    pub name: Name,
    pub ty: Option<Name>,
    pub pos: Pos,
}

impl Symbol {
    pub fn new(name: Name, ty: Option<Name>, pos: Pos) -> Self {
        Symbol { name, ty, pos }
    }
}

/// A stack of scopes; lookup walks innermost to outermost.
#[derive(Default)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<Name, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { scopes: Vec::new() }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Add a symbol to the innermost scope. A no-op without an open scope.
    pub fn add(&mut self, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(symbol.name, symbol);
        }
    }

    /// Whether `name` is declared in the innermost scope specifically;
    /// duplicate declarations within one scope are an error.
    pub fn is_declared_here(&self, name: Name) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&name))
    }

    /// Innermost-to-outermost lookup.
    pub fn find(&self, name: Name) -> Option<Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).cloned())
    }

    /// Fix the type of the innermost declaration of `name`, for symbols
    /// declared without one. Returns `false` when `name` is not in scope.
    pub fn set_type(&mut self, name: Name, ty: Name) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(symbol) = scope.get_mut(&name) {
                symbol.ty = Some(ty);
                return true;
            }
        }
        false
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
