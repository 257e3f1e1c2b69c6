//! The type environment the checker runs against.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use plume_ir::{Class, Function, Name, Pos, SharedInterner};
use plume_types::{SharedRegistry, SymbolTable, TypeError};

/// Compile-time view of a session: the shared class registry, the scoped
/// symbol table, the per-class catalog of functions registered so far (what
/// duplicate-signature detection runs against), and the class whose body is
/// currently being checked.
pub struct TypeEnvironment {
    pub registry: SharedRegistry,
    pub symbols: SymbolTable,
    functions: FxHashMap<Name, Vec<Rc<Function>>>,
    pub current_class: Option<Rc<Class>>,
    pub interner: SharedInterner,
}

impl TypeEnvironment {
    /// A fresh environment over `registry`.
    pub fn new(registry: SharedRegistry, interner: SharedInterner) -> Self {
        TypeEnvironment {
            registry,
            symbols: SymbolTable::new(),
            functions: FxHashMap::default(),
            current_class: None,
            interner,
        }
    }

    /// Register a class and reset its function catalog. Superclass cycles
    /// are rejected here, before any chain walk can run on them.
    pub fn add_class(&mut self, class: Rc<Class>, pos: Pos) -> Result<(), TypeError> {
        let name = class.name;
        self.registry.add(class, &self.interner, pos)?;
        self.functions.insert(name, Vec::new());
        Ok(())
    }

    /// Remove a tentatively-registered class again (the driver's rollback).
    pub fn remove_class(&mut self, name: Name) {
        self.registry.remove(name);
        self.functions.remove(&name);
    }

    pub fn has_class(&self, name: Name) -> bool {
        self.registry.has(name)
    }

    pub fn get_class(&self, name: Name) -> Option<Rc<Class>> {
        self.registry.get(name)
    }

    /// Record a checked function in the class's catalog.
    pub fn add_function(&mut self, class: Name, function: Rc<Function>) {
        self.functions.entry(class).or_default().push(function);
    }

    /// Whether the class's catalog already holds a function with the same
    /// signature.
    pub fn has_function(&self, class: Name, function: &Function) -> bool {
        self.functions
            .get(&class)
            .is_some_and(|catalog| catalog.iter().any(|f| f.same_signature(function)))
    }

    /// Resolve a name for an error message.
    pub fn name_of(&self, name: Name) -> String {
        self.interner.resolve(name).to_string()
    }
}
