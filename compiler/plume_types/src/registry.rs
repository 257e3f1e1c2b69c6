//! The class registry.
//!
//! One registry holds the class definitions for a whole session. The
//! type environment (compile-time view) and the evaluation context
//! (runtime view) hold clones of the same [`SharedRegistry`] handle, so the
//! two views cannot drift apart.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use plume_ir::{Class, Name, Pos, SharedInterner};

use crate::error::{TypeError, TypeErrorKind};

/// Store of class definitions, keyed by class name.
#[derive(Default)]
pub struct ClassRegistry {
    classes: FxHashMap<Name, Rc<Class>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry {
            classes: FxHashMap::default(),
        }
    }

    /// Register a class, replacing any previous definition of the same name.
    ///
    /// Rejects a definition whose superclass chain, followed through the
    /// classes known so far, leads back to the class itself. Catching the
    /// cycle here keeps every later chain walk finite.
    pub fn add(
        &mut self,
        class: Rc<Class>,
        interner: &SharedInterner,
        pos: Pos,
    ) -> Result<(), TypeError> {
        let name = class.name;
        let mut ancestor = class.superclass;
        let mut steps = 0usize;

        while let Some(current) = ancestor {
            if current == name {
                return Err(TypeError::new(
                    TypeErrorKind::SuperclassCycle {
                        name: interner.resolve(name).to_string(),
                    },
                    pos,
                ));
            }
            // A chain through known classes can be at most one step per
            // registered class; anything longer would itself be a cycle.
            steps += 1;
            if steps > self.classes.len() {
                break;
            }
            ancestor = self
                .classes
                .get(&current)
                .and_then(|c| c.superclass);
        }

        self.classes.insert(name, class);
        Ok(())
    }

    pub fn has(&self, name: Name) -> bool {
        self.classes.contains_key(&name)
    }

    pub fn get(&self, name: Name) -> Option<Rc<Class>> {
        self.classes.get(&name).cloned()
    }

    pub fn remove(&mut self, name: Name) -> Option<Rc<Class>> {
        self.classes.remove(&name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Shared handle to a [`ClassRegistry`].
///
/// Single-threaded by design; evaluation is a synchronous tree recursion.
#[derive(Clone, Default)]
pub struct SharedRegistry(Rc<RefCell<ClassRegistry>>);

impl SharedRegistry {
    pub fn new() -> Self {
        SharedRegistry(Rc::new(RefCell::new(ClassRegistry::new())))
    }

    /// Register a class; see [`ClassRegistry::add`].
    pub fn add(
        &self,
        class: Rc<Class>,
        interner: &SharedInterner,
        pos: Pos,
    ) -> Result<(), TypeError> {
        self.0.borrow_mut().add(class, interner, pos)
    }

    pub fn has(&self, name: Name) -> bool {
        self.0.borrow().has(name)
    }

    pub fn get(&self, name: Name) -> Option<Rc<Class>> {
        self.0.borrow().get(name)
    }

    pub fn remove(&self, name: Name) -> Option<Rc<Class>> {
        self.0.borrow_mut().remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
