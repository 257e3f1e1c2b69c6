//! The evaluation context.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use plume_ir::{Class, Name, Pos, SharedInterner};
use plume_types::SharedRegistry;

use crate::environment::Environment;
use crate::error::{EvalError, EvalErrorKind};
use crate::store::Store;
use crate::value::Value;
use crate::EvalResult;

/// A host callable standing in for a function body.
pub type NativeFn = Rc<dyn Fn(&mut Context) -> EvalResult<Value>>;

/// Hook-name to host-callable table; dispatch treats a registered body
/// exactly like a source-level expression body.
#[derive(Default)]
pub struct NativeTable {
    map: FxHashMap<Name, NativeFn>,
}

impl NativeTable {
    pub fn insert(&mut self, hook: Name, function: NativeFn) {
        self.map.insert(hook, function);
    }

    pub fn get(&self, hook: Name) -> Option<NativeFn> {
        self.map.get(&hook).cloned()
    }
}

/// Everything evaluation runs against: the session's class registry (the
/// runtime view of the same store the checker uses), the lexical
/// environment, the store, the native table, an output sink for the IO
/// class, and the current receiver.
///
/// `Clone` is deliberately shallow: handles are shared, only the `self`
/// binding is per-copy. That shallow copy is exactly what a lazy thunk
/// captures, so store mutations between capture and force stay observable.
#[derive(Clone)]
pub struct Context {
    pub registry: SharedRegistry,
    pub interner: SharedInterner,
    pub environment: Rc<RefCell<Environment>>,
    pub store: Rc<RefCell<Store>>,
    pub natives: Rc<RefCell<NativeTable>>,
    pub output: Rc<RefCell<dyn Write>>,
    pub self_obj: Option<Value>,
}

impl Context {
    /// A fresh context over a registry, writing IO output to stdout.
    pub fn new(registry: SharedRegistry, interner: SharedInterner) -> Self {
        Context {
            registry,
            interner,
            environment: Rc::new(RefCell::new(Environment::new())),
            store: Rc::new(RefCell::new(Store::new())),
            natives: Rc::new(RefCell::new(NativeTable::default())),
            output: Rc::new(RefCell::new(std::io::stdout())),
            self_obj: None,
        }
    }

    /// Replace the IO sink (tests capture output this way).
    pub fn with_output(mut self, output: Rc<RefCell<dyn Write>>) -> Self {
        self.output = output;
        self
    }

    /// The shallow snapshot a thunk captures: shared handles, current self.
    pub fn snapshot(&self) -> Context {
        self.clone()
    }

    /// The current receiver, or an error where one is required.
    pub fn self_value(&self, pos: Pos) -> EvalResult<Value> {
        self.self_obj.clone().ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::UndefinedReference {
                    name: "this".to_owned(),
                },
                pos,
            )
        })
    }

    pub fn get_class(&self, name: Name, pos: Pos) -> EvalResult<Rc<Class>> {
        self.registry.get(name).ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::UndefinedClass {
                    name: self.interner.resolve(name).to_string(),
                },
                pos,
            )
        })
    }

    /// Resolve a name for an error message.
    pub fn name_of(&self, name: Name) -> String {
        self.interner.resolve(name).to_string()
    }
}
