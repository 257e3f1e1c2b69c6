//! Runtime values.
//!
//! An [`Obj`] carries its class tag, an ordered property map (declaration
//! order, inherited before own), the flattened override-resolved method
//! table built once at construction, its store address if it has one, and —
//! for the primitive classes — a native payload. All fields are populated
//! before any method call executes on the instance.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use plume_ir::{builtin, Expr, Function, Name, Pos};
use plume_types::SharedRegistry;

use crate::context::Context;
use crate::error::{EvalError, EvalErrorKind};
use crate::store::Address;
use crate::EvalResult;

/// Shared handle to a runtime object.
pub type Value = Rc<RefCell<Obj>>;

/// Host payload of a primitive value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NativeValue {
    #[default]
    None,
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
}

/// An unevaluated lazy argument: the argument expression plus a shallow
/// snapshot of the caller's context. The snapshot shares the caller's store
/// and environment, so mutations to shared slots between capture and force
/// are observable when the thunk runs.
#[derive(Clone)]
pub struct Thunk {
    pub expr: Rc<Expr>,
    pub context: Context,
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thunk({:?})", self.expr.kind)
    }
}

/// What a store slot or property holds: an evaluated value, or a thunk
/// still waiting for its first reference.
#[derive(Clone, Debug)]
pub enum Cell {
    Value(Value),
    Thunk(Thunk),
}

/// A runtime object.
#[derive(Debug)]
pub struct Obj {
    pub class: Name,
    properties: Vec<(Name, Cell)>,
    pub methods: Vec<Rc<Function>>,
    pub address: Option<Address>,
    pub native: NativeValue,
}

impl Obj {
    /// An empty instance tagged with `class`.
    pub fn new(class: Name) -> Self {
        Obj {
            class,
            properties: Vec::new(),
            methods: Vec::new(),
            address: None,
            native: NativeValue::None,
        }
    }

    pub fn get(&self, name: Name) -> Option<Cell> {
        self.properties
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cell)| cell.clone())
    }

    /// Set a property, keeping its original position when it already
    /// exists and appending otherwise (declaration order is meaningful).
    pub fn set(&mut self, name: Name, cell: Cell) {
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = cell,
            None => self.properties.push((name, cell)),
        }
    }

    pub fn has(&self, name: Name) -> bool {
        self.properties.iter().any(|(n, _)| *n == name)
    }

    pub fn properties(&self) -> &[(Name, Cell)] {
        &self.properties
    }

    pub fn find_method_index(&self, function: &Function) -> Option<usize> {
        self.methods.iter().position(|m| m.same_signature(function))
    }

    /// Remove the method with `function`'s signature, if present; used when
    /// a session redefines a function on its receiver class.
    pub fn remove_method_with_signature(&mut self, function: &Function) -> bool {
        match self.find_method_index(function) {
            Some(i) => {
                self.methods.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.native {
            NativeValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.native {
            NativeValue::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric payload of an Int or Double.
    pub fn as_number(&self) -> Option<f64> {
        match self.native {
            NativeValue::Int(v) => Some(v as f64),
            NativeValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.native {
            NativeValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.native {
            NativeValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Build a fully-populated instance of `class`: superclass fields
    /// first, recursively, root to leaf; parameters and properties default-
    /// initialized in declaration order; the method table flattened by
    /// appending each class's own functions while removing any inherited
    /// function a flagged override replaces.
    pub fn create(registry: &SharedRegistry, class: Name) -> EvalResult<Value> {
        let definition = registry.get(class).ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::UndefinedClass {
                    name: format!("{class:?}"),
                },
                Pos::ORIGIN,
            )
        })?;

        let object = match definition.superclass {
            Some(superclass) => Obj::create(registry, superclass)?,
            None => Rc::new(RefCell::new(Obj::new(class))),
        };

        {
            let mut obj = object.borrow_mut();

            for param in &definition.params {
                let value = default_value(registry, Some(param.ty))?;
                obj.set(param.name, Cell::Value(value));
            }
            for property in &definition.properties {
                let value = default_value(registry, property.ty.get())?;
                obj.set(property.name, Cell::Value(value));
            }

            for method in &definition.functions {
                if let Some(i) = obj.find_method_index(method) {
                    if method.is_override {
                        obj.methods.remove(i);
                    }
                }
                obj.methods.push(Rc::clone(method));
            }

            obj.class = class;
        }

        Ok(object)
    }
}

/// The default a parameter or property holds before its initializer runs:
/// zero/false/empty for the primitives, null for everything else.
pub fn default_value(registry: &SharedRegistry, ty: Option<Name>) -> EvalResult<Value> {
    match ty {
        Some(builtin::INT) => make_int(registry, 0),
        Some(builtin::DOUBLE) => make_double(registry, 0.0),
        Some(builtin::BOOL) => make_bool(registry, false),
        Some(builtin::STRING) => make_string(registry, String::new()),
        _ => make_null(registry),
    }
}

pub fn make_int(registry: &SharedRegistry, value: i64) -> EvalResult<Value> {
    let object = Obj::create(registry, builtin::INT)?;
    object.borrow_mut().native = NativeValue::Int(value);
    Ok(object)
}

pub fn make_double(registry: &SharedRegistry, value: f64) -> EvalResult<Value> {
    let object = Obj::create(registry, builtin::DOUBLE)?;
    object.borrow_mut().native = NativeValue::Double(value);
    Ok(object)
}

pub fn make_bool(registry: &SharedRegistry, value: bool) -> EvalResult<Value> {
    let object = Obj::create(registry, builtin::BOOL)?;
    object.borrow_mut().native = NativeValue::Bool(value);
    Ok(object)
}

pub fn make_string(registry: &SharedRegistry, value: String) -> EvalResult<Value> {
    let object = Obj::create(registry, builtin::STRING)?;
    object.borrow_mut().native = NativeValue::Str(value);
    Ok(object)
}

pub fn make_null(registry: &SharedRegistry) -> EvalResult<Value> {
    Obj::create(registry, builtin::NULL)
}

pub fn make_void(registry: &SharedRegistry) -> EvalResult<Value> {
    Obj::create(registry, builtin::VOID)
}
