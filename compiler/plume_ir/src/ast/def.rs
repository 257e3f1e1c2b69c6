//! Definition nodes: classes, functions, properties, formals.

use std::rc::Rc;

use super::{Expr, TypeSlot};
use crate::{builtin, Name, Pos, SharedInterner};

/// A constructor or function parameter.
#[derive(Clone, Debug)]
pub struct Formal {
    pub name: Name,
    pub ty: Name,
    /// Lazy parameters receive an unevaluated thunk instead of a value.
    pub lazy: bool,
    pub pos: Pos,
}

impl Formal {
    pub fn new(name: Name, ty: Name, lazy: bool, pos: Pos) -> Self {
        Formal {
            name,
            ty,
            lazy,
            pos,
        }
    }
}

/// A `var` property declaration.
#[derive(Clone, Debug)]
pub struct Property {
    pub name: Name,
    /// Declared type, if the source wrote one.
    pub declared: Option<Name>,
    /// Resolved type: declared, or inferred from the initializer.
    pub ty: TypeSlot,
    pub value: Option<Rc<Expr>>,
    pub pos: Pos,
}

impl Property {
    pub fn new(name: Name, declared: Option<Name>, value: Option<Rc<Expr>>, pos: Pos) -> Self {
        let ty = TypeSlot::new();
        if let Some(declared) = declared {
            ty.set(declared);
        }
        Property {
            name,
            declared,
            ty,
            value,
            pos,
        }
    }
}

/// A `def` function definition.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: Name,
    pub params: Vec<Formal>,
    pub return_type: Name,
    pub body: Rc<Expr>,
    pub is_override: bool,
    pub is_private: bool,
    pub pos: Pos,
}

impl Function {
    /// Signature equality: name plus ordered parameter types. The return
    /// type does not participate; it is what override shadowing and
    /// duplicate detection are blind to.
    pub fn same_signature(&self, other: &Function) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Whether this function matches a call by name and arity.
    pub fn matches(&self, name: Name, arity: usize) -> bool {
        self.name == name && self.params.len() == arity
    }

    /// Ordered parameter types.
    pub fn param_types(&self) -> Vec<Name> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Render the signature, e.g. `max(a: Int, b: Int): Int`.
    pub fn signature(&self, interner: &SharedInterner) -> String {
        let mut out = interner.resolve(self.name).to_string();
        out.push('(');
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&interner.resolve(param.name));
            out.push_str(": ");
            out.push_str(&interner.resolve(param.ty));
        }
        out.push(')');
        if self.return_type != builtin::VOID {
            out.push_str(": ");
            out.push_str(&interner.resolve(self.return_type));
        }
        out
    }
}

/// A class definition.
#[derive(Clone, Debug)]
pub struct Class {
    pub name: Name,
    /// Ordered constructor parameters.
    pub params: Vec<Formal>,
    /// `None` only for the root `Object` class.
    pub superclass: Option<Name>,
    /// Arguments forwarded to the superclass constructor.
    pub super_args: Vec<Rc<Expr>>,
    pub properties: Vec<Property>,
    pub functions: Vec<Rc<Function>>,
    /// Whether a module loader should expose this class to importers.
    pub exported: bool,
    pub pos: Pos,
}

impl Class {
    /// A class with no parameters, members or superclass arguments.
    pub fn empty(name: Name, superclass: Option<Name>) -> Self {
        Class {
            name,
            params: Vec::new(),
            superclass,
            super_args: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            exported: false,
            pos: Pos::ORIGIN,
        }
    }

    /// Whether this class itself declares `name` as a property.
    pub fn has_property(&self, name: Name) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// This class's own declaration of property `name`.
    pub fn get_property(&self, name: Name) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Whether this class itself declares a function called `name`.
    pub fn has_function_named(&self, name: Name) -> bool {
        self.functions.iter().any(|f| f.name == name)
    }
}

/// A parsed compilation unit: an ordered list of classes.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub classes: Vec<Rc<Class>>,
}

impl Program {
    pub fn new(classes: Vec<Rc<Class>>) -> Self {
        Program { classes }
    }

    /// The classes a module loader may hand to importers.
    pub fn exported_classes(&self) -> Vec<Rc<Class>> {
        self.classes
            .iter()
            .filter(|c| c.exported)
            .cloned()
            .collect()
    }
}
