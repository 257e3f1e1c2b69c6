//! Expression nodes.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::{Name, Pos};

/// Who last wrote a type slot.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum SlotOrigin {
    Checker,
    Runtime,
}

/// The single inferred-type slot every expression carries.
///
/// The type checker writes it exactly once via [`TypeSlot::set`]; after
/// producing a value the evaluator re-stamps the slot with the value's
/// runtime class via [`TypeSlot::stamp`]. The origin marker lets the
/// evaluator run its one defensive agreement check against the checker's
/// annotation without tripping over its own earlier stamps.
#[derive(Clone, Default)]
pub struct TypeSlot(Cell<Option<(Name, SlotOrigin)>>);

impl TypeSlot {
    /// An empty, unannotated slot.
    pub fn new() -> Self {
        TypeSlot(Cell::new(None))
    }

    /// The annotated type, if any.
    #[inline]
    pub fn get(&self) -> Option<Name> {
        self.0.get().map(|(ty, _)| ty)
    }

    /// Annotate the slot (the checker's write).
    #[inline]
    pub fn set(&self, ty: Name) {
        self.0.set(Some((ty, SlotOrigin::Checker)));
    }

    /// Overwrite the slot with a runtime class (the evaluator's stamp).
    #[inline]
    pub fn stamp(&self, ty: Name) {
        self.0.set(Some((ty, SlotOrigin::Runtime)));
    }

    /// Whether the current annotation is the checker's, still unstamped.
    #[inline]
    pub fn from_checker(&self) -> bool {
        matches!(self.0.get(), Some((_, SlotOrigin::Checker)))
    }

    /// Whether the slot has been annotated.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }
}

impl fmt::Debug for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some((ty, origin)) => write!(f, "TypeSlot({ty:?}, {origin:?})"),
            None => write!(f, "TypeSlot(-)"),
        }
    }
}

/// An expression: kind, source position, inferred-type slot.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
    pub ty: TypeSlot,
}

impl Expr {
    /// Create an unannotated expression.
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Expr {
            kind,
            pos,
            ty: TypeSlot::new(),
        }
    }

    /// Create an `Rc`-wrapped expression, the form AST children take.
    pub fn shared(kind: ExprKind, pos: Pos) -> Rc<Self> {
        Rc::new(Expr::new(kind, pos))
    }
}

/// A single `name [: Type] [= value]` binding inside a `let`.
#[derive(Clone, Debug)]
pub struct Binding {
    pub name: Name,
    /// Declared type, if the source wrote one.
    pub declared: Option<Name>,
    /// Resolved type: the declared type, or the type inferred from the
    /// initializer by the checker.
    pub ty: TypeSlot,
    pub value: Option<Rc<Expr>>,
    pub pos: Pos,
}

/// Expression variants.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Integer literal, raw spelling retained until evaluation.
    Integer(Name),
    /// Decimal literal (fraction or exponent form), raw spelling retained.
    Decimal(Name),
    /// String literal, retaining quotes and raw escape sequences.
    Str(Name),
    /// Boolean literal.
    Boolean(bool),
    /// The `null` literal.
    Null,

    /// A plain identifier reference.
    Reference(Name),

    /// `target OP= value`; `operator` is the full spelling (`=`, `+=`, ...).
    Assignment {
        target: Name,
        operator: Name,
        value: Rc<Expr>,
    },

    /// `left OP right`; the operator is its spelling, resolved later as a
    /// method call on `left`.
    Binary {
        operator: Name,
        left: Rc<Expr>,
        right: Rc<Expr>,
    },

    /// `OP operand`, resolved later as a call to `unary_OP` on the operand.
    Unary { operator: Name, operand: Rc<Expr> },

    /// `receiver.function(args)`; no receiver means the current class.
    Call {
        receiver: Option<Rc<Expr>>,
        function: Name,
        args: Vec<Rc<Expr>>,
    },

    /// `super.function(args)`.
    SuperCall { function: Name, args: Vec<Rc<Expr>> },

    /// `new Class(args)`.
    ConstructorCall { class: Name, args: Vec<Rc<Expr>> },

    /// `object as Class`.
    Cast { object: Rc<Expr>, class: Name },

    /// `if (condition) then_branch [else else_branch]`.
    If {
        condition: Rc<Expr>,
        then_branch: Rc<Expr>,
        else_branch: Option<Rc<Expr>>,
    },

    /// `while (condition) body`; always of type Void.
    While { condition: Rc<Expr>, body: Rc<Expr> },

    /// `let bindings in body`.
    Let {
        bindings: Vec<Binding>,
        body: Rc<Expr>,
    },

    /// `{ expr* }`, newline-separated.
    Block(Vec<Rc<Expr>>),

    /// The current receiver.
    This,

    /// A host-callable body, identified by its hook name in the session's
    /// native table. Dispatch treats it exactly like a source-level body.
    Native(Name),
}
