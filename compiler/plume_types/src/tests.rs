use std::rc::Rc;

use plume_ir::{builtin, Class, Expr, ExprKind, Formal, Function, Name, Pos, SharedInterner};
use pretty_assertions::assert_eq;

use crate::hierarchy::{
    collect_overloads, conform, find_function_to_apply, inheritance_depth, least_upper_bound,
};
use crate::{OverloadResolution, SharedRegistry, Symbol, SymbolTable, TypeErrorKind};

fn null_body() -> Rc<Expr> {
    Expr::shared(ExprKind::Null, Pos::ORIGIN)
}

fn function(
    interner: &SharedInterner,
    name: &str,
    param_types: &[Name],
    return_type: Name,
    is_override: bool,
) -> Rc<Function> {
    let params = param_types
        .iter()
        .enumerate()
        .map(|(i, &ty)| Formal::new(interner.intern(&format!("p{i}")), ty, false, Pos::ORIGIN))
        .collect();
    Rc::new(Function {
        name: interner.intern(name),
        params,
        return_type,
        body: null_body(),
        is_override,
        is_private: false,
        pos: Pos::ORIGIN,
    })
}

fn install(
    registry: &SharedRegistry,
    interner: &SharedInterner,
    name: Name,
    superclass: Option<Name>,
    functions: Vec<Rc<Function>>,
) {
    let mut class = Class::empty(name, superclass);
    class.functions = functions;
    if let Err(e) = registry.add(Rc::new(class), interner, Pos::ORIGIN) {
        panic!("registration failed: {e}");
    }
}

/// Object <- Shape <- Circle, plus Dot as a second Shape subclass.
fn shapes() -> (SharedRegistry, SharedInterner, Name, Name, Name) {
    let registry = SharedRegistry::new();
    let interner = SharedInterner::default();
    let shape = interner.intern("Shape");
    let circle = interner.intern("Circle");
    let dot = interner.intern("Dot");

    install(&registry, &interner, builtin::OBJECT, None, Vec::new());
    install(&registry, &interner, shape, Some(builtin::OBJECT), Vec::new());
    install(&registry, &interner, circle, Some(shape), Vec::new());
    install(&registry, &interner, dot, Some(shape), Vec::new());

    (registry, interner, shape, circle, dot)
}

#[test]
fn conformance_is_reflexive_and_upward() {
    let (registry, _, shape, circle, _) = shapes();

    assert!(conform(&registry, circle, circle));
    assert!(conform(&registry, circle, shape));
    assert!(conform(&registry, circle, builtin::OBJECT));
    assert!(!conform(&registry, shape, circle));
}

#[test]
fn null_conforms_to_non_primitive_types_only() {
    let (registry, _, shape, _, _) = shapes();

    assert!(conform(&registry, builtin::NULL, shape));
    assert!(conform(&registry, builtin::NULL, builtin::OBJECT));
    assert!(!conform(&registry, builtin::NULL, builtin::INT));
    assert!(!conform(&registry, builtin::NULL, builtin::BOOL));
}

#[test]
fn least_upper_bound_of_siblings_is_the_parent() {
    let (registry, _, shape, circle, dot) = shapes();

    assert_eq!(least_upper_bound(&registry, circle, dot), shape);
    assert_eq!(least_upper_bound(&registry, circle, circle), circle);
    assert_eq!(least_upper_bound(&registry, circle, shape), shape);
    assert_eq!(
        least_upper_bound(&registry, circle, builtin::OBJECT),
        builtin::OBJECT
    );
}

#[test]
fn null_unifies_to_the_other_branch() {
    let (registry, _, _, circle, _) = shapes();
    assert_eq!(least_upper_bound(&registry, builtin::NULL, circle), circle);
    assert_eq!(least_upper_bound(&registry, circle, builtin::NULL), circle);
}

#[test]
fn depth_counts_superclass_steps() {
    let (registry, _, shape, circle, _) = shapes();
    assert_eq!(inheritance_depth(&registry, builtin::OBJECT), 0);
    assert_eq!(inheritance_depth(&registry, shape), 1);
    assert_eq!(inheritance_depth(&registry, circle), 2);
}

#[test]
fn superclass_cycle_is_rejected_at_registration() {
    let registry = SharedRegistry::new();
    let interner = SharedInterner::default();
    let a = interner.intern("A");
    let b = interner.intern("B");

    install(&registry, &interner, a, Some(b), Vec::new());

    let cyclic = Rc::new(Class::empty(b, Some(a)));
    let err = match registry.add(cyclic, &interner, Pos::ORIGIN) {
        Err(err) => err,
        Ok(()) => panic!("cycle registered"),
    };
    assert_eq!(
        err.kind,
        TypeErrorKind::SuperclassCycle {
            name: "B".to_owned()
        }
    );
}

#[test]
fn override_replaces_the_inherited_signature() {
    let registry = SharedRegistry::new();
    let interner = SharedInterner::default();
    let base = interner.intern("Base");
    let derived = interner.intern("Derived");

    let in_base = function(&interner, "size", &[builtin::INT], builtin::INT, false);
    let in_derived = function(&interner, "size", &[builtin::INT], builtin::INT, true);

    install(&registry, &interner, builtin::OBJECT, None, Vec::new());
    install(&registry, &interner, base, Some(builtin::OBJECT), vec![in_base]);
    install(&registry, &interner, derived, Some(base), vec![Rc::clone(&in_derived)]);

    let overloads = collect_overloads(&registry, derived, interner.intern("size"), 1);
    assert_eq!(overloads.len(), 1);
    assert!(Rc::ptr_eq(&overloads[0], &in_derived));
}

#[test]
fn most_specific_overload_wins() {
    let registry = SharedRegistry::new();
    let interner = SharedInterner::default();
    let calc = interner.intern("Calc");

    let ints = function(
        &interner,
        "max",
        &[builtin::INT, builtin::INT],
        builtin::INT,
        false,
    );
    let objects = function(
        &interner,
        "max",
        &[builtin::OBJECT, builtin::OBJECT],
        builtin::OBJECT,
        false,
    );

    install(&registry, &interner, builtin::OBJECT, None, Vec::new());
    install(
        &registry,
        &interner,
        calc,
        Some(builtin::OBJECT),
        vec![Rc::clone(&ints), objects],
    );

    let resolution = find_function_to_apply(
        &registry,
        calc,
        interner.intern("max"),
        &[builtin::INT, builtin::INT],
    );
    let OverloadResolution::Resolved(winner) = resolution else {
        panic!("expected a resolution, got {resolution:?}");
    };
    assert!(Rc::ptr_eq(&winner, &ints));
}

#[test]
fn incomparable_overloads_are_ambiguous() {
    let registry = SharedRegistry::new();
    let interner = SharedInterner::default();
    let calc = interner.intern("Calc");

    // (Int, Object) and (Object, Int) both accept (Int, Int) but neither is
    // more specific than the other.
    let left = function(
        &interner,
        "pick",
        &[builtin::INT, builtin::OBJECT],
        builtin::INT,
        false,
    );
    let right = function(
        &interner,
        "pick",
        &[builtin::OBJECT, builtin::INT],
        builtin::INT,
        false,
    );

    install(&registry, &interner, builtin::OBJECT, None, Vec::new());
    install(
        &registry,
        &interner,
        calc,
        Some(builtin::OBJECT),
        vec![left, right],
    );

    let resolution = find_function_to_apply(
        &registry,
        calc,
        interner.intern("pick"),
        &[builtin::INT, builtin::INT],
    );
    assert!(matches!(resolution, OverloadResolution::Ambiguous));
}

#[test]
fn no_applicable_overload() {
    let registry = SharedRegistry::new();
    let interner = SharedInterner::default();
    let calc = interner.intern("Calc");

    let ints = function(&interner, "inc", &[builtin::INT], builtin::INT, false);
    install(&registry, &interner, builtin::OBJECT, None, Vec::new());
    install(&registry, &interner, calc, Some(builtin::OBJECT), vec![ints]);

    let resolution =
        find_function_to_apply(&registry, calc, interner.intern("inc"), &[builtin::STRING]);
    assert!(matches!(resolution, OverloadResolution::NoApplicable));
}

#[test]
fn symbol_table_scoping() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let mut table = SymbolTable::new();
    table.enter_scope();
    table.add(Symbol::new(x, Some(builtin::INT), Pos::ORIGIN));
    assert!(table.is_declared_here(x));

    table.enter_scope();
    assert!(!table.is_declared_here(x));
    let found = table.find(x);
    assert_eq!(found.and_then(|s| s.ty), Some(builtin::INT));

    table.add(Symbol::new(x, Some(builtin::STRING), Pos::ORIGIN));
    assert_eq!(table.find(x).and_then(|s| s.ty), Some(builtin::STRING));

    table.exit_scope();
    assert_eq!(table.find(x).and_then(|s| s.ty), Some(builtin::INT));
}

#[test]
fn late_typed_symbols() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let mut table = SymbolTable::new();
    table.enter_scope();
    table.add(Symbol::new(x, None, Pos::ORIGIN));
    assert!(table.set_type(x, builtin::BOOL));
    assert_eq!(table.find(x).and_then(|s| s.ty), Some(builtin::BOOL));
    assert!(!table.set_type(interner.intern("y"), builtin::BOOL));
}
