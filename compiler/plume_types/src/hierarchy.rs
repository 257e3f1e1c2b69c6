//! Conformance, least upper bound and overload resolution over the live
//! class hierarchy.
//!
//! These algorithms are shared verbatim by the type checker and the
//! evaluator's defensive re-resolution, which is what keeps static and
//! dynamic dispatch agreeing on the same function.

use std::rc::Rc;

use plume_ir::{builtin, Function, Name};

use crate::registry::SharedRegistry;

/// Subtype compatibility: `a` conforms to `b` iff `b` is Object, the two
/// are equal, `a` is Null and `b` is not primitive, or walking `a`'s
/// ancestor chain reaches `b`.
pub fn conform(registry: &SharedRegistry, a: Name, b: Name) -> bool {
    if b == builtin::OBJECT || a == b {
        return true;
    }
    if a == builtin::NULL && !builtin::is_primitive(b) {
        return true;
    }

    let mut ancestor = registry.get(a).and_then(|c| c.superclass);
    while let Some(current) = ancestor {
        if current == b {
            return true;
        }
        ancestor = registry.get(current).and_then(|c| c.superclass);
    }
    false
}

/// Pairwise conformance of two equally-long type lists.
pub fn all_conform(registry: &SharedRegistry, from: &[Name], to: &[Name]) -> bool {
    from.len() == to.len()
        && from
            .iter()
            .zip(to.iter())
            .all(|(&a, &b)| conform(registry, a, b))
}

/// Number of superclass steps from `ty` up to the root.
pub fn inheritance_depth(registry: &SharedRegistry, ty: Name) -> usize {
    let mut depth = 0;
    let mut ancestor = registry.get(ty).and_then(|c| c.superclass);
    while let Some(current) = ancestor {
        depth += 1;
        ancestor = registry.get(current).and_then(|c| c.superclass);
    }
    depth
}

/// The most specific common ancestor of two types.
///
/// Identical types unify to themselves and Null unifies to the other type;
/// otherwise the deeper of the two steps toward Object one level at a time
/// until the chains meet.
pub fn least_upper_bound(registry: &SharedRegistry, a: Name, b: Name) -> Name {
    if a == b {
        return a;
    }
    if a == builtin::NULL {
        return b;
    }
    if b == builtin::NULL {
        return a;
    }

    let step = |ty: Name| {
        registry
            .get(ty)
            .and_then(|c| c.superclass)
            .unwrap_or(builtin::OBJECT)
    };

    let mut x = a;
    let mut y = b;
    while x != y {
        if inheritance_depth(registry, x) > inheritance_depth(registry, y) {
            x = step(x);
        } else {
            y = step(y);
        }
    }
    x
}

/// Whether any class along the chain from `class` declares a function
/// called `name`.
pub fn has_function_named(registry: &SharedRegistry, class: Name, name: Name) -> bool {
    let mut current = Some(class);
    while let Some(ty) = current {
        let Some(definition) = registry.get(ty) else {
            return false;
        };
        if definition.has_function_named(name) {
            return true;
        }
        current = definition.superclass;
    }
    false
}

/// Collect the same-named, same-arity functions across the whole superclass
/// chain, root first. A subclass definition flagged `override` replaces the
/// inherited function with the matching signature instead of duplicating it.
pub fn collect_overloads(
    registry: &SharedRegistry,
    class: Name,
    name: Name,
    arity: usize,
) -> Vec<Rc<Function>> {
    // Root-to-leaf order so leaf definitions land after the ones they shadow.
    let mut chain = Vec::new();
    let mut current = Some(class);
    while let Some(ty) = current {
        let Some(definition) = registry.get(ty) else {
            break;
        };
        current = definition.superclass;
        chain.push(definition);
    }
    chain.reverse();

    let mut overloads: Vec<Rc<Function>> = Vec::new();
    for definition in chain {
        for function in definition.functions.iter().filter(|f| f.matches(name, arity)) {
            if let Some(i) = overloads.iter().position(|m| m.same_signature(function)) {
                if function.is_override {
                    overloads.remove(i);
                }
            }
            overloads.push(Rc::clone(function));
        }
    }
    overloads
}

/// Search the chain starting at `superclass` for a function with the same
/// signature as `function`; this is what legitimizes an `override` flag.
pub fn find_overridden(
    registry: &SharedRegistry,
    superclass: Option<Name>,
    function: &Function,
) -> Option<Rc<Function>> {
    let mut current = superclass;
    while let Some(ty) = current {
        let definition = registry.get(ty)?;
        if let Some(found) = definition
            .functions
            .iter()
            .find(|f| f.same_signature(function))
        {
            return Some(Rc::clone(found));
        }
        current = definition.superclass;
    }
    None
}

/// Outcome of overload resolution.
#[derive(Clone, Debug)]
pub enum OverloadResolution {
    /// The unique most specific applicable overload.
    Resolved(Rc<Function>),
    /// No overload accepts the argument types.
    NoApplicable,
    /// More than one applicable overload survives specificity reduction.
    Ambiguous,
}

/// Pick the unique most specific function among `functions` whose declared
/// parameter types all accept `arg_types`.
///
/// A is more specific than B iff A's parameter types all conform to B's.
pub fn most_specific_in(
    registry: &SharedRegistry,
    functions: &[Rc<Function>],
    name: Name,
    arg_types: &[Name],
) -> OverloadResolution {
    let mut applicable: Vec<Rc<Function>> = Vec::new();
    for function in functions {
        if !function.matches(name, arg_types.len()) {
            continue;
        }
        if !all_conform(registry, arg_types, &function.param_types()) {
            continue;
        }
        // A leaf-most redefinition with an identical signature shadows the
        // earlier entry for the purposes of specificity.
        if let Some(i) = applicable.iter().position(|m| m.same_signature(function)) {
            applicable.remove(i);
        }
        applicable.push(Rc::clone(function));
    }

    if applicable.is_empty() {
        return OverloadResolution::NoApplicable;
    }

    let mut minimal = applicable.iter().filter(|f| {
        applicable
            .iter()
            .all(|g| all_conform(registry, &f.param_types(), &g.param_types()))
    });

    match (minimal.next(), minimal.next()) {
        (Some(winner), None) => OverloadResolution::Resolved(Rc::clone(winner)),
        _ => OverloadResolution::Ambiguous,
    }
}

/// Resolve a call on the static class `class`: collect the chain-wide
/// overloads, then reduce to the unique most specific applicable one.
pub fn find_function_to_apply(
    registry: &SharedRegistry,
    class: Name,
    name: Name,
    arg_types: &[Name],
) -> OverloadResolution {
    let overloads = collect_overloads(registry, class, name, arg_types.len());
    most_specific_in(registry, &overloads, name, arg_types)
}
