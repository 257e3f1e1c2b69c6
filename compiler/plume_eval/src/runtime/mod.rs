//! Builtin runtime classes.
//!
//! These are pre-built [`Class`] values whose function bodies are host
//! callables behind [`NativeFn`] hooks; the evaluator's dispatch treats
//! them exactly like source-level bodies. [`install`] registers the classes
//! into the context's shared registry — the same registry the checker sees
//! — and the hooks into its native table.

mod boolean;
mod io;
mod math;
mod misc;
mod numbers;
mod object;
mod string;

use std::rc::Rc;

use plume_ir::{Class, Expr, ExprKind, Formal, Function, Name, Pos, SharedInterner};
use plume_types::TypeError;

use crate::context::{Context, NativeFn};
use crate::error::{EvalError, EvalErrorKind};
use crate::evaluator;
use crate::value::Value;
use crate::EvalResult;

/// A built class definition plus its host callables.
pub(crate) struct BuiltinClass {
    class: Rc<Class>,
    natives: Vec<(Name, NativeFn)>,
}

/// Assembles one builtin class: methods get `Native(hook)` bodies and the
/// matching hook registrations.
pub(crate) struct ClassBuilder {
    interner: SharedInterner,
    name: Name,
    superclass: Option<Name>,
    functions: Vec<Rc<Function>>,
    natives: Vec<(Name, NativeFn)>,
}

impl ClassBuilder {
    pub(crate) fn new(interner: &SharedInterner, name: Name, superclass: Option<Name>) -> Self {
        ClassBuilder {
            interner: interner.clone(),
            name,
            superclass,
            functions: Vec::new(),
            natives: Vec::new(),
        }
    }

    /// Add a method. `params` are `(name, type, lazy)` triples; the hook
    /// name encodes class, method and parameter types, so every overload
    /// gets its own callable.
    pub(crate) fn method<F>(
        &mut self,
        name: &str,
        params: &[(&str, Name, bool)],
        return_type: Name,
        is_override: bool,
        body: F,
    ) where
        F: Fn(&mut Context) -> EvalResult<Value> + 'static,
    {
        let param_types: Vec<String> = params
            .iter()
            .map(|&(_, ty, _)| self.interner.resolve(ty).to_string())
            .collect();
        let hook_spelling = format!(
            "{}::{}({})",
            self.interner.resolve(self.name),
            name,
            param_types.join(",")
        );
        let hook = self.interner.intern(&hook_spelling);

        let formals = params
            .iter()
            .map(|&(param_name, ty, lazy)| {
                Formal::new(self.interner.intern(param_name), ty, lazy, Pos::ORIGIN)
            })
            .collect();

        self.functions.push(Rc::new(Function {
            name: self.interner.intern(name),
            params: formals,
            return_type,
            body: Expr::shared(ExprKind::Native(hook), Pos::ORIGIN),
            is_override,
            is_private: false,
            pos: Pos::ORIGIN,
        }));
        self.natives.push((hook, Rc::new(body)));
    }

    pub(crate) fn finish(self) -> BuiltinClass {
        let mut class = Class::empty(self.name, self.superclass);
        class.functions = self.functions;
        BuiltinClass {
            class: Rc::new(class),
            natives: self.natives,
        }
    }
}

/// Register every builtin class and its host callables into `ctx`.
pub fn install(ctx: &Context) -> Result<(), TypeError> {
    let interner = &ctx.interner;
    let builtins = [
        object::build(interner),
        numbers::int(interner),
        numbers::double(interner),
        boolean::build(interner),
        string::build(interner),
        misc::null_class(interner),
        misc::void_class(interner),
        misc::predef(interner),
        math::build(interner),
        io::build(interner),
    ];

    for builtin in builtins {
        ctx.registry.add(builtin.class, interner, Pos::ORIGIN)?;
        let mut natives = ctx.natives.borrow_mut();
        for (hook, callable) in builtin.natives {
            natives.insert(hook, callable);
        }
    }
    Ok(())
}

// Shared accessors for native bodies.

/// The parameter `name`, resolved through the normal reference path (which
/// is what forces and memoizes a lazy argument).
pub(crate) fn arg(ctx: &mut Context, name: &str) -> EvalResult<Value> {
    let name = ctx.interner.intern(name);
    evaluator::force_reference(ctx, name, Pos::ORIGIN)
}

pub(crate) fn contract_violation(hook: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NativeContract {
            hook: hook.to_owned(),
        },
        Pos::ORIGIN,
    )
}

pub(crate) fn int_payload(value: &Value, hook: &str) -> EvalResult<i64> {
    value.borrow().as_int().ok_or_else(|| contract_violation(hook))
}

pub(crate) fn number_payload(value: &Value, hook: &str) -> EvalResult<f64> {
    value
        .borrow()
        .as_number()
        .ok_or_else(|| contract_violation(hook))
}

pub(crate) fn bool_payload(value: &Value, hook: &str) -> EvalResult<bool> {
    value
        .borrow()
        .as_bool()
        .ok_or_else(|| contract_violation(hook))
}

pub(crate) fn str_payload(value: &Value, hook: &str) -> EvalResult<String> {
    value
        .borrow()
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| contract_violation(hook))
}
