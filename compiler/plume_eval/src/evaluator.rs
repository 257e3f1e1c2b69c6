//! The evaluator: walks the type-annotated AST against a [`Context`],
//! producing values.
//!
//! Operators desugar into the same method calls the checker resolved — one
//! evaluation path for every operator. Overloads are re-resolved
//! defensively at each dispatch; an unresolvable one signals a
//! checker/evaluator inconsistency, not a user mistake.

use std::rc::Rc;

use tracing::trace;

use plume_ir::{builtin, Binding, Expr, ExprKind, Function, Name, Pos, Property};
use plume_types::hierarchy::{self, OverloadResolution};

use crate::context::Context;
use crate::error::{EvalError, EvalErrorKind};
use crate::store::Address;
use crate::value::{self, Cell, Obj, Thunk, Value};
use crate::EvalResult;

/// Evaluate one expression.
///
/// After producing a value the expression's type slot is re-stamped with
/// the value's runtime class. On the first evaluation after checking, the
/// runtime class must conform to the checker's annotation; a disagreement
/// is an internal-consistency fault. (Void-typed positions are exempt: an
/// else-less `if` is statically Void yet yields its branch's value.)
pub fn evaluate(ctx: &mut Context, expr: &Expr) -> EvalResult<Value> {
    let produced = match &expr.kind {
        ExprKind::Integer(spelling) => {
            let raw = ctx.interner.resolve(*spelling);
            let parsed: i64 = raw.parse().map_err(|_| {
                EvalError::new(
                    EvalErrorKind::MalformedLiteral {
                        what: "integer",
                        spelling: raw.to_string(),
                    },
                    expr.pos,
                )
            })?;
            value::make_int(&ctx.registry, parsed)?
        }

        ExprKind::Decimal(spelling) => {
            let raw = ctx.interner.resolve(*spelling);
            let parsed: f64 = raw.parse().map_err(|_| {
                EvalError::new(
                    EvalErrorKind::MalformedLiteral {
                        what: "decimal",
                        spelling: raw.to_string(),
                    },
                    expr.pos,
                )
            })?;
            value::make_double(&ctx.registry, parsed)?
        }

        // Quotes are stripped and escape sequences decoded here, not in the
        // lexer.
        ExprKind::Str(spelling) => {
            let raw = ctx.interner.resolve(*spelling);
            value::make_string(&ctx.registry, unescape_string(&raw))?
        }

        ExprKind::Boolean(b) => value::make_bool(&ctx.registry, *b)?,
        ExprKind::Null => value::make_null(&ctx.registry)?,
        ExprKind::This => ctx.self_value(expr.pos)?,

        ExprKind::Reference(name) => force_reference(ctx, *name, expr.pos)?,

        ExprKind::Assignment {
            target,
            operator,
            value,
        } => evaluate_assignment(ctx, *target, *operator, value, expr.pos)?,

        // `a OP b` runs as a call of OP on a with b as sole argument.
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let receiver = evaluate(ctx, left)?;
            call_function(ctx, receiver, *operator, std::slice::from_ref(right), expr.pos)?
        }

        // `OP a` runs as a call of `unary_OP` on a.
        ExprKind::Unary { operator, operand } => {
            let receiver = evaluate(ctx, operand)?;
            let method = unary_method_name(ctx, *operator);
            call_function(ctx, receiver, method, &[], expr.pos)?
        }

        ExprKind::Call {
            receiver,
            function,
            args,
        } => {
            let object = match receiver {
                Some(r) => evaluate(ctx, r)?,
                None => ctx.self_value(expr.pos)?,
            };
            call_function(ctx, object, *function, args, expr.pos)?
        }

        ExprKind::SuperCall { function, args } => {
            evaluate_super_call(ctx, *function, args, expr.pos)?
        }

        ExprKind::ConstructorCall { class, args } => {
            evaluate_constructor_call(ctx, *class, args, expr.pos)?
        }

        ExprKind::Cast { object, class } => evaluate_cast(ctx, object, *class)?,

        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let chosen = bool_value(ctx, condition)?;
            if chosen {
                evaluate(ctx, then_branch)?
            } else if let Some(else_branch) = else_branch {
                evaluate(ctx, else_branch)?
            } else {
                value::make_void(&ctx.registry)?
            }
        }

        ExprKind::While { condition, body } => {
            while bool_value(ctx, condition)? {
                evaluate(ctx, body)?;
            }
            value::make_void(&ctx.registry)?
        }

        ExprKind::Let { bindings, body } => evaluate_let(ctx, bindings, body)?,

        ExprKind::Block(expressions) => evaluate_block(ctx, expressions)?,

        ExprKind::Native(hook) => call_native(ctx, *hook, expr.pos)?,
    };

    stamp(ctx, expr, &produced)?;
    Ok(produced)
}

/// Re-stamp the expression's type slot with the value's runtime class,
/// first running the defensive agreement check against a fresh checker
/// annotation.
fn stamp(ctx: &Context, expr: &Expr, produced: &Value) -> EvalResult<()> {
    let runtime = produced.borrow().class;

    if expr.ty.from_checker() {
        if let Some(inferred) = expr.ty.get() {
            if inferred != builtin::VOID && !hierarchy::conform(&ctx.registry, runtime, inferred) {
                return Err(EvalError::new(
                    EvalErrorKind::InconsistentType {
                        found: ctx.name_of(runtime),
                        expected: ctx.name_of(inferred),
                    },
                    expr.pos,
                ));
            }
        }
    }

    expr.ty.stamp(runtime);
    Ok(())
}

/// Resolve a reference: lexical address first, then a property of `self`.
/// A slot still holding a thunk is forced once and overwritten with the
/// result before it is returned.
pub fn force_reference(ctx: &mut Context, name: Name, pos: Pos) -> EvalResult<Value> {
    let address = ctx.environment.borrow().find(name);
    if let Some(address) = address {
        let cell = ctx.store.borrow().get(address);
        return match cell {
            Some(Cell::Value(value)) => Ok(value),
            Some(Cell::Thunk(thunk)) => {
                let value = force_thunk(&thunk)?;
                ctx.store
                    .borrow_mut()
                    .put(address, Cell::Value(Rc::clone(&value)));
                Ok(value)
            }
            None => Err(undefined_reference(ctx, name, pos)),
        };
    }

    let Some(self_obj) = ctx.self_obj.clone() else {
        return Err(undefined_reference(ctx, name, pos));
    };
    let cell = self_obj.borrow().get(name);
    match cell {
        Some(Cell::Value(value)) => Ok(value),
        Some(Cell::Thunk(thunk)) => {
            let value = force_thunk(&thunk)?;
            self_obj
                .borrow_mut()
                .set(name, Cell::Value(Rc::clone(&value)));
            Ok(value)
        }
        None => Err(undefined_reference(ctx, name, pos)),
    }
}

/// Evaluate a thunk's expression in its captured (shared-state) context.
fn force_thunk(thunk: &Thunk) -> EvalResult<Value> {
    let mut captured = thunk.context.clone();
    evaluate(&mut captured, &thunk.expr)
}

fn evaluate_assignment(
    ctx: &mut Context,
    target: Name,
    operator: Name,
    value_expr: &Rc<Expr>,
    pos: Pos,
) -> EvalResult<Value> {
    let address = ctx.environment.borrow().find(target);

    let operator_spelling = ctx.interner.resolve(operator);
    let new_value = if &*operator_spelling == "=" {
        evaluate(ctx, value_expr)?
    } else {
        // `a OP= b` runs OP (the compound's first character) on a with b.
        let method_spelling: String = operator_spelling.chars().take(1).collect();
        let method = ctx.interner.intern(&method_spelling);
        let receiver = force_reference(ctx, target, pos)?;
        call_function(ctx, receiver, method, std::slice::from_ref(value_expr), pos)?
    };

    if let Some(address) = address {
        ctx.store.borrow_mut().put(address, Cell::Value(new_value));
    } else if let Some(self_obj) = ctx.self_obj.clone() {
        if self_obj.borrow().has(target) {
            self_obj.borrow_mut().set(target, Cell::Value(new_value));
        }
    }

    value::make_void(&ctx.registry)
}

/// Dispatch a call on a receiver value: select the concrete function via
/// the same most-specific-overload reduction the checker ran, against the
/// receiver's flattened method table.
pub fn call_function(
    ctx: &mut Context,
    receiver: Value,
    function: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> EvalResult<Value> {
    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(arg.ty.get().ok_or_else(|| {
            EvalError::new(EvalErrorKind::Unannotated, arg.pos)
        })?);
    }

    let resolution = {
        let obj = receiver.borrow();
        hierarchy::most_specific_in(&ctx.registry, &obj.methods, function, &arg_types)
    };
    let resolved = match resolution {
        OverloadResolution::Resolved(f) => f,
        _ => {
            let class = receiver.borrow().class;
            return Err(EvalError::new(
                EvalErrorKind::UnresolvedOverload {
                    function: ctx.name_of(function),
                    class: ctx.name_of(class),
                },
                pos,
            ));
        }
    };

    execute_call(ctx, receiver, &resolved, args, pos)
}

/// Run a selected function against a receiver: new scope; eager arguments
/// evaluated into fresh addresses; lazy ones stored as thunks capturing the
/// caller's context; `self` rebound for the body; parameter addresses freed
/// and caller state restored afterward.
pub fn execute_call(
    ctx: &mut Context,
    receiver: Value,
    function: &Rc<Function>,
    args: &[Rc<Expr>],
    pos: Pos,
) -> EvalResult<Value> {
    trace!(function = %ctx.name_of(function.name), "execute_call");

    ctx.environment.borrow_mut().enter_scope();
    let saved_self = ctx.self_obj.clone();

    let result = execute_call_scoped(ctx, receiver, function, args, pos);

    ctx.self_obj = saved_self;
    ctx.environment.borrow_mut().exit_scope();
    result
}

fn execute_call_scoped(
    ctx: &mut Context,
    receiver: Value,
    function: &Rc<Function>,
    args: &[Rc<Expr>],
    pos: Pos,
) -> EvalResult<Value> {
    // Arguments are evaluated (or captured) against the caller's self.
    let mut cells = Vec::with_capacity(args.len());
    for (param, arg) in function.params.iter().zip(args.iter()) {
        if param.lazy {
            cells.push(Cell::Thunk(Thunk {
                expr: Rc::clone(arg),
                context: ctx.snapshot(),
            }));
        } else {
            cells.push(Cell::Value(evaluate(ctx, arg)?));
        }
    }

    let mut addresses: Vec<Address> = Vec::with_capacity(cells.len());
    for (param, cell) in function.params.iter().zip(cells) {
        let address = ctx.store.borrow_mut().alloc(cell);
        ctx.environment.borrow_mut().add(param.name, address);
        addresses.push(address);
    }

    ctx.self_obj = Some(receiver);
    let result = match function.body.kind {
        ExprKind::Native(hook) => call_native(ctx, hook, pos),
        _ => evaluate(ctx, &function.body),
    };

    for address in addresses {
        ctx.store.borrow_mut().free(address);
    }
    result
}

/// `super.f(args)`: select via the same reduction, but starting the
/// overload collection at the receiver class's superclass; the body still
/// executes against the current `self`.
fn evaluate_super_call(
    ctx: &mut Context,
    function: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> EvalResult<Value> {
    let self_obj = ctx.self_value(pos)?;
    let self_class = self_obj.borrow().class;
    let base = ctx
        .get_class(self_class, pos)?
        .superclass
        .ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::NoSuperclass {
                    class: ctx.name_of(self_class),
                },
                pos,
            )
        })?;

    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(arg.ty.get().ok_or_else(|| {
            EvalError::new(EvalErrorKind::Unannotated, arg.pos)
        })?);
    }

    let resolution = hierarchy::find_function_to_apply(&ctx.registry, base, function, &arg_types);
    let resolved = match resolution {
        OverloadResolution::Resolved(f) => f,
        _ => {
            return Err(EvalError::new(
                EvalErrorKind::UnresolvedOverload {
                    function: ctx.name_of(function),
                    class: ctx.name_of(base),
                },
                pos,
            ))
        }
    };

    execute_call(ctx, self_obj, &resolved, args, pos)
}

/// `new C(args)`: build the default-initialized instance (superclass fields
/// first, root to leaf), then run the constructor chain against it.
fn evaluate_constructor_call(
    ctx: &mut Context,
    class: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> EvalResult<Value> {
    let object = Obj::create(&ctx.registry, class)?;
    construct(ctx, &object, class, args, pos)?;
    Ok(object)
}

/// Bind constructor parameters, recurse into the superclass constructor,
/// then evaluate own declared properties in order — all against a `self`
/// already carrying the inherited and parameter fields.
fn construct(
    ctx: &mut Context,
    object: &Value,
    class: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> EvalResult<()> {
    let definition = ctx.get_class(class, pos)?;

    // Constructor arguments run in the caller's context.
    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        arg_values.push(evaluate(ctx, arg)?);
    }

    let saved_self = ctx.self_obj.replace(Rc::clone(object));
    let result = (|| -> EvalResult<()> {
        for (param, value) in definition.params.iter().zip(arg_values) {
            object.borrow_mut().set(param.name, Cell::Value(value));
        }

        if let Some(superclass) = definition.superclass {
            construct(ctx, object, superclass, &definition.super_args, pos)?;
        }

        for property in &definition.properties {
            let value = evaluate_property(ctx, property)?;
            object.borrow_mut().set(property.name, Cell::Value(value));
        }
        Ok(())
    })();
    ctx.self_obj = saved_self;
    result
}

/// A property's constructor-time value: its initializer, else the default
/// for its resolved type.
pub fn evaluate_property(ctx: &mut Context, property: &Property) -> EvalResult<Value> {
    match &property.value {
        Some(init) => evaluate(ctx, init),
        None => value::default_value(&ctx.registry, property.ty.get()),
    }
}

/// `object as C`: a fresh instance of C carrying the object's properties
/// and native payload.
fn evaluate_cast(ctx: &mut Context, object: &Rc<Expr>, class: Name) -> EvalResult<Value> {
    let source = evaluate(ctx, object)?;
    let target = Obj::create(&ctx.registry, class)?;

    {
        let src = source.borrow();
        let mut dst = target.borrow_mut();
        for (name, cell) in src.properties() {
            dst.set(*name, cell.clone());
        }
        dst.native = src.native.clone();
    }

    Ok(target)
}

/// Evaluate each initializer in order into a fresh address, run the body,
/// then free exactly the addresses this `let` allocated.
fn evaluate_let(ctx: &mut Context, bindings: &[Binding], body: &Rc<Expr>) -> EvalResult<Value> {
    let mut addresses: Vec<Address> = Vec::with_capacity(bindings.len());

    for binding in bindings {
        let value = match &binding.value {
            Some(init) => evaluate(ctx, init)?,
            None => value::default_value(&ctx.registry, binding.ty.get())?,
        };
        let address = ctx.store.borrow_mut().alloc(Cell::Value(value));
        ctx.environment.borrow_mut().add(binding.name, address);
        addresses.push(address);
    }

    let result = evaluate(ctx, body);

    for address in addresses {
        ctx.store.borrow_mut().free(address);
    }
    result
}

fn evaluate_block(ctx: &mut Context, expressions: &[Rc<Expr>]) -> EvalResult<Value> {
    if expressions.is_empty() {
        return value::make_void(&ctx.registry);
    }

    ctx.environment.borrow_mut().enter_scope();
    let result = (|| {
        let mut last = value::make_void(&ctx.registry)?;
        for expression in expressions {
            last = evaluate(ctx, expression)?;
        }
        Ok(last)
    })();
    ctx.environment.borrow_mut().exit_scope();
    result
}

/// Run a registered host callable.
pub fn call_native(ctx: &mut Context, hook: Name, pos: Pos) -> EvalResult<Value> {
    let callable = ctx.natives.borrow().get(hook);
    match callable {
        Some(f) => f(ctx),
        None => Err(EvalError::new(
            EvalErrorKind::UnknownNative {
                hook: ctx.name_of(hook),
            },
            pos,
        )),
    }
}

/// Evaluate a condition down to its boolean payload.
fn bool_value(ctx: &mut Context, condition: &Rc<Expr>) -> EvalResult<bool> {
    let value = evaluate(ctx, condition)?;
    let b = value.borrow().as_bool();
    b.ok_or_else(|| EvalError::new(EvalErrorKind::NotABoolean, condition.pos))
}

/// Render a value through its own `toString` method.
pub fn to_display_string(ctx: &mut Context, value: &Value) -> EvalResult<String> {
    let to_string = ctx.interner.intern("toString");
    let rendered = call_function(ctx, Rc::clone(value), to_string, &[], Pos::ORIGIN)?;
    let out = rendered
        .borrow()
        .as_str()
        .map(ToOwned::to_owned)
        .unwrap_or_default();
    Ok(out)
}

/// `-` dispatches `unary_-`, and so on for every unary operator.
fn unary_method_name(ctx: &Context, operator: Name) -> Name {
    let spelling = format!("unary_{}", ctx.interner.resolve(operator));
    ctx.interner.intern(&spelling)
}

/// Strip the surrounding quotes and decode the escape sequences the string
/// FSM accepted.
fn unescape_string(raw: &str) -> String {
    let mut chars: Vec<char> = raw.chars().collect();
    // Drop the surrounding quotes the lexer kept.
    if chars.len() >= 2 {
        chars.pop();
        chars.remove(0);
    }

    let mut out = String::with_capacity(chars.len());
    let mut iter = chars.into_iter();
    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn undefined_reference(ctx: &Context, name: Name, pos: Pos) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedReference {
            name: ctx.name_of(name),
        },
        pos,
    )
}

#[cfg(test)]
mod unescape_tests {
    use super::unescape_string;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_quotes_and_decodes_escapes() {
        assert_eq!(unescape_string("\"plain\""), "plain");
        assert_eq!(unescape_string(r#""a\"b""#), "a\"b");
        assert_eq!(unescape_string(r#""line\nbreak""#), "line\nbreak");
        assert_eq!(unescape_string(r#""back\\slash""#), "back\\slash");
        assert_eq!(unescape_string("\"\""), "");
    }
}
