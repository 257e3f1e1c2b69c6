//! The type checker.
//!
//! `check_expr` writes every visited expression's inferred-type slot exactly
//! once and fails fast on any violation. Operators are not special: a binary
//! `a OP b` is checked as a call of method `OP` on `a` with `b` as the sole
//! argument, and `OP a` as a call of `unary_OP` — the single source of truth
//! for operator semantics, overloading included.

use std::rc::Rc;

use tracing::debug;

use plume_ir::{builtin, Binding, Class, Expr, ExprKind, Function, Name, Pos, Program, Property};
use plume_types::hierarchy::{self, OverloadResolution};
use plume_types::{Symbol, TypeError, TypeErrorKind};

use crate::env::TypeEnvironment;

/// Result alias for checking.
pub type TypeResult<T> = Result<T, TypeError>;

/// Check a whole program: register every class first (duplicates and
/// superclass cycles are rejected here), then check each class body.
pub fn check_program(env: &mut TypeEnvironment, program: &Program) -> TypeResult<()> {
    debug!(classes = program.classes.len(), "check_program");

    for class in &program.classes {
        if env.has_class(class.name) {
            return Err(TypeError::new(
                TypeErrorKind::DuplicateClass {
                    name: env.name_of(class.name),
                },
                class.pos,
            ));
        }
        env.add_class(Rc::clone(class), class.pos)?;
    }

    for class in &program.classes {
        check_class(env, class)?;
    }
    Ok(())
}

/// Check one class body: constructor parameters become symbols in a fresh
/// scope, the super-constructor call is checked against the superclass's
/// declared parameters, then properties and functions in order.
pub fn check_class(env: &mut TypeEnvironment, class: &Rc<Class>) -> TypeResult<()> {
    debug!(name = %env.name_of(class.name), "check_class");

    let previous = env.current_class.replace(Rc::clone(class));
    env.symbols.enter_scope();

    for param in &class.params {
        if env.symbols.is_declared_here(param.name) {
            return Err(TypeError::new(
                TypeErrorKind::DuplicateClassParameter {
                    parameter: env.name_of(param.name),
                    class: env.name_of(class.name),
                },
                param.pos,
            ));
        }
        env.symbols
            .add(Symbol::new(param.name, Some(param.ty), param.pos));
    }

    if let Some(superclass) = class.superclass {
        check_constructor_call(env, superclass, &class.super_args, class.pos)?;
    }

    for property in &class.properties {
        check_property(env, property)?;
    }

    for function in &class.functions {
        if env.has_function(class.name, function) {
            return Err(TypeError::new(
                TypeErrorKind::DuplicateSignature {
                    signature: function.signature(&env.interner),
                    class: env.name_of(class.name),
                },
                function.pos,
            ));
        }
        env.add_function(class.name, Rc::clone(function));
        check_function(env, function)?;
    }

    env.symbols.exit_scope();
    env.current_class = previous;
    Ok(())
}

/// Check one function: an `override` flag must be backed by a same-signature
/// function somewhere up the superclass chain, parameters become symbols in
/// a fresh scope, and the body must conform to the declared return type.
/// Native bodies are opaque host callables and are assigned their declared
/// return type without descending.
pub fn check_function(env: &mut TypeEnvironment, function: &Function) -> TypeResult<()> {
    if function.is_override {
        let superclass = env.current_class.as_ref().and_then(|c| c.superclass);
        if hierarchy::find_overridden(&env.registry, superclass, function).is_none() {
            return Err(TypeError::new(
                TypeErrorKind::NothingToOverride {
                    signature: function.signature(&env.interner),
                },
                function.pos,
            ));
        }
    }

    env.symbols.enter_scope();

    for param in &function.params {
        if env.symbols.is_declared_here(param.name) {
            return Err(TypeError::new(
                TypeErrorKind::DuplicateParameter {
                    parameter: env.name_of(param.name),
                    function: env.name_of(function.name),
                },
                param.pos,
            ));
        }
        env.symbols
            .add(Symbol::new(param.name, Some(param.ty), param.pos));
    }

    if matches!(function.body.kind, ExprKind::Native(_)) {
        function.body.ty.set(function.return_type);
    } else {
        let body = check_expr(env, &function.body)?;
        if !hierarchy::conform(&env.registry, body, function.return_type) {
            return Err(TypeError::new(
                TypeErrorKind::ReturnTypeMismatch {
                    function: env.name_of(function.name),
                    body: env.name_of(body),
                    declared: env.name_of(function.return_type),
                },
                function.pos,
            ));
        }
    }

    env.symbols.exit_scope();
    Ok(())
}

/// Check one property: the type is inferred from the initializer when
/// undeclared, otherwise the initializer must conform to it. The property
/// then becomes a symbol of the enclosing class scope.
pub fn check_property(env: &mut TypeEnvironment, property: &Property) -> TypeResult<()> {
    if env.symbols.is_declared_here(property.name) {
        return Err(TypeError::new(
            TypeErrorKind::PropertyAlreadyInScope {
                name: env.name_of(property.name),
            },
            property.pos,
        ));
    }

    if let Some(value) = &property.value {
        let value_ty = check_expr(env, value)?;
        match property.declared {
            None => property.ty.set(value_ty),
            Some(declared) => {
                if !hierarchy::conform(&env.registry, value_ty, declared) {
                    return Err(TypeError::new(
                        TypeErrorKind::PropertyTypeMismatch {
                            name: env.name_of(property.name),
                            value: env.name_of(value_ty),
                            declared: env.name_of(declared),
                        },
                        property.pos,
                    ));
                }
            }
        }
    }

    env.symbols
        .add(Symbol::new(property.name, property.ty.get(), property.pos));
    Ok(())
}

/// Check one expression, annotate its type slot, and return the type.
pub fn check_expr(env: &mut TypeEnvironment, expr: &Expr) -> TypeResult<Name> {
    let ty = match &expr.kind {
        ExprKind::Integer(_) => builtin::INT,
        ExprKind::Decimal(_) => builtin::DOUBLE,
        ExprKind::Str(_) => builtin::STRING,
        ExprKind::Boolean(_) => builtin::BOOL,
        ExprKind::Null => builtin::NULL,

        ExprKind::Reference(name) => check_reference(env, *name, expr.pos)?,

        ExprKind::Assignment {
            target,
            operator: _,
            value,
        } => check_assignment(env, *target, value, expr.pos)?,

        // `a OP b` is a call of method OP on a with b as sole argument.
        ExprKind::Binary {
            operator,
            left,
            right,
        } => check_call(env, Some(left), *operator, std::slice::from_ref(right), expr.pos)?,

        // `OP a` is a call of `unary_OP` on a.
        ExprKind::Unary { operator, operand } => {
            let name = unary_method_name(env, *operator);
            check_call(env, Some(operand), name, &[], expr.pos)?
        }

        ExprKind::Call {
            receiver,
            function,
            args,
        } => check_call(env, receiver.as_ref(), *function, args, expr.pos)?,

        ExprKind::SuperCall { function, args } => check_super_call(env, *function, args, expr.pos)?,

        ExprKind::ConstructorCall { class, args } => {
            check_constructor_call(env, *class, args, expr.pos)?
        }

        ExprKind::Cast { object, class } => check_cast(env, object, *class, expr.pos)?,

        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => check_if(env, condition, then_branch, else_branch.as_ref(), expr.pos)?,

        ExprKind::While { condition, body } => check_while(env, condition, body)?,

        ExprKind::Let { bindings, body } => check_let(env, bindings, body)?,

        ExprKind::Block(expressions) => check_block(env, expressions)?,

        ExprKind::This => match &env.current_class {
            Some(class) => class.name,
            None => {
                return Err(TypeError::new(
                    TypeErrorKind::UndefinedIdentifier {
                        name: "this".to_owned(),
                    },
                    expr.pos,
                ))
            }
        },

        // An opaque host callable; only reachable outside a function body in
        // hand-built class definitions, which declare their own types.
        ExprKind::Native(_) => builtin::VOID,
    };

    expr.ty.set(ty);
    Ok(ty)
}

/// References resolve through local scopes first, then the current class's
/// own declared properties.
fn check_reference(env: &mut TypeEnvironment, name: Name, pos: Pos) -> TypeResult<Name> {
    if let Some(symbol) = env.symbols.find(name) {
        if let Some(ty) = symbol.ty {
            return Ok(ty);
        }
        return Err(TypeError::new(
            TypeErrorKind::UndefinedIdentifier {
                name: env.name_of(name),
            },
            pos,
        ));
    }

    if let Some(property) = env
        .current_class
        .as_ref()
        .and_then(|class| class.get_property(name))
    {
        if let Some(ty) = property.ty.get() {
            return Ok(ty);
        }
    }

    Err(TypeError::new(
        TypeErrorKind::UndefinedIdentifier {
            name: env.name_of(name),
        },
        pos,
    ))
}

fn check_assignment(
    env: &mut TypeEnvironment,
    target: Name,
    value: &Rc<Expr>,
    pos: Pos,
) -> TypeResult<Name> {
    let Some(symbol) = env.symbols.find(target) else {
        return Err(TypeError::new(
            TypeErrorKind::AssignmentToUndefined {
                name: env.name_of(target),
            },
            pos,
        ));
    };

    let value_ty = check_expr(env, value)?;

    match symbol.ty {
        // A binding declared without type or initializer is typed by its
        // first assignment.
        None => {
            env.symbols.set_type(target, value_ty);
        }
        Some(declared) => {
            if !hierarchy::conform(&env.registry, value_ty, declared) {
                return Err(TypeError::new(
                    TypeErrorKind::AssignmentTypeMismatch {
                        name: env.name_of(target),
                        declared: env.name_of(declared),
                    },
                    pos,
                ));
            }
        }
    }

    Ok(builtin::VOID)
}

/// Resolve a call: receiver's static class (or the current class), collect
/// chain-wide overloads, keep the conforming ones, demand a unique most
/// specific survivor. Private functions are only callable through an
/// implicit or explicit `this` receiver.
fn check_call(
    env: &mut TypeEnvironment,
    receiver: Option<&Rc<Expr>>,
    function: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> TypeResult<Name> {
    let receiver_class = match receiver {
        Some(object) => {
            let object_ty = check_expr(env, object)?;
            env.get_class(object_ty).ok_or_else(|| {
                TypeError::new(
                    TypeErrorKind::UndefinedType {
                        name: env.name_of(object_ty),
                    },
                    pos,
                )
            })?
        }
        None => match &env.current_class {
            Some(class) => Rc::clone(class),
            None => {
                return Err(TypeError::new(
                    TypeErrorKind::UndefinedIdentifier {
                        name: env.name_of(function),
                    },
                    pos,
                ))
            }
        },
    };

    if !hierarchy::has_function_named(&env.registry, receiver_class.name, function) {
        return Err(TypeError::new(
            TypeErrorKind::NoSuchFunction {
                function: env.name_of(function),
                class: env.name_of(receiver_class.name),
            },
            pos,
        ));
    }

    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(check_expr(env, arg)?);
    }

    let resolution =
        hierarchy::find_function_to_apply(&env.registry, receiver_class.name, function, &arg_types);
    let resolved = match resolution {
        OverloadResolution::Resolved(f) => f,
        OverloadResolution::NoApplicable => {
            return Err(TypeError::new(
                TypeErrorKind::NotApplicable {
                    function: env.name_of(function),
                    class: env.name_of(receiver_class.name),
                    arguments: join_types(env, &arg_types),
                },
                pos,
            ))
        }
        OverloadResolution::Ambiguous => {
            return Err(TypeError::new(
                TypeErrorKind::AmbiguousCall {
                    function: env.name_of(function),
                    class: env.name_of(receiver_class.name),
                    arguments: join_types(env, &arg_types),
                },
                pos,
            ))
        }
    };

    let via_this = match receiver {
        None => true,
        Some(object) => matches!(object.kind, ExprKind::This),
    };
    if resolved.is_private && !via_this {
        return Err(TypeError::new(
            TypeErrorKind::PrivateFunction {
                function: env.name_of(function),
                class: env.name_of(receiver_class.name),
            },
            pos,
        ));
    }

    Ok(resolved.return_type)
}

/// `super.f(args)` is checked as a receiverless call with the current class
/// temporarily rebound to its superclass.
fn check_super_call(
    env: &mut TypeEnvironment,
    function: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> TypeResult<Name> {
    let current = env.current_class.clone().ok_or_else(|| {
        TypeError::new(
            TypeErrorKind::UndefinedIdentifier {
                name: "super".to_owned(),
            },
            pos,
        )
    })?;

    let superclass_name = current.superclass.ok_or_else(|| {
        TypeError::new(
            TypeErrorKind::NoSuperclass {
                class: env.name_of(current.name),
            },
            pos,
        )
    })?;
    let superclass = env.get_class(superclass_name).ok_or_else(|| {
        TypeError::new(
            TypeErrorKind::UndefinedType {
                name: env.name_of(superclass_name),
            },
            pos,
        )
    })?;

    env.current_class = Some(superclass);
    let result = check_call(env, None, function, args, pos);
    env.current_class = Some(current);
    result
}

fn check_constructor_call(
    env: &mut TypeEnvironment,
    class: Name,
    args: &[Rc<Expr>],
    pos: Pos,
) -> TypeResult<Name> {
    let Some(definition) = env.get_class(class) else {
        return Err(TypeError::new(
            TypeErrorKind::UndefinedType {
                name: env.name_of(class),
            },
            pos,
        ));
    };

    if definition.params.len() != args.len() {
        return Err(TypeError::new(
            TypeErrorKind::ConstructorArity {
                class: env.name_of(class),
            },
            pos,
        ));
    }

    for (arg, param) in args.iter().zip(definition.params.iter()) {
        let arg_ty = check_expr(env, arg)?;
        if !hierarchy::conform(&env.registry, arg_ty, param.ty) {
            return Err(TypeError::new(
                TypeErrorKind::ConstructorArgumentMismatch {
                    class: env.name_of(class),
                    argument: env.name_of(arg_ty),
                    parameter: env.name_of(param.ty),
                },
                arg.pos,
            ));
        }
    }

    Ok(class)
}

/// `object as Class`: the target must conform to the operand's static type
/// (the downcast direction).
fn check_cast(env: &mut TypeEnvironment, object: &Rc<Expr>, class: Name, pos: Pos) -> TypeResult<Name> {
    let object_ty = check_expr(env, object)?;

    if !env.has_class(class) {
        return Err(TypeError::new(
            TypeErrorKind::UndefinedType {
                name: env.name_of(class),
            },
            pos,
        ));
    }

    if !hierarchy::conform(&env.registry, class, object_ty) {
        return Err(TypeError::new(
            TypeErrorKind::InvalidCast {
                from: env.name_of(object_ty),
                to: env.name_of(class),
            },
            pos,
        ));
    }

    Ok(class)
}

fn check_if(
    env: &mut TypeEnvironment,
    condition: &Rc<Expr>,
    then_branch: &Rc<Expr>,
    else_branch: Option<&Rc<Expr>>,
    _pos: Pos,
) -> TypeResult<Name> {
    let condition_ty = check_expr(env, condition)?;
    if condition_ty != builtin::BOOL {
        return Err(TypeError::new(
            TypeErrorKind::ConditionNotBoolean {
                construct: "if/else expression",
                found: env.name_of(condition_ty),
            },
            condition.pos,
        ));
    }

    let then_ty = check_expr(env, then_branch)?;

    match else_branch {
        None => Ok(builtin::VOID),
        Some(else_branch) => {
            let else_ty = check_expr(env, else_branch)?;
            Ok(hierarchy::least_upper_bound(&env.registry, then_ty, else_ty))
        }
    }
}

fn check_while(
    env: &mut TypeEnvironment,
    condition: &Rc<Expr>,
    body: &Rc<Expr>,
) -> TypeResult<Name> {
    let condition_ty = check_expr(env, condition)?;
    if condition_ty != builtin::BOOL {
        return Err(TypeError::new(
            TypeErrorKind::ConditionNotBoolean {
                construct: "while loop",
                found: env.name_of(condition_ty),
            },
            condition.pos,
        ));
    }

    check_expr(env, body)?;
    Ok(builtin::VOID)
}

fn check_let(
    env: &mut TypeEnvironment,
    bindings: &[Binding],
    body: &Rc<Expr>,
) -> TypeResult<Name> {
    env.symbols.enter_scope();
    for binding in bindings {
        check_binding(env, binding)?;
    }

    let body_ty = check_expr(env, body)?;
    env.symbols.exit_scope();
    Ok(body_ty)
}

fn check_binding(env: &mut TypeEnvironment, binding: &Binding) -> TypeResult<()> {
    if env.symbols.is_declared_here(binding.name) {
        return Err(TypeError::new(
            TypeErrorKind::DuplicateBinding {
                name: env.name_of(binding.name),
            },
            binding.pos,
        ));
    }

    let resolved = match &binding.value {
        None => binding.declared,
        Some(value) => {
            let value_ty = check_expr(env, value)?;
            if let Some(declared) = binding.declared {
                if !hierarchy::conform(&env.registry, value_ty, declared) {
                    return Err(TypeError::new(
                        TypeErrorKind::BindingTypeMismatch {
                            name: env.name_of(binding.name),
                            value: env.name_of(value_ty),
                            declared: env.name_of(declared),
                        },
                        binding.pos,
                    ));
                }
            }
            Some(value_ty)
        }
    };

    if let Some(ty) = resolved {
        binding.ty.set(ty);
    }
    env.symbols
        .add(Symbol::new(binding.name, resolved, binding.pos));
    Ok(())
}

fn check_block(env: &mut TypeEnvironment, expressions: &[Rc<Expr>]) -> TypeResult<Name> {
    env.symbols.enter_scope();

    let mut ty = builtin::VOID;
    for expression in expressions {
        ty = check_expr(env, expression)?;
    }

    env.symbols.exit_scope();
    Ok(ty)
}

/// Spelling of the unary method for an operator: `-` dispatches `unary_-`.
pub fn unary_method_name(env: &TypeEnvironment, operator: Name) -> Name {
    let spelling = format!("unary_{}", env.interner.resolve(operator));
    env.interner.intern(&spelling)
}

fn join_types(env: &TypeEnvironment, types: &[Name]) -> String {
    types
        .iter()
        .map(|&ty| env.name_of(ty))
        .collect::<Vec<_>>()
        .join(",")
}
