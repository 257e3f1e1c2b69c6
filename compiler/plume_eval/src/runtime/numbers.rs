//! The numeric classes, `Int` and `Double`.
//!
//! Arithmetic is overloaded over both operand classes: an Int operand
//! keeps an Int result where possible, a Double operand widens the result.
//! Integer division and modulo by zero raise; Double arithmetic follows
//! IEEE semantics.

use plume_ir::{builtin, Name, Pos, SharedInterner};

use super::{arg, int_payload, number_payload, BuiltinClass, ClassBuilder};
use crate::error::{EvalError, EvalErrorKind};
use crate::value::{make_bool, make_double, make_int, make_string};

fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero, Pos::ORIGIN)
}

/// Numeric equality used by both classes' `==`: true only against another
/// Int or Double with the same numeric value.
fn numeric_equals(builder: &mut ClassBuilder, hook: &'static str) {
    builder.method(
        "==",
        &[("rhs", builtin::OBJECT, false)],
        builtin::BOOL,
        true,
        move |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = number_payload(&receiver, hook)?;
            let rhs = arg(ctx, "rhs")?;
            let rhs_number = rhs.borrow().as_number();
            let equal = match rhs_number {
                Some(value) => (lhs - value).abs() == 0.0,
                None => false,
            };
            make_bool(&ctx.registry, equal)
        },
    );
}

fn comparisons(builder: &mut ClassBuilder, rhs_ty: Name, hook_class: &'static str) {
    for (op, cmp) in [
        ("<", std::cmp::Ordering::Less),
        (">", std::cmp::Ordering::Greater),
    ] {
        let strict = move |a: f64, b: f64| a.partial_cmp(&b) == Some(cmp);
        builder.method(op, &[("rhs", rhs_ty, false)], builtin::BOOL, false, move |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = number_payload(&receiver, hook_class)?;
            let rhs = number_payload(&arg(ctx, "rhs")?, hook_class)?;
            make_bool(&ctx.registry, strict(lhs, rhs))
        });

        let or_equal = move |a: f64, b: f64| {
            matches!(a.partial_cmp(&b), Some(ordering) if ordering == cmp || ordering.is_eq())
        };
        let op_equal = if op == "<" { "<=" } else { ">=" };
        builder.method(
            op_equal,
            &[("rhs", rhs_ty, false)],
            builtin::BOOL,
            false,
            move |ctx| {
                let receiver = ctx.self_value(Pos::ORIGIN)?;
                let lhs = number_payload(&receiver, hook_class)?;
                let rhs = number_payload(&arg(ctx, "rhs")?, hook_class)?;
                make_bool(&ctx.registry, or_equal(lhs, rhs))
            },
        );
    }
}

pub(crate) fn int(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::INT, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = int_payload(&receiver, "Int::toString()")?;
        make_string(&ctx.registry, value.to_string())
    });

    numeric_equals(&mut builder, "Int::==(Object)");

    builder.method("unary_-", &[], builtin::INT, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = int_payload(&receiver, "Int::unary_-()")?;
        make_int(&ctx.registry, value.wrapping_neg())
    });

    builder.method(
        "%",
        &[("rhs", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = int_payload(&receiver, "Int::%(Int)")?;
            let rhs = int_payload(&arg(ctx, "rhs")?, "Int::%(Int)")?;
            if rhs == 0 {
                return Err(division_by_zero());
            }
            make_int(&ctx.registry, lhs.wrapping_rem(rhs))
        },
    );

    // Int OP Int stays Int; Int OP Double widens.
    builder.method(
        "+",
        &[("rhs", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = int_payload(&receiver, "Int::+(Int)")?;
            let rhs = int_payload(&arg(ctx, "rhs")?, "Int::+(Int)")?;
            make_int(&ctx.registry, lhs.wrapping_add(rhs))
        },
    );
    builder.method(
        "-",
        &[("rhs", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = int_payload(&receiver, "Int::-(Int)")?;
            let rhs = int_payload(&arg(ctx, "rhs")?, "Int::-(Int)")?;
            make_int(&ctx.registry, lhs.wrapping_sub(rhs))
        },
    );
    builder.method(
        "*",
        &[("rhs", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = int_payload(&receiver, "Int::*(Int)")?;
            let rhs = int_payload(&arg(ctx, "rhs")?, "Int::*(Int)")?;
            make_int(&ctx.registry, lhs.wrapping_mul(rhs))
        },
    );
    builder.method(
        "/",
        &[("rhs", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = int_payload(&receiver, "Int::/(Int)")?;
            let rhs = int_payload(&arg(ctx, "rhs")?, "Int::/(Int)")?;
            if rhs == 0 {
                return Err(division_by_zero());
            }
            make_int(&ctx.registry, lhs.wrapping_div(rhs))
        },
    );

    for (op, f) in double_arithmetic() {
        builder.method(
            op,
            &[("rhs", builtin::DOUBLE, false)],
            builtin::DOUBLE,
            false,
            move |ctx| {
                let receiver = ctx.self_value(Pos::ORIGIN)?;
                let lhs = number_payload(&receiver, "Int::(Double)")?;
                let rhs = number_payload(&arg(ctx, "rhs")?, "Int::(Double)")?;
                make_double(&ctx.registry, f(lhs, rhs))
            },
        );
    }

    comparisons(&mut builder, builtin::INT, "Int::compare(Int)");
    comparisons(&mut builder, builtin::DOUBLE, "Int::compare(Double)");

    builder.method("toDouble", &[], builtin::DOUBLE, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = int_payload(&receiver, "Int::toDouble()")?;
        make_double(&ctx.registry, value as f64)
    });

    builder.finish()
}

fn double_arithmetic() -> [(&'static str, fn(f64, f64) -> f64); 4] {
    [
        ("+", |a, b| a + b),
        ("-", |a, b| a - b),
        ("*", |a, b| a * b),
        ("/", |a, b| a / b),
    ]
}

pub(crate) fn double(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::DOUBLE, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = receiver
            .borrow()
            .as_double()
            .ok_or_else(|| super::contract_violation("Double::toString()"))?;
        make_string(&ctx.registry, value.to_string())
    });

    numeric_equals(&mut builder, "Double::==(Object)");

    builder.method("unary_-", &[], builtin::DOUBLE, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = number_payload(&receiver, "Double::unary_-()")?;
        make_double(&ctx.registry, -value)
    });

    for rhs_ty in [builtin::INT, builtin::DOUBLE] {
        for (op, f) in double_arithmetic() {
            builder.method(
                op,
                &[("rhs", rhs_ty, false)],
                builtin::DOUBLE,
                false,
                move |ctx| {
                    let receiver = ctx.self_value(Pos::ORIGIN)?;
                    let lhs = number_payload(&receiver, "Double::arith")?;
                    let rhs = number_payload(&arg(ctx, "rhs")?, "Double::arith")?;
                    make_double(&ctx.registry, f(lhs, rhs))
                },
            );
        }
        comparisons(&mut builder, rhs_ty, "Double::compare");
    }

    builder.method("toInt", &[], builtin::INT, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = number_payload(&receiver, "Double::toInt()")?;
        let truncated = if value.is_finite() {
            value.trunc() as i64
        } else {
            0
        };
        make_int(&ctx.registry, truncated)
    });

    builder.finish()
}
