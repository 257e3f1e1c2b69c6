//! The `Math` class; a session binds one instance of it as `Math`.

use plume_ir::{builtin, SharedInterner};

use super::{arg, int_payload, number_payload, BuiltinClass, ClassBuilder};
use crate::value::{make_double, make_int};

pub(crate) fn build(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::MATH, Some(builtin::OBJECT));

    builder.method("pi", &[], builtin::DOUBLE, false, |ctx| {
        make_double(&ctx.registry, std::f64::consts::PI)
    });

    builder.method("e", &[], builtin::DOUBLE, false, |ctx| {
        make_double(&ctx.registry, std::f64::consts::E)
    });

    builder.method(
        "abs",
        &[("x", builtin::DOUBLE, false)],
        builtin::DOUBLE,
        false,
        |ctx| {
            let x = number_payload(&arg(ctx, "x")?, "Math::abs(Double)")?;
            make_double(&ctx.registry, x.abs())
        },
    );

    builder.method(
        "abs",
        &[("x", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let x = int_payload(&arg(ctx, "x")?, "Math::abs(Int)")?;
            make_int(&ctx.registry, x.wrapping_abs())
        },
    );

    builder.method(
        "sqrt",
        &[("x", builtin::DOUBLE, false)],
        builtin::DOUBLE,
        false,
        |ctx| {
            let x = number_payload(&arg(ctx, "x")?, "Math::sqrt(Double)")?;
            make_double(&ctx.registry, x.sqrt())
        },
    );

    builder.method(
        "pow",
        &[("x", builtin::DOUBLE, false), ("y", builtin::DOUBLE, false)],
        builtin::DOUBLE,
        false,
        |ctx| {
            let x = number_payload(&arg(ctx, "x")?, "Math::pow(Double,Double)")?;
            let y = number_payload(&arg(ctx, "y")?, "Math::pow(Double,Double)")?;
            make_double(&ctx.registry, x.powf(y))
        },
    );

    builder.method(
        "max",
        &[("a", builtin::INT, false), ("b", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let a = int_payload(&arg(ctx, "a")?, "Math::max(Int,Int)")?;
            let b = int_payload(&arg(ctx, "b")?, "Math::max(Int,Int)")?;
            make_int(&ctx.registry, a.max(b))
        },
    );

    builder.method(
        "min",
        &[("a", builtin::INT, false), ("b", builtin::INT, false)],
        builtin::INT,
        false,
        |ctx| {
            let a = int_payload(&arg(ctx, "a")?, "Math::min(Int,Int)")?;
            let b = int_payload(&arg(ctx, "b")?, "Math::min(Int,Int)")?;
            make_int(&ctx.registry, a.min(b))
        },
    );

    builder.finish()
}
