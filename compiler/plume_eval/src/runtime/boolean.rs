//! The `Bool` class.
//!
//! `&&` and `||` take their right operand lazily: the thunk is forced only
//! when the left operand does not already decide the outcome, so a
//! side-effecting right operand never runs behind a short circuit.

use plume_ir::{builtin, Pos, SharedInterner};

use super::{arg, bool_payload, BuiltinClass, ClassBuilder};
use crate::value::{make_bool, make_string};

pub(crate) fn build(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::BOOL, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = bool_payload(&receiver, "Bool::toString()")?;
        make_string(&ctx.registry, value.to_string())
    });

    builder.method(
        "==",
        &[("rhs", builtin::OBJECT, false)],
        builtin::BOOL,
        true,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = bool_payload(&receiver, "Bool::==(Object)")?;
            let rhs = arg(ctx, "rhs")?;
            let rhs_bool = rhs.borrow().as_bool();
            make_bool(&ctx.registry, rhs_bool == Some(lhs))
        },
    );

    builder.method("unary_!", &[], builtin::BOOL, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = bool_payload(&receiver, "Bool::unary_!()")?;
        make_bool(&ctx.registry, !value)
    });

    builder.method(
        "&&",
        &[("rhs", builtin::BOOL, true)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = bool_payload(&receiver, "Bool::&&(Bool)")?;
            if !lhs {
                return make_bool(&ctx.registry, false);
            }
            let rhs = bool_payload(&arg(ctx, "rhs")?, "Bool::&&(Bool)")?;
            make_bool(&ctx.registry, rhs)
        },
    );

    builder.method(
        "||",
        &[("rhs", builtin::BOOL, true)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = bool_payload(&receiver, "Bool::||(Bool)")?;
            if lhs {
                return make_bool(&ctx.registry, true);
            }
            let rhs = bool_payload(&arg(ctx, "rhs")?, "Bool::||(Bool)")?;
            make_bool(&ctx.registry, rhs)
        },
    );

    builder.finish()
}
