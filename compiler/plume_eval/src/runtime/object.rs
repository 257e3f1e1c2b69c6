//! The root `Object` class.

use plume_ir::{builtin, Expr, ExprKind, Pos, SharedInterner};

use super::{arg, bool_payload, str_payload, BuiltinClass, ClassBuilder};
use crate::evaluator;
use crate::value::{make_bool, make_string};

pub(crate) fn build(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::OBJECT, None);

    builder.method("toString", &[], builtin::STRING, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let (class, address) = {
            let obj = receiver.borrow();
            (obj.class, obj.address)
        };
        let rendered = match address {
            Some(address) => format!("{}@{address}", ctx.name_of(class)),
            None => format!("{}@?", ctx.name_of(class)),
        };
        make_string(&ctx.registry, rendered)
    });

    // Reference identity: same class, same address.
    builder.method(
        "==",
        &[("rhs", builtin::OBJECT, false)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let rhs = arg(ctx, "rhs")?;
            let equal = {
                let lhs = receiver.borrow();
                let rhs = rhs.borrow();
                lhs.class == rhs.class && lhs.address == rhs.address
            };
            make_bool(&ctx.registry, equal)
        },
    );

    // Negation of whatever `==` the receiver's class resolves to.
    builder.method(
        "!=",
        &[("rhs", builtin::OBJECT, false)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let rhs_ref = Expr::shared(
                ExprKind::Reference(ctx.interner.intern("rhs")),
                Pos::ORIGIN,
            );
            rhs_ref.ty.stamp(builtin::OBJECT);
            let eq = ctx.interner.intern("==");
            let outcome = evaluator::call_function(ctx, receiver, eq, &[rhs_ref], Pos::ORIGIN)?;
            let equal = bool_payload(&outcome, "Object::!=(Object)")?;
            make_bool(&ctx.registry, !equal)
        },
    );

    builder.method(
        "instanceOf",
        &[("type", builtin::STRING, false)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let wanted = str_payload(&arg(ctx, "type")?, "Object::instanceOf(String)")?;
            let class = receiver.borrow().class;
            make_bool(&ctx.registry, &*ctx.interner.resolve(class) == wanted.as_str())
        },
    );

    // String concatenation through toString, so any object can appear on
    // the left of a string.
    builder.method(
        "+",
        &[("rhs", builtin::STRING, false)],
        builtin::STRING,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let rendered = evaluator::to_display_string(ctx, &receiver)?;
            let rhs = str_payload(&arg(ctx, "rhs")?, "Object::+(String)")?;
            make_string(&ctx.registry, format!("{rendered}{rhs}"))
        },
    );

    builder.finish()
}
