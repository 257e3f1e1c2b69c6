//! The `String` class.

use plume_ir::{builtin, Pos, SharedInterner};

use super::{arg, int_payload, str_payload, BuiltinClass, ClassBuilder};
use crate::evaluator;
use crate::value::{make_bool, make_int, make_string};

pub(crate) fn build(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::STRING, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = str_payload(&receiver, "String::toString()")?;
        make_string(&ctx.registry, value)
    });

    builder.method(
        "==",
        &[("rhs", builtin::OBJECT, false)],
        builtin::BOOL,
        true,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = str_payload(&receiver, "String::==(Object)")?;
            let rhs = arg(ctx, "rhs")?;
            let equal = rhs.borrow().as_str() == Some(lhs.as_str());
            make_bool(&ctx.registry, equal)
        },
    );

    // Concatenation renders the right operand through its own toString.
    builder.method(
        "+",
        &[("rhs", builtin::OBJECT, false)],
        builtin::STRING,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = str_payload(&receiver, "String::+(Object)")?;
            let rhs = arg(ctx, "rhs")?;
            let rendered = evaluator::to_display_string(ctx, &rhs)?;
            make_string(&ctx.registry, format!("{lhs}{rendered}"))
        },
    );

    builder.method("length", &[], builtin::INT, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = str_payload(&receiver, "String::length()")?;
        make_int(&ctx.registry, value.chars().count() as i64)
    });

    builder.method(
        "contains",
        &[("s", builtin::STRING, false)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = str_payload(&receiver, "String::contains(String)")?;
            let needle = str_payload(&arg(ctx, "s")?, "String::contains(String)")?;
            make_bool(&ctx.registry, lhs.contains(&needle))
        },
    );

    builder.method(
        "startsWith",
        &[("s", builtin::STRING, false)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = str_payload(&receiver, "String::startsWith(String)")?;
            let prefix = str_payload(&arg(ctx, "s")?, "String::startsWith(String)")?;
            make_bool(&ctx.registry, lhs.starts_with(&prefix))
        },
    );

    builder.method(
        "endsWith",
        &[("s", builtin::STRING, false)],
        builtin::BOOL,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let lhs = str_payload(&receiver, "String::endsWith(String)")?;
            let suffix = str_payload(&arg(ctx, "s")?, "String::endsWith(String)")?;
            make_bool(&ctx.registry, lhs.ends_with(&suffix))
        },
    );

    builder.method(
        "at",
        &[("i", builtin::INT, false)],
        builtin::STRING,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let value = str_payload(&receiver, "String::at(Int)")?;
            let index = int_payload(&arg(ctx, "i")?, "String::at(Int)")?;
            let picked = usize::try_from(index)
                .ok()
                .and_then(|i| value.chars().nth(i))
                .map(String::from)
                .unwrap_or_default();
            make_string(&ctx.registry, picked)
        },
    );

    builder.method(
        "substring",
        &[("start", builtin::INT, false), ("end", builtin::INT, false)],
        builtin::STRING,
        false,
        |ctx| {
            let receiver = ctx.self_value(Pos::ORIGIN)?;
            let value = str_payload(&receiver, "String::substring(Int,Int)")?;
            let start = int_payload(&arg(ctx, "start")?, "String::substring(Int,Int)")?;
            let end = int_payload(&arg(ctx, "end")?, "String::substring(Int,Int)")?;

            let chars: Vec<char> = value.chars().collect();
            let start = usize::try_from(start.max(0)).unwrap_or(0).min(chars.len());
            let end = usize::try_from(end.max(0)).unwrap_or(0).min(chars.len());
            let sliced: String = if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            };
            make_string(&ctx.registry, sliced)
        },
    );

    builder.method("trim", &[], builtin::STRING, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = str_payload(&receiver, "String::trim()")?;
        make_string(&ctx.registry, value.trim().to_owned())
    });

    builder.method("toUpper", &[], builtin::STRING, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = str_payload(&receiver, "String::toUpper()")?;
        make_string(&ctx.registry, value.to_uppercase())
    });

    builder.method("toLower", &[], builtin::STRING, false, |ctx| {
        let receiver = ctx.self_value(Pos::ORIGIN)?;
        let value = str_payload(&receiver, "String::toLower()")?;
        make_string(&ctx.registry, value.to_lowercase())
    });

    builder.finish()
}
