//! `Null`, `Void` and the session receiver class `Predef`.

use plume_ir::{builtin, SharedInterner};

use super::{arg, BuiltinClass, ClassBuilder};
use crate::value::{make_bool, make_string};

pub(crate) fn null_class(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::NULL, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        make_string(&ctx.registry, "null".to_owned())
    });

    builder.method(
        "==",
        &[("rhs", builtin::OBJECT, false)],
        builtin::BOOL,
        true,
        |ctx| {
            let rhs = arg(ctx, "rhs")?;
            let is_null = rhs.borrow().class == builtin::NULL;
            make_bool(&ctx.registry, is_null)
        },
    );

    builder.finish()
}

pub(crate) fn void_class(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::VOID, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        make_string(&ctx.registry, "()".to_owned())
    });

    builder.finish()
}

/// The class a session's top-level `self` is an instance of; properties and
/// functions defined at the top level are injected into it.
pub(crate) fn predef(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::PREDEF, Some(builtin::OBJECT));

    builder.method("toString", &[], builtin::STRING, true, |ctx| {
        make_string(&ctx.registry, "Predef".to_owned())
    });

    builder.finish()
}
