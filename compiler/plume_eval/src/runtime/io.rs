//! The `IO` class; a session binds one instance of it as `IO`.
//!
//! Output goes through the context's pluggable sink, so tests can capture
//! what a program printed.

use std::io::Write;

use plume_ir::{builtin, SharedInterner};

use super::{arg, BuiltinClass, ClassBuilder};
use crate::evaluator;
use crate::value::make_void;

pub(crate) fn build(interner: &SharedInterner) -> BuiltinClass {
    let mut builder = ClassBuilder::new(interner, builtin::IO, Some(builtin::OBJECT));

    builder.method(
        "println",
        &[("s", builtin::OBJECT, false)],
        builtin::VOID,
        false,
        |ctx| {
            let value = arg(ctx, "s")?;
            let rendered = evaluator::to_display_string(ctx, &value)?;
            let _ = writeln!(ctx.output.borrow_mut(), "{rendered}");
            make_void(&ctx.registry)
        },
    );

    builder.method("println", &[], builtin::VOID, false, |ctx| {
        let _ = writeln!(ctx.output.borrow_mut());
        make_void(&ctx.registry)
    });

    builder.method(
        "print",
        &[("s", builtin::OBJECT, false)],
        builtin::VOID,
        false,
        |ctx| {
            let value = arg(ctx, "s")?;
            let rendered = evaluator::to_display_string(ctx, &value)?;
            let _ = write!(ctx.output.borrow_mut(), "{rendered}");
            make_void(&ctx.registry)
        },
    );

    builder.finish()
}
