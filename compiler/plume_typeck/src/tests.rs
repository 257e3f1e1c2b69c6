use std::rc::Rc;

use plume_ir::{builtin, Class, Expr, ExprKind, Formal, Function, Name, Pos, SharedInterner};
use plume_parse::Parser;
use plume_types::{SharedRegistry, Symbol, TypeErrorKind};
use pretty_assertions::assert_eq;

use crate::checker;
use crate::TypeEnvironment;

/// Signature-only stand-ins for the builtin classes: native bodies are
/// opaque to the checker, so a hook name is all a test double needs.
fn stub_function(
    interner: &SharedInterner,
    name: &str,
    param_types: &[Name],
    return_type: Name,
) -> Rc<Function> {
    let params = param_types
        .iter()
        .enumerate()
        .map(|(i, &ty)| Formal::new(interner.intern(&format!("p{i}")), ty, false, Pos::ORIGIN))
        .collect();
    Rc::new(Function {
        name: interner.intern(name),
        params,
        return_type,
        body: Expr::shared(ExprKind::Native(interner.intern("stub")), Pos::ORIGIN),
        is_override: false,
        is_private: false,
        pos: Pos::ORIGIN,
    })
}

fn env_with_builtins() -> TypeEnvironment {
    let interner = SharedInterner::default();
    let registry = SharedRegistry::new();
    let mut env = TypeEnvironment::new(registry, interner.clone());

    let mut object = Class::empty(builtin::OBJECT, None);
    object.functions = vec![stub_function(
        &interner,
        "toString",
        &[],
        builtin::STRING,
    )];

    let mut int = Class::empty(builtin::INT, Some(builtin::OBJECT));
    int.functions = vec![
        stub_function(&interner, "+", &[builtin::INT], builtin::INT),
        stub_function(&interner, "+", &[builtin::DOUBLE], builtin::DOUBLE),
        stub_function(&interner, "-", &[builtin::INT], builtin::INT),
        stub_function(&interner, "<", &[builtin::INT], builtin::BOOL),
        stub_function(&interner, "unary_-", &[], builtin::INT),
    ];

    let mut double = Class::empty(builtin::DOUBLE, Some(builtin::OBJECT));
    double.functions = vec![stub_function(
        &interner,
        "+",
        &[builtin::DOUBLE],
        builtin::DOUBLE,
    )];

    let mut boolean = Class::empty(builtin::BOOL, Some(builtin::OBJECT));
    boolean.functions = vec![
        stub_function(&interner, "&&", &[builtin::BOOL], builtin::BOOL),
        stub_function(&interner, "unary_!", &[], builtin::BOOL),
    ];

    let string = Class::empty(builtin::STRING, Some(builtin::OBJECT));
    let void = Class::empty(builtin::VOID, Some(builtin::OBJECT));
    let null = Class::empty(builtin::NULL, Some(builtin::OBJECT));
    let predef = Class::empty(builtin::PREDEF, Some(builtin::OBJECT));

    for class in [object, int, double, boolean, string, void, null, predef] {
        if let Err(e) = env.add_class(Rc::new(class), Pos::ORIGIN) {
            panic!("builtin registration failed: {e}");
        }
    }

    env.current_class = env.get_class(builtin::PREDEF);
    env.symbols.enter_scope();
    env
}

fn parse(env: &TypeEnvironment, source: &str) -> Rc<Expr> {
    let mut parser = match Parser::new(source, env.interner.clone()) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    match parser.parse_expression() {
        Ok(expr) => expr,
        Err(e) => panic!("parse failed: {e}"),
    }
}

fn check(env: &mut TypeEnvironment, source: &str) -> Result<Name, plume_types::TypeError> {
    let expr = parse(env, source);
    checker::check_expr(env, &expr)
}

fn check_ok(env: &mut TypeEnvironment, source: &str) -> Name {
    match check(env, source) {
        Ok(ty) => ty,
        Err(e) => panic!("{source:?} failed to check: {e}"),
    }
}

fn check_err(env: &mut TypeEnvironment, source: &str) -> TypeErrorKind {
    match check(env, source) {
        Err(e) => e.kind,
        Ok(ty) => panic!("{source:?} checked to {ty:?}"),
    }
}

#[test]
fn literals() {
    let mut env = env_with_builtins();
    assert_eq!(check_ok(&mut env, "42"), builtin::INT);
    assert_eq!(check_ok(&mut env, "4.2"), builtin::DOUBLE);
    assert_eq!(check_ok(&mut env, "\"hi\""), builtin::STRING);
    assert_eq!(check_ok(&mut env, "true"), builtin::BOOL);
    assert_eq!(check_ok(&mut env, "null"), builtin::NULL);
}

#[test]
fn chained_addition_checks_to_int() {
    let mut env = env_with_builtins();
    let expr = parse(&env, "1 + 2 + 3 + 4 + 5");
    let ty = match checker::check_expr(&mut env, &expr) {
        Ok(ty) => ty,
        Err(e) => panic!("check failed: {e}"),
    };
    assert_eq!(ty, builtin::INT);
    // The slot is annotated in place.
    assert_eq!(expr.ty.get(), Some(builtin::INT));
}

#[test]
fn operator_overload_picks_by_argument_type() {
    let mut env = env_with_builtins();
    assert_eq!(check_ok(&mut env, "1 + 2"), builtin::INT);
    assert_eq!(check_ok(&mut env, "1 + 2.0"), builtin::DOUBLE);
}

#[test]
fn if_else_types_to_least_upper_bound() {
    let mut env = env_with_builtins();
    assert_eq!(check_ok(&mut env, "if (2 < 3) 42 else 21"), builtin::INT);
    // No else branch: Void.
    assert_eq!(check_ok(&mut env, "if (2 < 3) 42"), builtin::VOID);
}

#[test]
fn condition_must_be_boolean() {
    let mut env = env_with_builtins();
    assert!(matches!(
        check_err(&mut env, "if (1 + 2) 42 else 21"),
        TypeErrorKind::ConditionNotBoolean { .. }
    ));
    assert!(matches!(
        check_err(&mut env, "while (42) 1"),
        TypeErrorKind::ConditionNotBoolean { .. }
    ));
}

#[test]
fn undefined_identifier() {
    let mut env = env_with_builtins();
    assert_eq!(
        check_err(&mut env, "nope"),
        TypeErrorKind::UndefinedIdentifier {
            name: "nope".to_owned()
        }
    );
}

#[test]
fn let_scopes_and_infers() {
    let mut env = env_with_builtins();
    assert_eq!(check_ok(&mut env, "let n = 0 in n + 1"), builtin::INT);
    // Bindings do not leak out of the let.
    assert!(matches!(
        check_err(&mut env, "let n = 0 in 1 + n + nope"),
        TypeErrorKind::UndefinedIdentifier { .. }
    ));
    assert!(matches!(
        check_err(&mut env, "let n = 0, n = 1 in n"),
        TypeErrorKind::DuplicateBinding { .. }
    ));
}

#[test]
fn assignment_types() {
    let mut env = env_with_builtins();
    assert_eq!(
        check_ok(&mut env, "let n = 0 in { n = 5\n n }"),
        builtin::INT
    );
    assert!(matches!(
        check_err(&mut env, "let n = 0 in n = true"),
        TypeErrorKind::AssignmentTypeMismatch { .. }
    ));
    assert!(matches!(
        check_err(&mut env, "ghost = 1"),
        TypeErrorKind::AssignmentToUndefined { .. }
    ));
}

#[test]
fn while_scenario_checks_to_int() {
    let mut env = env_with_builtins();
    assert_eq!(
        check_ok(&mut env, "let n = 0 in { while(n < 10) { n = n + 1 } n }"),
        builtin::INT
    );
}

fn check_program_src(env: &mut TypeEnvironment, source: &str) -> Result<(), plume_types::TypeError> {
    let mut parser = match Parser::new(source, env.interner.clone()) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    let program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => panic!("parse failed: {e}"),
    };
    checker::check_program(env, &program)
}

#[test]
fn class_with_inferred_and_declared_properties() {
    let mut env = env_with_builtins();
    let source = "class Fraction(n: Int, d: Int) {\n\
                  var num: Int = n\n\
                  var den = d\n\
                  def sum(): Int = num + den\n\
                  }";
    if let Err(e) = check_program_src(&mut env, source) {
        panic!("program failed to check: {e}");
    }

    let fraction = match env.get_class(env.interner.intern("Fraction")) {
        Some(class) => class,
        None => panic!("Fraction not registered"),
    };
    // The undeclared property's type was inferred from its initializer.
    assert_eq!(fraction.properties[1].ty.get(), Some(builtin::INT));
}

#[test]
fn duplicate_constructor_parameter_is_rejected() {
    let mut env = env_with_builtins();
    let err = match check_program_src(&mut env, "class P(a: Int, a: Int) {\n}") {
        Err(e) => e.kind,
        Ok(()) => panic!("duplicate parameter accepted"),
    };
    assert!(matches!(err, TypeErrorKind::DuplicateClassParameter { .. }));
}

#[test]
fn duplicate_signature_is_rejected() {
    let mut env = env_with_builtins();
    let source = "class D {\n\
                  def f(x: Int): Int = x\n\
                  def f(y: Int): Int = y\n\
                  }";
    let err = match check_program_src(&mut env, source) {
        Err(e) => e.kind,
        Ok(()) => panic!("duplicate signature accepted"),
    };
    assert!(matches!(err, TypeErrorKind::DuplicateSignature { .. }));
}

#[test]
fn override_requires_a_superclass_signature() {
    let mut env = env_with_builtins();
    let good = "class Base {\n def area(): Int = 1\n }\n\
                class Sub extends Base {\n override def area(): Int = 2\n }";
    if let Err(e) = check_program_src(&mut env, good) {
        panic!("valid override rejected: {e}");
    }

    let mut env = env_with_builtins();
    let bad = "class Lone {\n override def area(): Int = 2\n }";
    let err = match check_program_src(&mut env, bad) {
        Err(e) => e.kind,
        Ok(()) => panic!("override without target accepted"),
    };
    assert!(matches!(err, TypeErrorKind::NothingToOverride { .. }));
}

#[test]
fn private_functions_require_a_this_receiver() {
    let mut env = env_with_builtins();
    let good = "class A {\n\
                private def secret(): Int = 42\n\
                def open(): Int = this.secret()\n\
                def open2(): Int = secret()\n\
                }";
    if let Err(e) = check_program_src(&mut env, good) {
        panic!("private call through this rejected: {e}");
    }

    let bad = "class B {\n def peek(a: A): Int = a.secret()\n }";
    let err = match check_program_src(&mut env, bad) {
        Err(e) => e.kind,
        Ok(()) => panic!("external private call accepted"),
    };
    assert!(matches!(err, TypeErrorKind::PrivateFunction { .. }));
}

#[test]
fn super_constructor_arguments_are_checked() {
    let mut env = env_with_builtins();
    let source = "class Base(n: Int) {\n}\n\
                  class Bad extends Base(true) {\n}";
    let err = match check_program_src(&mut env, source) {
        Err(e) => e.kind,
        Ok(()) => panic!("non-conforming super argument accepted"),
    };
    assert!(matches!(
        err,
        TypeErrorKind::ConstructorArgumentMismatch { .. }
    ));
}

#[test]
fn constructor_calls_are_checked() {
    let mut env = env_with_builtins();
    if let Err(e) = check_program_src(&mut env, "class P(x: Int) {\n}") {
        panic!("class failed to check: {e}");
    }
    assert_eq!(
        check_ok(&mut env, "new P(3)"),
        env.interner.intern("P")
    );
    assert!(matches!(
        check_err(&mut env, "new P(3, 4)"),
        TypeErrorKind::ConstructorArity { .. }
    ));
    assert!(matches!(
        check_err(&mut env, "new Ghost(1)"),
        TypeErrorKind::UndefinedType { .. }
    ));
}

#[test]
fn ambiguous_calls_are_rejected() {
    let mut env = env_with_builtins();
    let interner = env.interner.clone();
    let pick = interner.intern("pick");

    let mut calc = Class::empty(interner.intern("Calc"), Some(builtin::OBJECT));
    calc.functions = vec![
        stub_function(&interner, "pick", &[builtin::INT, builtin::OBJECT], builtin::INT),
        stub_function(&interner, "pick", &[builtin::OBJECT, builtin::INT], builtin::INT),
    ];
    if let Err(e) = env.add_class(Rc::new(calc), Pos::ORIGIN) {
        panic!("registration failed: {e}");
    }
    env.symbols.add(Symbol::new(
        interner.intern("c"),
        Some(interner.intern("Calc")),
        Pos::ORIGIN,
    ));

    let err = check_err(&mut env, "c.pick(1, 2)");
    let TypeErrorKind::AmbiguousCall { function, .. } = err else {
        panic!("expected ambiguity, got {err:?}");
    };
    assert_eq!(function, interner.resolve(pick).to_string());
}

#[test]
fn cast_checks_the_downcast_direction() {
    let mut env = env_with_builtins();
    let source = "class Base {\n}\nclass Sub extends Base {\n}";
    if let Err(e) = check_program_src(&mut env, source) {
        panic!("program failed to check: {e}");
    }
    env.symbols.add(Symbol::new(
        env.interner.intern("b"),
        Some(env.interner.intern("Base")),
        Pos::ORIGIN,
    ));

    assert_eq!(
        check_ok(&mut env, "b as Sub"),
        env.interner.intern("Sub")
    );
    assert!(matches!(
        check_err(&mut env, "1 as Bool"),
        TypeErrorKind::InvalidCast { .. }
    ));
}
