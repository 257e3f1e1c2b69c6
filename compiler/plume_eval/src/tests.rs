//! End-to-end evaluation tests: lex, parse, check, then evaluate against a
//! context with the builtin runtime installed.

use std::rc::Rc;

use plume_ir::{builtin, Expr, Pos, SharedInterner};
use plume_parse::Parser;
use plume_typeck::{checker, TypeEnvironment};
use plume_types::SharedRegistry;
use pretty_assertions::assert_eq;

use crate::{
    call_function, evaluate, runtime, Cell, Context, EvalErrorKind, Obj, Value,
};

struct Fixture {
    ctx: Context,
    env: TypeEnvironment,
}

fn fixture() -> Fixture {
    let interner = SharedInterner::default();
    let registry = SharedRegistry::new();
    let mut ctx = Context::new(registry.clone(), interner.clone());
    if let Err(e) = runtime::install(&ctx) {
        panic!("runtime installation failed: {e}");
    }

    let mut env = TypeEnvironment::new(registry.clone(), interner);
    env.current_class = env.get_class(builtin::PREDEF);
    env.symbols.enter_scope();

    ctx.environment.borrow_mut().enter_scope();
    let predef = match Obj::create(&registry, builtin::PREDEF) {
        Ok(predef) => predef,
        Err(e) => panic!("predef construction failed: {e}"),
    };
    ctx.self_obj = Some(predef);

    Fixture { ctx, env }
}

impl Fixture {
    /// Type-check and register a program of class definitions.
    fn load(&mut self, source: &str) {
        let mut parser = match Parser::new(source, self.env.interner.clone()) {
            Ok(parser) => parser,
            Err(e) => panic!("parser construction failed: {e}"),
        };
        let program = match parser.parse_program() {
            Ok(program) => program,
            Err(e) => panic!("parse failed: {e}"),
        };
        if let Err(e) = checker::check_program(&mut self.env, &program) {
            panic!("program failed to check: {e}");
        }
    }

    fn parse_and_check(&mut self, source: &str) -> Rc<Expr> {
        let mut parser = match Parser::new(source, self.env.interner.clone()) {
            Ok(parser) => parser,
            Err(e) => panic!("parser construction failed: {e}"),
        };
        let expr = match parser.parse_expression() {
            Ok(expr) => expr,
            Err(e) => panic!("parse failed: {e}"),
        };
        if let Err(e) = checker::check_expr(&mut self.env, &expr) {
            panic!("{source:?} failed to check: {e}");
        }
        expr
    }

    fn eval(&mut self, source: &str) -> Value {
        let expr = self.parse_and_check(source);
        match evaluate(&mut self.ctx, &expr) {
            Ok(value) => value,
            Err(e) => panic!("{source:?} failed to evaluate: {e}"),
        }
    }

    fn eval_int(&mut self, source: &str) -> i64 {
        let value = self.eval(source);
        let int = value.borrow().as_int();
        match int {
            Some(int) => int,
            None => panic!("{source:?} did not produce an Int"),
        }
    }

    fn eval_bool(&mut self, source: &str) -> bool {
        let value = self.eval(source);
        let b = value.borrow().as_bool();
        match b {
            Some(b) => b,
            None => panic!("{source:?} did not produce a Bool"),
        }
    }

    fn eval_str(&mut self, source: &str) -> String {
        let value = self.eval(source);
        let s = value.borrow().as_str().map(ToOwned::to_owned);
        match s {
            Some(s) => s,
            None => panic!("{source:?} did not produce a String"),
        }
    }
}

#[test]
fn chained_addition() {
    let mut f = fixture();
    let expr = f.parse_and_check("1 + 2 + 3 + 4 + 5");
    assert_eq!(expr.ty.get(), Some(builtin::INT));
    let value = match evaluate(&mut f.ctx, &expr) {
        Ok(value) => value,
        Err(e) => panic!("evaluation failed: {e}"),
    };
    assert_eq!(value.borrow().as_int(), Some(15));
}

#[test]
fn mixed_arithmetic_widens() {
    let mut f = fixture();
    let value = f.eval("1 + 2.5");
    assert_eq!(value.borrow().class, builtin::DOUBLE);
    assert_eq!(value.borrow().as_double(), Some(3.5));
}

#[test]
fn if_else_picks_the_then_branch() {
    let mut f = fixture();
    assert_eq!(f.eval_int("if (2 < 3) 42 else 21"), 42);
    assert_eq!(f.eval_int("if (3 < 2) 42 else 21"), 21);
}

#[test]
fn while_loop_counts_to_ten() {
    let mut f = fixture();
    assert_eq!(
        f.eval_int("let n = 0 in { while(n < 10) { n = n + 1 } n }"),
        10
    );
}

#[test]
fn unary_and_compound_assignment() {
    let mut f = fixture();
    assert_eq!(f.eval_int("-5 + 2"), -3);
    assert_eq!(f.eval_int("let n = 10 in { n += 5\n n -= 3\n n *= 2\n n }"), 24);
    assert!(f.eval_bool("!false"));
}

#[test]
fn constructor_populates_fields() {
    let mut f = fixture();
    f.load(
        "class Fraction(n: Int, d: Int) {\n\
         var num: Int = n\n\
         var den: Int = d\n\
         }",
    );

    let value = f.eval("new Fraction(3, 4)");
    let obj = value.borrow();
    let num = f.env.interner.intern("num");
    let den = f.env.interner.intern("den");

    let Some(Cell::Value(num)) = obj.get(num) else {
        panic!("num not populated");
    };
    let Some(Cell::Value(den)) = obj.get(den) else {
        panic!("den not populated");
    };
    assert_eq!(num.borrow().as_int(), Some(3));
    assert_eq!(den.borrow().as_int(), Some(4));
}

#[test]
fn properties_are_ordered_inherited_then_own() {
    let mut f = fixture();
    f.load(
        "class A(x: Int) {\n var p: Int = 1\n }\n\
         class B(y: Int) extends A(y) {\n var q: Int = 2\n }",
    );

    let value = f.eval("new B(5)");
    let obj = value.borrow();
    let order: Vec<String> = obj
        .properties()
        .iter()
        .map(|(name, _)| f.env.interner.resolve(*name).to_string())
        .collect();
    assert_eq!(order, vec!["x", "p", "y", "q"]);

    let Some(Cell::Value(x)) = obj.get(f.env.interner.intern("x")) else {
        panic!("x not populated");
    };
    assert_eq!(x.borrow().as_int(), Some(5));
}

#[test]
fn overload_resolution_picks_the_int_pair() {
    let mut f = fixture();
    f.load(
        "class Pick {\n\
         def which(a: Int, b: Int): String = \"ints\"\n\
         def which(a: Double, b: Double): String = \"doubles\"\n\
         }",
    );
    assert_eq!(f.eval_str("new Pick().which(1, 2)"), "ints");
    assert_eq!(f.eval_str("new Pick().which(1.0, 2.0)"), "doubles");
}

#[test]
fn virtual_dispatch_through_the_flattened_table() {
    let mut f = fixture();
    f.load(
        "class Shape {\n\
         def area(): Int = 0\n\
         def describe(): String = \"area=\" + this.area()\n\
         }\n\
         class Square(s: Int) extends Shape {\n\
         var side: Int = s\n\
         override def area(): Int = side * side\n\
         }",
    );

    assert_eq!(f.eval_int("new Square(3).area()"), 9);
    // describe() is declared on Shape but must hit Square's area.
    assert_eq!(f.eval_str("new Square(3).describe()"), "area=9");
}

#[test]
fn super_calls_reach_the_overridden_function() {
    let mut f = fixture();
    f.load(
        "class Shape {\n def area(): Int = 7\n }\n\
         class Louder extends Shape {\n\
         override def area(): Int = super.area() + 1\n\
         }",
    );
    assert_eq!(f.eval_int("new Louder().area()"), 8);
}

#[test]
fn cast_rebuilds_with_the_target_class_and_table() {
    // Casts go downward: the static type must be an ancestor of the target.
    let mut f = fixture();
    f.load(
        "class Shape {\n def area(): Int = 0\n }\n\
         class Square(s: Int) extends Shape {\n\
         var side: Int = s\n\
         override def area(): Int = side * side\n\
         }\n\
         class Caster {\n\
         def shrink(s: Shape): Square = s as Square\n\
         }",
    );
    let value = f.eval("new Caster().shrink(new Square(3))");
    assert_eq!(value.borrow().class, f.env.interner.intern("Square"));
    // The cast copied the properties, so the target table computes on them.
    assert_eq!(f.eval_int("new Caster().shrink(new Square(3)).area()"), 9);
}

#[test]
fn short_circuit_and_never_runs_the_right_operand() {
    let mut f = fixture();
    assert_eq!(
        f.eval_int("let hits = 0 in { false && { hits = hits + 1\n true }\n hits }"),
        0
    );
    assert_eq!(
        f.eval_int("let hits = 0 in { true && { hits = hits + 1\n true }\n hits }"),
        1
    );
    assert_eq!(
        f.eval_int("let hits = 0 in { true || { hits = hits + 1\n true }\n hits }"),
        0
    );
}

#[test]
fn lazy_parameters_are_memoized() {
    let mut f = fixture();
    f.load("class Memo {\n def twice(lazy v: Int): Int = v + v\n }");
    // Forcing happens once: v + v reads 1 + 1 and n ends at 1, so the
    // composite result is 21, not 32.
    assert_eq!(
        f.eval_int(
            "let n = 0 in { let r = new Memo().twice({ n = n + 1\n n }) in r * 10 + n }"
        ),
        21
    );
}

#[test]
fn lazy_parameter_observes_post_capture_mutation() {
    // The pinned shared-state decision: a thunk captures a shallow context
    // snapshot sharing the caller's store, so a mutation that lands between
    // capture and force is visible when the thunk finally runs.
    let mut f = fixture();
    f.load("class Obs {\n def two(lazy a: Int, b: Int): Int = a\n }");
    assert_eq!(
        f.eval_int("let x = 1 in new Obs().two(x, { x = 5\n 0 })"),
        5
    );
}

#[test]
fn let_frees_its_addresses_for_reuse() {
    let mut f = fixture();
    let base = f.ctx.store.borrow().len();
    assert_eq!(f.eval_int("let a = 1, b = 2 in a + b"), 3);

    // The let's two slots are free again...
    assert!(!f.ctx.store.borrow().is_allocated(base));
    assert!(!f.ctx.store.borrow().is_allocated(base + 1));

    // ...and the lowest one is reused first by the next allocation.
    assert_eq!(f.eval_int("let c = 9 in c"), 9);
    let cell = f.ctx.store.borrow().get(base);
    let Some(Cell::Value(reused)) = cell else {
        panic!("slot was not reused");
    };
    assert_eq!(reused.borrow().as_int(), Some(9));
}

#[test]
fn else_less_if_in_a_loop_restamps_freely() {
    // An else-less if is statically Void but yields its branch value when
    // taken; later iterations may yield Void again. Neither direction is an
    // internal inconsistency.
    let mut f = fixture();
    assert_eq!(
        f.eval_int("let n = 0 in { while (n < 3) { if (n < 1) 42\n n = n + 1 } n }"),
        3
    );
}

#[test]
fn integer_division_by_zero_raises() {
    let mut f = fixture();
    let expr = f.parse_and_check("1 / 0");
    let err = match evaluate(&mut f.ctx, &expr) {
        Err(err) => err,
        Ok(value) => panic!("1 / 0 evaluated to {value:?}"),
    };
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);

    let expr = f.parse_and_check("1 % 0");
    let err = match evaluate(&mut f.ctx, &expr) {
        Err(err) => err,
        Ok(value) => panic!("1 % 0 evaluated to {value:?}"),
    };
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn string_behaviour() {
    let mut f = fixture();
    assert_eq!(f.eval_str("\"a\" + 1"), "a1");
    assert_eq!(f.eval_int("\"Hello\".length()"), 5);
    assert_eq!(f.eval_str("\"Hello\".toUpper()"), "HELLO");
    assert!(f.eval_bool("\"Hello\".startsWith(\"He\")"));
    assert_eq!(f.eval_str("\"Hello\".substring(1, 3)"), "el");
    // Escapes decode at evaluation: the lexeme "a\nb" is three characters.
    assert_eq!(f.eval_int("\"a\\nb\".length()"), 3);
}

#[test]
fn equality_and_instance_of() {
    let mut f = fixture();
    assert!(f.eval_bool("1 == 1"));
    assert!(f.eval_bool("1 != 2"));
    assert!(f.eval_bool("1 == 1.0"));
    assert!(f.eval_bool("\"a\" == \"a\""));
    assert!(f.eval_bool("null == null"));

    f.load("class Token {\n}");
    assert!(f.eval_bool("new Token().instanceOf(\"Token\")"));
    assert!(!f.eval_bool("new Token().instanceOf(\"Object\")"));
}

#[test]
fn unresolved_overload_is_a_runtime_fault() {
    let mut f = fixture();
    let one = f.parse_and_check("1");
    let receiver = match evaluate(&mut f.ctx, &one) {
        Ok(value) => value,
        Err(e) => panic!("evaluation failed: {e}"),
    };

    let ghost = f.env.interner.intern("ghost");
    let err = match call_function(&mut f.ctx, receiver, ghost, &[], Pos::new(4, 2)) {
        Err(err) => err,
        Ok(value) => panic!("ghost call produced {value:?}"),
    };
    assert_eq!(
        err.kind,
        EvalErrorKind::UnresolvedOverload {
            function: "ghost".to_owned(),
            class: "Int".to_owned(),
        }
    );
    assert_eq!(err.to_string(), "5:3: No function 'ghost' defined in class 'Int'.");
}

#[test]
fn null_literal_and_defaults() {
    let mut f = fixture();
    f.load("class Node(v: Int) {\n var next: Node\n var v2: Int\n }");
    let value = f.eval("new Node(1)");
    let obj = value.borrow();

    let Some(Cell::Value(next)) = obj.get(f.env.interner.intern("next")) else {
        panic!("next not populated");
    };
    assert_eq!(next.borrow().class, builtin::NULL);

    let Some(Cell::Value(v2)) = obj.get(f.env.interner.intern("v2")) else {
        panic!("v2 not populated");
    };
    assert_eq!(v2.borrow().as_int(), Some(0));
}
