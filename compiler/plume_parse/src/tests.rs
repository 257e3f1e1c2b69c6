use std::rc::Rc;

use plume_ir::{Expr, ExprKind, SharedInterner};
use pretty_assertions::assert_eq;

use crate::Parser;

fn parse_expr(source: &str) -> (Rc<Expr>, SharedInterner) {
    let interner = SharedInterner::default();
    let mut parser = match Parser::new(source, interner.clone()) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    match parser.parse_expression() {
        Ok(expr) => (expr, interner),
        Err(e) => panic!("parse failed: {e}"),
    }
}

fn resolve(interner: &SharedInterner, name: plume_ir::Name) -> String {
    interner.resolve(name).to_string()
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let (expr, interner) = parse_expr("1 + 2 * 3");
    let ExprKind::Binary {
        operator,
        ref right,
        ..
    } = expr.kind
    else {
        panic!("expected binary, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, operator), "+");
    let ExprKind::Binary { operator, .. } = right.kind else {
        panic!("expected nested binary, got {:?}", right.kind);
    };
    assert_eq!(resolve(&interner, operator), "*");
}

#[test]
fn addition_left_associates() {
    let (expr, interner) = parse_expr("1 - 2 - 3");
    let ExprKind::Binary { operator, ref left, .. } = expr.kind else {
        panic!("expected binary, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, operator), "-");
    assert!(matches!(left.kind, ExprKind::Binary { .. }));
}

#[test]
fn cast_is_the_loosest_level() {
    let (expr, interner) = parse_expr("1 + 2 as Object");
    let ExprKind::Cast { ref object, class } = expr.kind else {
        panic!("expected cast, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, class), "Object");
    assert!(matches!(object.kind, ExprKind::Binary { .. }));
}

#[test]
fn dispatch_chain_wraps_receivers() {
    let (expr, interner) = parse_expr("a.b(1).c(2)");
    let ExprKind::Call {
        receiver: Some(ref inner),
        function,
        ref args,
    } = expr.kind
    else {
        panic!("expected call, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, function), "c");
    assert_eq!(args.len(), 1);

    let ExprKind::Call {
        receiver: Some(ref root),
        function,
        ..
    } = inner.kind
    else {
        panic!("expected inner call, got {:?}", inner.kind);
    };
    assert_eq!(resolve(&interner, function), "b");
    assert!(matches!(root.kind, ExprKind::Reference(_)));
}

#[test]
fn identifier_lookahead_disambiguates() {
    let (expr, _) = parse_expr("x");
    assert!(matches!(expr.kind, ExprKind::Reference(_)));

    let (expr, _) = parse_expr("x()");
    assert!(matches!(expr.kind, ExprKind::Call { receiver: None, .. }));

    let (expr, interner) = parse_expr("x += 1");
    let ExprKind::Assignment { operator, .. } = expr.kind else {
        panic!("expected assignment, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, operator), "+=");
}

#[test]
fn unary_forms() {
    let (expr, interner) = parse_expr("-x");
    let ExprKind::Unary { operator, .. } = expr.kind else {
        panic!("expected unary, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, operator), "-");

    let (expr, interner) = parse_expr("!flag");
    let ExprKind::Unary { operator, .. } = expr.kind else {
        panic!("expected unary, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, operator), "!");
}

#[test]
fn if_else_and_while_and_let() {
    let (expr, _) = parse_expr("if (2 < 3) 42 else 21");
    let ExprKind::If { else_branch: Some(_), .. } = expr.kind else {
        panic!("expected if/else, got {:?}", expr.kind);
    };

    let (expr, _) = parse_expr("while (x < 10) x = x + 1");
    assert!(matches!(expr.kind, ExprKind::While { .. }));

    let (expr, _) = parse_expr("let n = 0, m: Int = 1 in { n }");
    let ExprKind::Let { ref bindings, .. } = expr.kind else {
        panic!("expected let, got {:?}", expr.kind);
    };
    assert_eq!(bindings.len(), 2);
    assert!(bindings[0].declared.is_none());
    assert!(bindings[1].declared.is_some());
}

#[test]
fn blocks_separate_expressions_by_newline() {
    let (expr, _) = parse_expr("{\n 1\n 2\n 3\n}");
    let ExprKind::Block(ref expressions) = expr.kind else {
        panic!("expected block, got {:?}", expr.kind);
    };
    assert_eq!(expressions.len(), 3);
}

#[test]
fn constructor_and_super_calls() {
    let (expr, interner) = parse_expr("new Fraction(3, 4)");
    let ExprKind::ConstructorCall { class, ref args } = expr.kind else {
        panic!("expected constructor call, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, class), "Fraction");
    assert_eq!(args.len(), 2);

    let (expr, interner) = parse_expr("super.toString()");
    let ExprKind::SuperCall { function, .. } = expr.kind else {
        panic!("expected super call, got {:?}", expr.kind);
    };
    assert_eq!(resolve(&interner, function), "toString");
}

fn parse_class_src(source: &str) -> (Rc<plume_ir::Class>, SharedInterner) {
    let interner = SharedInterner::default();
    let mut parser = match Parser::new(source, interner.clone()) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    match parser.parse_class() {
        Ok(class) => (class, interner),
        Err(e) => panic!("parse failed: {e}"),
    }
}

#[test]
fn class_members_and_default_superclass() {
    let source = "class Fraction(n: Int, d: Int) {\n\
                  var num: Int = n\n\
                  var den: Int = d\n\
                  def num(): Int = num\n\
                  override def toString(): String = num + \"/\" + den\n\
                  }";
    let (class, interner) = parse_class_src(source);
    assert_eq!(resolve(&interner, class.name), "Fraction");
    assert_eq!(class.params.len(), 2);
    assert_eq!(class.superclass, Some(plume_ir::builtin::OBJECT));
    assert_eq!(class.properties.len(), 2);
    assert_eq!(class.functions.len(), 2);
    assert!(class.functions[1].is_override);
    assert!(!class.exported);
}

#[test]
fn extends_clause_with_arguments() {
    let (class, interner) =
        parse_class_src("class Square(s: Int) extends Rectangle(s, s) {\n}");
    assert_eq!(
        class.superclass.map(|s| resolve(&interner, s)),
        Some("Rectangle".to_owned())
    );
    assert_eq!(class.super_args.len(), 2);
}

#[test]
fn export_flag() {
    let (class, _) = parse_class_src("export class Point(x: Int, y: Int) {\n}");
    assert!(class.exported);
}

#[test]
fn operator_named_function_definition() {
    let interner = SharedInterner::default();
    let mut parser = match Parser::new("def +(that: Fraction): Fraction = this", interner.clone())
    {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    let function = match parser.parse_function() {
        Ok(function) => function,
        Err(e) => panic!("parse failed: {e}"),
    };
    assert_eq!(resolve(&interner, function.name), "+");
    assert_eq!(function.params.len(), 1);
}

#[test]
fn lazy_formal_flag() {
    let interner = SharedInterner::default();
    let mut parser = match Parser::new("def &&(lazy rhs: Bool): Bool = rhs", interner) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    let function = match parser.parse_function() {
        Ok(function) => function,
        Err(e) => panic!("parse failed: {e}"),
    };
    assert!(function.params[0].lazy);
}

#[test]
fn incomplete_input_is_distinguished() {
    for source in ["class Foo {", "if (x", "let n = ", "{ 1 + "] {
        let interner = SharedInterner::default();
        let mut parser = match Parser::new(source, interner) {
            Ok(parser) => parser,
            Err(e) => panic!("parser construction failed: {e}"),
        };
        let result = if source.starts_with("class") {
            parser.parse_class().map(|_| ())
        } else {
            parser.parse_expression().map(|_| ())
        };
        let Err(err) = result else {
            panic!("{source:?} parsed successfully");
        };
        assert!(err.is_incomplete(), "{source:?}: {err}");
    }
}

#[test]
fn hard_errors_are_not_incomplete() {
    let interner = SharedInterner::default();
    let mut parser = match Parser::new("class 42 {}", interner) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    let Err(err) = parser.parse_class() else {
        panic!("parsed class named 42");
    };
    assert!(!err.is_incomplete());
}
