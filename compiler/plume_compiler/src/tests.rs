use std::cell::RefCell;
use std::rc::Rc;

use plume_parse::Parser;
use pretty_assertions::assert_eq;

use crate::{ParseOutcome, Session, SessionError};

fn session() -> Session {
    match Session::new() {
        Ok(session) => session,
        Err(e) => panic!("session construction failed: {e}"),
    }
}

fn run(session: &mut Session, source: &str) -> String {
    match session.execute(source) {
        Ok(echo) => echo,
        Err(e) => panic!("{source:?} failed: {e}"),
    }
}

#[test]
fn expressions_bind_res_results() {
    let mut s = session();
    assert_eq!(run(&mut s, "1 + 1"), "res0: Int = 2");
    assert_eq!(run(&mut s, "2 * 3"), "res1: Int = 6");
    // Earlier results stay referencable.
    assert_eq!(run(&mut s, "res0 + res1"), "res2: Int = 8");
}

#[test]
fn string_results_are_quoted() {
    let mut s = session();
    assert_eq!(run(&mut s, "\"ab\" + \"cd\""), "res0: String = \"abcd\"");
}

#[test]
fn class_definition_and_construction() {
    let mut s = session();
    assert_eq!(
        run(
            &mut s,
            "class Fraction(n: Int, d: Int) {\n\
             var num: Int = n\n\
             var den: Int = d\n\
             override def toString(): String = num + \"/\" + den\n\
             }"
        ),
        "defined class Fraction"
    );
    assert_eq!(run(&mut s, "new Fraction(3, 4)"), "res0: Fraction = 3/4");
}

#[test]
fn failed_class_check_rolls_back_the_registration() {
    let mut s = session();
    let err = match s.execute("class Broken {\n def f(): Int = missing\n }") {
        Err(err) => err,
        Ok(echo) => panic!("broken class accepted: {echo}"),
    };
    assert!(matches!(err, SessionError::Semantic(_)));

    // The tentative registration is gone: the name is free again.
    let broken = s.interner().intern("Broken");
    assert!(!s.registry().has(broken));
    assert_eq!(
        run(&mut s, "class Broken {\n def f(): Int = 1\n }"),
        "defined class Broken"
    );
}

#[test]
fn property_injection_binds_on_the_session_receiver() {
    let mut s = session();
    assert_eq!(run(&mut s, "var greeting = \"hi\""), "greeting: String = hi");
    assert_eq!(run(&mut s, "greeting"), "greeting: String = \"hi\"");
}

#[test]
fn function_injection_and_redefinition() {
    let mut s = session();
    assert_eq!(run(&mut s, "def inc(x: Int): Int = x + 1"), "inc(x: Int): Int");
    assert_eq!(run(&mut s, "inc(41)"), "res0: Int = 42");

    // Same signature replaces the old definition.
    assert_eq!(run(&mut s, "def inc(x: Int): Int = x + 2"), "inc(x: Int): Int");
    assert_eq!(run(&mut s, "inc(40)"), "res1: Int = 42");
}

#[test]
fn failed_function_check_rolls_back() {
    let mut s = session();
    let err = match s.execute("def broken(): Int = nothing") {
        Err(err) => err,
        Ok(echo) => panic!("broken function accepted: {echo}"),
    };
    assert!(matches!(err, SessionError::Semantic(_)));

    // The session still works and the name is not callable.
    let err = match s.execute("broken()") {
        Err(err) => err,
        Ok(echo) => panic!("ghost function callable: {echo}"),
    };
    assert!(matches!(err, SessionError::Semantic(_)));
}

#[test]
fn assignment_echoes_the_stored_value() {
    let mut s = session();
    run(&mut s, "var n = 1");
    assert_eq!(run(&mut s, "n = 5"), "n: Int = 5");
    assert_eq!(run(&mut s, "n += 2"), "n: Int = 7");
}

#[test]
fn void_results_echo_nothing() {
    let mut s = session();
    let sink: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    s.set_output(sink.clone());

    assert_eq!(run(&mut s, "IO.println(42)"), "");
    assert_eq!(String::from_utf8_lossy(&sink.borrow()), "42\n");
}

#[test]
fn math_singleton_is_bound() {
    let mut s = session();
    assert_eq!(run(&mut s, "Math.max(2, 3)"), "res0: Int = 3");
}

#[test]
fn try_parse_distinguishes_incomplete_input() {
    let s = session();
    assert!(matches!(s.try_parse("1 + 2"), ParseOutcome::Complete));
    assert!(matches!(
        s.try_parse("class Fraction(n: Int) {"),
        ParseOutcome::Incomplete
    ));
    assert!(matches!(s.try_parse("if (x"), ParseOutcome::Incomplete));
    assert!(matches!(s.try_parse("class 42 {}"), ParseOutcome::Invalid(_)));
}

#[test]
fn load_classes_is_atomic() {
    let mut s = session();
    let source = "export class Good {\n def ok(): Int = 1\n }\n\
                  class Bad {\n def no(): Int = missing\n }";
    let mut parser = match Parser::new(source, s.interner().clone()) {
        Ok(parser) => parser,
        Err(e) => panic!("parser construction failed: {e}"),
    };
    let program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => panic!("parse failed: {e}"),
    };

    let err = match s.load_classes(&program.classes) {
        Err(err) => err,
        Ok(names) => panic!("bad batch accepted: {names:?}"),
    };
    assert!(matches!(err, SessionError::Semantic(_)));

    // Neither class survived the failed batch.
    assert!(!s.registry().has(s.interner().intern("Good")));
    assert!(!s.registry().has(s.interner().intern("Bad")));

    // The exported-classes filter is what a module loader consumes.
    assert_eq!(program.exported_classes().len(), 1);
}

#[test]
fn lazy_boolean_scenario_end_to_end() {
    let mut s = session();
    run(&mut s, "var hits = 0");
    run(&mut s, "false && { hits = hits + 1\n true }");
    assert_eq!(run(&mut s, "hits"), "hits: Int = 0");
}
