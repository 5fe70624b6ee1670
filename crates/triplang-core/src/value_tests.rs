use std::rc::Rc;

use crate::value::{Combinator, MatchArm, Value};

#[test]
fn structural_equality_ignores_sharing() {
    let shared = Value::var("x");
    let a = Value::app(shared.clone(), shared.clone());
    let b = Value::app(Value::var("x"), Value::var("x"));
    assert_eq!(a, b);
    assert!(!Rc::ptr_eq(&a, &b));
}

#[test]
fn nat_constant_detection() {
    assert!(Value::poly_var("42").is_nat_constant());
    assert!(Value::var("7").is_nat_constant());
    assert!(!Value::poly_var("x").is_nat_constant());
    assert!(!Value::ty_var("42").is_nat_constant());
}

#[test]
fn display_names_binders() {
    let v = Value::abs("x", Value::var("x"));
    assert_eq!(v.to_string(), "λx. x");

    let v = Value::type_abs("X", Value::poly_var("s"));
    assert_eq!(v.to_string(), "ΛX. s");

    let v = Value::forall("A", Value::ty_var("A"));
    assert_eq!(v.to_string(), "∀A. A");
}

#[test]
fn display_marks_nat_literals() {
    let v = Value::app(Value::poly_var("succ"), Value::poly_var("41"));
    assert_eq!(v.to_string(), "(succ 41n)");
}

#[test]
fn display_renders_match() {
    let v = Value::match_on(
        Value::poly_var("m"),
        Value::ty_var("U"),
        vec![
            MatchArm::new("Some", vec!["v".into()], Value::poly_var("v")),
            MatchArm::new("None", vec![], Value::poly_var("a")),
        ],
    );
    assert_eq!(v.to_string(), "match m [U] { Some v => v | None => a }");
}

#[test]
fn display_renders_ski() {
    let v = Value::app(
        Value::app(Value::terminal(Combinator::S), Value::terminal(Combinator::K)),
        Value::terminal(Combinator::K),
    );
    assert_eq!(v.to_string(), "((S K) K)");
}

#[test]
fn serde_round_trip_preserves_structure() {
    let v = Value::type_app(
        Value::poly_abs("x", Value::ty_var("T"), Value::poly_var("x")),
        Value::ty_var("T"),
    );
    let json = serde_json::to_string(&v).unwrap();
    let back: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(*v, back);
}
