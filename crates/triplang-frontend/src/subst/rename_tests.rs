use std::rc::Rc;

use triplang_core::{MatchArm, Value};

use super::rename::{alpha_rename_term, alpha_rename_type};

#[test]
fn renames_free_occurrences() {
    let v = Value::app(Value::var("x"), Value::var("y"));
    let out = alpha_rename_term(&v, "x", "z");
    assert_eq!(out, Value::app(Value::var("z"), Value::var("y")));
}

#[test]
fn renames_binder_and_bound_occurrences() {
    let v = Value::abs("x", Value::app(Value::var("x"), Value::var("y")));
    let out = alpha_rename_term(&v, "x", "z");
    assert_eq!(out, Value::abs("z", Value::app(Value::var("z"), Value::var("y"))));
}

#[test]
fn shadowing_binder_of_new_stops_descent() {
    // The inner binder already uses the target name; renaming below it
    // would merge variables.
    let v = Value::abs("z", Value::var("x"));
    let out = alpha_rename_term(&v, "x", "z");
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn unrelated_binders_descend() {
    let v = Value::abs("a", Value::var("x"));
    let out = alpha_rename_term(&v, "x", "z");
    assert_eq!(out, Value::abs("a", Value::var("z")));
}

#[test]
fn untouched_tree_returns_by_identity() {
    let v = Value::abs("a", Value::var("b"));
    let out = alpha_rename_term(&v, "x", "z");
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn let_binder_follows_the_same_rules() {
    let v = Value::let_in("x", Value::var("x"), Value::var("x"));
    let out = alpha_rename_term(&v, "x", "z");
    // The value position is the enclosing scope; the binder and its body
    // occurrences rename together.
    assert_eq!(out, Value::let_in("z", Value::var("z"), Value::var("z")));
}

#[test]
fn match_arm_params_rename_with_their_body() {
    let v = Value::match_on(
        Value::poly_var("x"),
        Value::ty_var("U"),
        vec![MatchArm::new("Some", vec!["x".into()], Value::poly_var("x"))],
    );
    let out = alpha_rename_term(&v, "x", "y");
    let Value::Match { scrutinee, arms, .. } = &*out else {
        panic!("expected match");
    };
    assert_eq!(**scrutinee, *Value::poly_var("y"));
    assert_eq!(arms[0].params, ["y"]);
    assert_eq!(*arms[0].body, *Value::poly_var("y"));
}

#[test]
fn match_arm_containing_new_is_left_alone() {
    let v = Value::match_on(
        Value::poly_var("m"),
        Value::ty_var("U"),
        vec![MatchArm::new(
            "Pair",
            vec!["x".into(), "y".into()],
            Value::poly_var("x"),
        )],
    );
    let out = alpha_rename_term(&v, "x", "y");
    let Value::Match { arms, .. } = &*out else {
        panic!("expected match");
    };
    assert_eq!(arms[0].params, ["x", "y"]);
    assert_eq!(*arms[0].body, *Value::poly_var("x"));
}

#[test]
fn term_rename_ignores_type_namespace() {
    let v = Value::typed_abs("a", Value::ty_var("x"), Value::var("x"));
    let out = alpha_rename_term(&v, "x", "z");
    assert_eq!(out, Value::typed_abs("a", Value::ty_var("x"), Value::var("z")));
}

#[test]
fn type_rename_covers_binders_and_annotations() {
    let v = Value::forall("A", Value::ty_app(Value::ty_var("A"), Value::ty_var("B")));
    let out = alpha_rename_type(&v, "A", "C");
    assert_eq!(
        out,
        Value::forall("C", Value::ty_app(Value::ty_var("C"), Value::ty_var("B")))
    );

    let v = Value::poly_abs("x", Value::ty_var("A"), Value::poly_var("x"));
    let out = alpha_rename_type(&v, "A", "C");
    assert_eq!(out, Value::poly_abs("x", Value::ty_var("C"), Value::poly_var("x")));
}

#[test]
fn type_rename_respects_shadowing() {
    let v = Value::forall("C", Value::ty_var("A"));
    let out = alpha_rename_type(&v, "A", "C");
    assert!(Rc::ptr_eq(&out, &v));

    let inner = Value::type_abs("A", Value::ty_var("A"));
    let v = Value::ty_app(inner, Value::ty_var("A"));
    let out = alpha_rename_type(&v, "A", "C");
    // The bound occurrence under its own binder renames with it; the free
    // one renames too.
    assert_eq!(
        out,
        Value::ty_app(Value::type_abs("C", Value::ty_var("C")), Value::ty_var("C"))
    );
}
