use std::rc::Rc;

use indexmap::IndexMap;

use triplang_core::{Definition, Value, ValueRef};

use super::batch::{replace_term, subst_term_batch, subst_type_batch};

fn poly_def(name: &str, term: ValueRef) -> Definition {
    Definition::Poly {
        name: name.into(),
        term,
        recursive: false,
    }
}

fn typed_def(name: &str, term: ValueRef) -> Definition {
    Definition::Typed {
        name: name.into(),
        term,
    }
}

fn untyped_def(name: &str, term: ValueRef) -> Definition {
    Definition::Untyped {
        name: name.into(),
        term,
    }
}

fn subs(entries: Vec<Definition>) -> IndexMap<String, Definition> {
    entries
        .into_iter()
        .map(|d| (d.name().to_string(), d))
        .collect()
}

#[test]
fn empty_batch_is_identity() {
    let v = Value::abs("x", Value::app(Value::var("x"), Value::var("y")));
    let out = subst_term_batch(&v, &IndexMap::new());
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn no_matching_key_is_identity() {
    let v = Value::abs("x", Value::var("y"));
    let map = subs(vec![untyped_def("z", Value::var("w"))]);
    let out = subst_term_batch(&v, &map);
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn substitutions_are_independent() {
    // a's replacement mentions b, but b is not chased in the same pass.
    let map = subs(vec![
        poly_def("a", Value::poly_var("b")),
        poly_def("b", Value::poly_var("c")),
    ]);
    let out = subst_term_batch(&Value::poly_var("a"), &map);
    assert_eq!(*out, *Value::poly_var("b"));
}

#[test]
fn nat_literal_keys_are_ignored() {
    let v = Value::poly_var("42");
    let map = subs(vec![poly_def("42", Value::poly_var("boom"))]);
    let out = subst_term_batch(&v, &map);
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn replacement_flavor_follows_the_reference() {
    let poly_body = Value::type_abs(
        "X",
        Value::poly_abs("x", Value::ty_var("X"), Value::poly_var("x")),
    );
    let def = poly_def("id", poly_body.clone());

    // System-F reference to a poly definition: body as-is.
    let out = replace_term(&Value::PolyVar { name: "id".into() }, &def).unwrap();
    assert!(Rc::ptr_eq(&out, &poly_body));

    // Untyped-lambda reference to a poly definition: type-erased.
    let out = replace_term(&Value::Var { name: "id".into() }, &def).unwrap();
    assert_eq!(
        out,
        Value::typed_abs("x", Value::ty_var("X"), Value::var("x"))
    );

    // Typed definitions only feed untyped-lambda references.
    let tdef = typed_def("f", Value::typed_abs("x", Value::ty_var("T"), Value::var("x")));
    assert!(replace_term(&Value::Var { name: "f".into() }, &tdef).is_some());
    assert!(replace_term(&Value::PolyVar { name: "f".into() }, &tdef).is_none());

    // Untyped definitions feed any term reference.
    let udef = untyped_def("u", Value::abs("x", Value::var("x")));
    assert!(replace_term(&Value::Var { name: "u".into() }, &udef).is_some());
    assert!(replace_term(&Value::PolyVar { name: "u".into() }, &udef).is_some());
}

#[test]
fn bound_names_do_not_fire() {
    let v = Value::abs("a", Value::var("a"));
    let map = subs(vec![untyped_def("a", Value::var("w"))]);
    let out = subst_term_batch(&v, &map);
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn batch_renames_binders_against_capture() {
    // λb. a  with  a := …b…  must freshen the binder first.
    let v = Value::abs("b", Value::var("a"));
    let map = subs(vec![untyped_def("a", Value::var("b"))]);
    let out = subst_term_batch(&v, &map);
    assert_eq!(out, Value::abs("b_0", Value::var("b")));
}

#[test]
fn binder_without_firing_occurrence_stays_put() {
    // The binder collides with a replacement's free name, but no key
    // occurs below it, so nothing may change.
    let v = Value::abs("b", Value::var("c"));
    let map = subs(vec![untyped_def("a", Value::var("b"))]);
    let out = subst_term_batch(&v, &map);
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn type_batch_replaces_free_type_references() {
    let mut map: IndexMap<String, ValueRef> = IndexMap::new();
    map.insert("A".into(), Value::forall("X", Value::ty_var("X")));

    let v = Value::poly_abs("x", Value::ty_var("A"), Value::poly_var("x"));
    let out = subst_type_batch(&v, &map);
    assert_eq!(
        out,
        Value::poly_abs(
            "x",
            Value::forall("X", Value::ty_var("X")),
            Value::poly_var("x")
        )
    );
}

#[test]
fn type_batch_is_identity_without_occurrences() {
    let mut map: IndexMap<String, ValueRef> = IndexMap::new();
    map.insert("A".into(), Value::ty_var("B"));

    let v = Value::forall("A", Value::ty_var("A"));
    let out = subst_type_batch(&v, &map);
    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn type_batch_avoids_capture() {
    let mut map: IndexMap<String, ValueRef> = IndexMap::new();
    map.insert("A".into(), Value::ty_var("B"));

    let v = Value::forall("B", Value::ty_app(Value::ty_var("A"), Value::ty_var("B")));
    let out = subst_type_batch(&v, &map);
    assert_eq!(
        out,
        Value::forall(
            "B_0",
            Value::ty_app(Value::ty_var("B"), Value::ty_var("B_0"))
        )
    );
}
