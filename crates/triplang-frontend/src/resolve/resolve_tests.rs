use triplang_core::{Program, Value};

use super::resolve_program;
use crate::analyze::refs::collect_refs;
use crate::error::{Error, Stage};
use crate::test_utils::{
    body_of, import, module, option_data, poly, poly_rec, program, table, type_def, typed, untyped,
};

fn resolve(p: &Program) -> crate::Result<Program> {
    let t = table(p);
    resolve_program(p, &t)
}

#[test]
fn unresolved_external_term_fails() {
    let p = program(vec![module("main"), poly("main", Value::poly_var("foo"))]);
    let err = resolve(&p).unwrap_err();
    assert_eq!(err.error, Error::UnresolvedTerm { name: "foo".into() });
    assert_eq!(err.stage(), Stage::Resolve);
    assert_eq!(err.unresolved_terms, ["foo"]);
}

#[test]
fn imported_name_is_tolerated_and_left_free() {
    let p = program(vec![
        module("main"),
        import("foo", "Other"),
        poly("main", Value::poly_var("foo")),
    ]);
    let out = resolve(&p).unwrap();
    assert_eq!(*body_of(&out, "main"), Value::poly_var("foo"));
}

#[test]
fn unresolved_external_type_fails() {
    let p = program(vec![
        module("main"),
        poly(
            "main",
            Value::poly_abs("x", Value::ty_var("Ghost"), Value::poly_var("x")),
        ),
    ]);
    let err = resolve(&p).unwrap_err();
    assert_eq!(err.error, Error::UnresolvedType { name: "Ghost".into() });
    assert_eq!(err.unresolved_types, ["Ghost"]);
}

#[test]
fn definitions_inline_across_a_chain() {
    let id = Value::type_abs(
        "X",
        Value::poly_abs("x", Value::ty_var("X"), Value::poly_var("x")),
    );
    let p = program(vec![
        module("main"),
        poly("id", id.clone()),
        poly("alias", Value::poly_var("id")),
        poly("main", Value::poly_var("alias")),
    ]);
    let out = resolve(&p).unwrap();
    // Two chained references need two sweeps; both end at the real body.
    assert_eq!(*body_of(&out, "alias"), id);
    assert_eq!(*body_of(&out, "main"), id);
}

#[test]
fn resolution_is_idempotent() {
    let p = program(vec![
        module("main"),
        poly(
            "id",
            Value::type_abs(
                "X",
                Value::poly_abs("x", Value::ty_var("X"), Value::poly_var("x")),
            ),
        ),
        poly(
            "main",
            Value::app(Value::poly_var("id"), Value::poly_var("id")),
        ),
        type_def("Nat", Value::forall("X", Value::ty_var("X"))),
        typed("f", Value::typed_abs("x", Value::ty_var("Nat"), Value::var("x"))),
    ]);
    let once = resolve(&p).unwrap();
    let twice = {
        let t = table(&p);
        resolve_program(&once, &t).unwrap()
    };
    assert_eq!(once, twice);
}

#[test]
fn recursive_definition_keeps_its_own_name() {
    // A recursive definition referencing itself and a neighbour: only the
    // neighbour inlines.
    let g_body = Value::type_abs(
        "X",
        Value::poly_abs("x", Value::ty_var("X"), Value::poly_var("x")),
    );
    let p = program(vec![
        module("main"),
        poly("g", g_body.clone()),
        poly_rec("f", Value::app(Value::poly_var("f"), Value::poly_var("g"))),
    ]);
    let out = resolve(&p).unwrap();
    assert_eq!(
        *body_of(&out, "f"),
        Value::app(Value::poly_var("f"), g_body)
    );
}

#[test]
fn type_aliases_inline_into_annotations() {
    let p = program(vec![
        module("main"),
        type_def("Id", Value::forall("X", Value::ty_var("X"))),
        type_def("Alias", Value::ty_var("Id")),
        poly(
            "main",
            Value::poly_abs("x", Value::ty_var("Alias"), Value::poly_var("x")),
        ),
    ]);
    let out = resolve(&p).unwrap();
    assert_eq!(
        *body_of(&out, "main"),
        Value::poly_abs(
            "x",
            Value::forall("X", Value::ty_var("X")),
            Value::poly_var("x")
        )
    );
}

#[test]
fn untyped_reference_to_poly_definition_is_erased() {
    let p = program(vec![
        module("main"),
        type_def("Nat", Value::forall("X", Value::ty_var("X"))),
        poly(
            "second",
            Value::poly_abs(
                "a",
                Value::ty_var("Nat"),
                Value::poly_abs("b", Value::ty_var("Nat"), Value::poly_var("b")),
            ),
        ),
        untyped("main", Value::app(Value::var("second"), Value::var("second"))),
    ]);
    let out = resolve(&p).unwrap();
    let nat = Value::forall("X", Value::ty_var("X"));
    let erased = Value::typed_abs(
        "a",
        nat.clone(),
        Value::typed_abs("b", nat, Value::var("b")),
    );
    assert_eq!(*body_of(&out, "main"), Value::app(erased.clone(), erased));
}

#[test]
fn data_type_names_resolve_nominally() {
    let p = program(vec![
        module("main"),
        option_data(),
        poly(
            "main",
            Value::poly_abs(
                "x",
                Value::ty_app(Value::ty_var("Option"), Value::ty_var("Nat")),
                Value::poly_var("x"),
            ),
        ),
        type_def("Nat", Value::forall("X", Value::ty_var("X"))),
    ]);
    let out = resolve(&p).unwrap();
    // Option stays a nominal reference; Nat inlines.
    let Value::PolyAbs { param_ty, .. } = &**body_of(&out, "main") else {
        panic!("expected abstraction");
    };
    assert_eq!(
        **param_ty,
        *Value::ty_app(
            Value::ty_var("Option"),
            Value::forall("X", Value::ty_var("X"))
        )
    );
}

#[test]
fn constructor_references_resolve_nominally() {
    let p = program(vec![
        module("main"),
        option_data(),
        poly(
            "main",
            Value::app(Value::poly_var("Some"), Value::poly_var("42")),
        ),
    ]);
    let out = resolve(&p).unwrap();
    assert_eq!(
        *body_of(&out, "main"),
        Value::app(Value::poly_var("Some"), Value::poly_var("42"))
    );
}

#[test]
fn data_constructor_fields_resolve_against_the_type_table() {
    let p = program(vec![
        module("main"),
        option_data(), // Some's field is the bound parameter T: untouched
        poly("main", Value::poly_var("0")),
    ]);
    let out = resolve(&p).unwrap();
    assert_eq!(out, p);
}

#[test]
fn undeclared_cycle_hits_the_pass_bound() {
    let p = program(vec![
        module("main"),
        poly("a", Value::poly_var("b")),
        poly("b", Value::poly_var("a")),
    ]);
    let err = resolve(&p).unwrap_err();
    assert!(matches!(err.error, Error::FixpointOverflow { .. }));
}

#[test]
fn resolved_bodies_have_no_external_references() {
    let p = program(vec![
        module("main"),
        poly(
            "id",
            Value::type_abs(
                "X",
                Value::poly_abs("x", Value::ty_var("X"), Value::poly_var("x")),
            ),
        ),
        poly("main", Value::poly_var("id")),
    ]);
    let out = resolve(&p).unwrap();
    for def in out.iter() {
        if let Some(term) = def.term() {
            assert!(collect_refs(term).is_empty(), "{} still escapes", def.name());
        }
    }
}
