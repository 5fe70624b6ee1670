//! Hygienic capture-avoiding substitution, term-level and type-level.
//!
//! The two namespaces are substituted independently: `subst_term` replaces
//! free term references and freshens term binders, `subst_type` replaces
//! free type references and freshens the two type binders (`TypeAbs`,
//! `Forall`). Both accept an already-bound set so callers can forbid
//! substitution under outer binders.
//!
//! Freshening avoids the replacement's free names, the caller's bound set,
//! the binder body's own free names, and the substituted name itself; a
//! renamed binder therefore never captures anything that was free before.
//!
//! # Module Organization
//!
//! - `fresh`: deterministic fresh-name policy
//! - `rename`: alpha-renaming primitives
//! - `batch`: non-chaining batch substitution and the cross-calculus
//!   replacement table

mod batch;
mod fresh;
mod rename;

#[cfg(test)]
mod batch_tests;
#[cfg(test)]
mod rename_tests;

pub use batch::{replace_term, subst_term_batch, subst_type_batch};
pub use fresh::fresh;
pub use rename::{alpha_rename_term, alpha_rename_type};

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexSet;

use triplang_core::{MatchArm, Value, ValueRef, is_nat_literal};

use crate::analyze::refs::{free_term_names, free_type_names};

/// Substitute the free term name `name` by `replacement` in `value`.
pub fn subst_term(value: &ValueRef, name: &str, replacement: &ValueRef) -> ValueRef {
    subst_term_bound(value, name, replacement, &HashSet::new())
}

/// Like [`subst_term`], with `bound` naming binders the caller has already
/// entered: occurrences of `name` under them are left alone.
pub fn subst_term_bound(
    value: &ValueRef,
    name: &str,
    replacement: &ValueRef,
    bound: &HashSet<String>,
) -> ValueRef {
    if is_nat_literal(name) {
        // Natural-literal identifiers are atoms, never substituted.
        return value.clone();
    }
    let fv = free_term_names(replacement);
    let mut bound = bound.clone();
    subst_term_at(value, name, replacement, &fv, &mut bound)
}

fn subst_term_at(
    value: &ValueRef,
    name: &str,
    replacement: &ValueRef,
    fv: &IndexSet<String>,
    bound: &mut HashSet<String>,
) -> ValueRef {
    match &**value {
        Value::Var { name: n } | Value::PolyVar { name: n } => {
            if n == name && !bound.contains(n) {
                replacement.clone()
            } else {
                value.clone()
            }
        }
        Value::Terminal { .. } | Value::TyVar { .. } => value.clone(),
        Value::Abs { param, body } => {
            let (param2, body2) = freshen_term_binder(param, body, name, fv, bound);
            let new_body = with_bound(bound, &param2, |b| {
                subst_term_at(&body2, name, replacement, fv, b)
            });
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::abs(param2, new_body)
            }
        }
        Value::TypedAbs {
            param,
            param_ty,
            body,
        } => {
            let ty2 = subst_term_at(param_ty, name, replacement, fv, bound);
            let (param2, body2) = freshen_term_binder(param, body, name, fv, bound);
            let new_body = with_bound(bound, &param2, |b| {
                subst_term_at(&body2, name, replacement, fv, b)
            });
            if param2 == *param && Rc::ptr_eq(&ty2, param_ty) && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::typed_abs(param2, ty2, new_body)
            }
        }
        Value::PolyAbs {
            param,
            param_ty,
            body,
        } => {
            let ty2 = subst_term_at(param_ty, name, replacement, fv, bound);
            let (param2, body2) = freshen_term_binder(param, body, name, fv, bound);
            let new_body = with_bound(bound, &param2, |b| {
                subst_term_at(&body2, name, replacement, fv, b)
            });
            if param2 == *param && Rc::ptr_eq(&ty2, param_ty) && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::poly_abs(param2, ty2, new_body)
            }
        }
        Value::TypeAbs { param, body } => {
            let b = subst_term_at(body, name, replacement, fv, bound);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::type_abs(param.clone(), b)
            }
        }
        Value::Forall { param, body } => {
            let b = subst_term_at(body, name, replacement, fv, bound);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::forall(param.clone(), b)
            }
        }
        Value::TypeApp { term, ty } => {
            let t = subst_term_at(term, name, replacement, fv, bound);
            let ty2 = subst_term_at(ty, name, replacement, fv, bound);
            if Rc::ptr_eq(&t, term) && Rc::ptr_eq(&ty2, ty) {
                value.clone()
            } else {
                Value::type_app(t, ty2)
            }
        }
        Value::App { lhs, rhs } => {
            let l = subst_term_at(lhs, name, replacement, fv, bound);
            let r = subst_term_at(rhs, name, replacement, fv, bound);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::TyApp { func, arg } => {
            let fu = subst_term_at(func, name, replacement, fv, bound);
            let a = subst_term_at(arg, name, replacement, fv, bound);
            if Rc::ptr_eq(&fu, func) && Rc::ptr_eq(&a, arg) {
                value.clone()
            } else {
                Value::ty_app(fu, a)
            }
        }
        Value::Let {
            name: bind,
            value: v,
            body,
        } => {
            let v2 = subst_term_at(v, name, replacement, fv, bound);
            let (bind2, body2) = freshen_term_binder(bind, body, name, fv, bound);
            let new_body = with_bound(bound, &bind2, |b| {
                subst_term_at(&body2, name, replacement, fv, b)
            });
            if bind2 == *bind && Rc::ptr_eq(&v2, v) && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::let_in(bind2, v2, new_body)
            }
        }
        Value::Match {
            scrutinee,
            return_ty,
            arms,
        } => {
            let s = subst_term_at(scrutinee, name, replacement, fv, bound);
            let rt = subst_term_at(return_ty, name, replacement, fv, bound);
            let mut changed = !Rc::ptr_eq(&s, scrutinee) || !Rc::ptr_eq(&rt, return_ty);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let arm2 = subst_term_arm(arm, name, replacement, fv, bound);
                changed = changed || arm2 != *arm;
                new_arms.push(arm2);
            }
            if changed {
                Value::match_on(s, rt, new_arms)
            } else {
                value.clone()
            }
        }
    }
}

/// Capture check for a single-name term binder: if the bound name occurs
/// free in the replacement, rename it apart before descending.
fn freshen_term_binder(
    param: &str,
    body: &ValueRef,
    name: &str,
    fv: &IndexSet<String>,
    bound: &HashSet<String>,
) -> (String, ValueRef) {
    if !fv.contains(param) {
        return (param.to_string(), body.clone());
    }
    let body_fv = free_term_names(body);
    let fresh_name = fresh(param, |c| {
        c == name || fv.contains(c) || bound.contains(c) || body_fv.contains(c)
    });
    let renamed = rename::alpha_rename_term(body, param, &fresh_name);
    (fresh_name, renamed)
}

fn subst_term_arm(
    arm: &MatchArm,
    name: &str,
    replacement: &ValueRef,
    fv: &IndexSet<String>,
    bound: &mut HashSet<String>,
) -> MatchArm {
    let mut params = arm.params.clone();
    let mut body = arm.body.clone();

    // Rename apart any parameter that occurs free in the replacement.
    for i in 0..params.len() {
        if !fv.contains(&params[i]) {
            continue;
        }
        let body_fv = free_term_names(&body);
        let taken: HashSet<&String> = params.iter().collect();
        let old = params[i].clone();
        let fresh_name = fresh(&old, |c| {
            c == name
                || fv.contains(c)
                || bound.contains(c)
                || body_fv.contains(c)
                || taken.contains(&c.to_string())
        });
        body = rename::alpha_rename_term(&body, &old, &fresh_name);
        params[i] = fresh_name;
    }

    let added: Vec<String> = params
        .iter()
        .filter(|p| bound.insert((*p).clone()))
        .cloned()
        .collect();
    let new_body = subst_term_at(&body, name, replacement, fv, bound);
    for p in &added {
        bound.remove(p);
    }

    MatchArm {
        ctor: arm.ctor.clone(),
        params,
        body: new_body,
    }
}

/// Substitute the free type name `name` by `replacement` in `value`.
pub fn subst_type(value: &ValueRef, name: &str, replacement: &ValueRef) -> ValueRef {
    subst_type_bound(value, name, replacement, &HashSet::new())
}

/// Like [`subst_type`], with `bound` naming type binders the caller has
/// already entered.
pub fn subst_type_bound(
    value: &ValueRef,
    name: &str,
    replacement: &ValueRef,
    bound: &HashSet<String>,
) -> ValueRef {
    let fv = free_type_names(replacement);
    let mut bound = bound.clone();
    subst_type_at(value, name, replacement, &fv, &mut bound)
}

fn subst_type_at(
    value: &ValueRef,
    name: &str,
    replacement: &ValueRef,
    fv: &IndexSet<String>,
    bound: &mut HashSet<String>,
) -> ValueRef {
    match &**value {
        Value::TyVar { name: n } => {
            if n == name && !bound.contains(n) {
                replacement.clone()
            } else {
                value.clone()
            }
        }
        Value::Var { .. } | Value::PolyVar { .. } | Value::Terminal { .. } => value.clone(),
        Value::TypeAbs { param, body } => {
            let (param2, body2) = freshen_type_binder(param, body, name, fv, bound);
            let new_body = with_bound(bound, &param2, |b| {
                subst_type_at(&body2, name, replacement, fv, b)
            });
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::type_abs(param2, new_body)
            }
        }
        Value::Forall { param, body } => {
            let (param2, body2) = freshen_type_binder(param, body, name, fv, bound);
            let new_body = with_bound(bound, &param2, |b| {
                subst_type_at(&body2, name, replacement, fv, b)
            });
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::forall(param2, new_body)
            }
        }
        Value::Abs { param, body } => {
            let b = subst_type_at(body, name, replacement, fv, bound);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::abs(param.clone(), b)
            }
        }
        Value::TypedAbs {
            param,
            param_ty,
            body,
        } => {
            let t = subst_type_at(param_ty, name, replacement, fv, bound);
            let b = subst_type_at(body, name, replacement, fv, bound);
            if Rc::ptr_eq(&t, param_ty) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::typed_abs(param.clone(), t, b)
            }
        }
        Value::PolyAbs {
            param,
            param_ty,
            body,
        } => {
            let t = subst_type_at(param_ty, name, replacement, fv, bound);
            let b = subst_type_at(body, name, replacement, fv, bound);
            if Rc::ptr_eq(&t, param_ty) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::poly_abs(param.clone(), t, b)
            }
        }
        Value::TypeApp { term, ty } => {
            let t = subst_type_at(term, name, replacement, fv, bound);
            let ty2 = subst_type_at(ty, name, replacement, fv, bound);
            if Rc::ptr_eq(&t, term) && Rc::ptr_eq(&ty2, ty) {
                value.clone()
            } else {
                Value::type_app(t, ty2)
            }
        }
        Value::App { lhs, rhs } => {
            let l = subst_type_at(lhs, name, replacement, fv, bound);
            let r = subst_type_at(rhs, name, replacement, fv, bound);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::TyApp { func, arg } => {
            let fu = subst_type_at(func, name, replacement, fv, bound);
            let a = subst_type_at(arg, name, replacement, fv, bound);
            if Rc::ptr_eq(&fu, func) && Rc::ptr_eq(&a, arg) {
                value.clone()
            } else {
                Value::ty_app(fu, a)
            }
        }
        Value::Let {
            name: bind,
            value: v,
            body,
        } => {
            let v2 = subst_type_at(v, name, replacement, fv, bound);
            let b = subst_type_at(body, name, replacement, fv, bound);
            if Rc::ptr_eq(&v2, v) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::let_in(bind.clone(), v2, b)
            }
        }
        Value::Match {
            scrutinee,
            return_ty,
            arms,
        } => {
            let s = subst_type_at(scrutinee, name, replacement, fv, bound);
            let rt = subst_type_at(return_ty, name, replacement, fv, bound);
            let mut changed = !Rc::ptr_eq(&s, scrutinee) || !Rc::ptr_eq(&rt, return_ty);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let b = subst_type_at(&arm.body, name, replacement, fv, bound);
                changed = changed || !Rc::ptr_eq(&b, &arm.body);
                new_arms.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: b,
                });
            }
            if changed {
                Value::match_on(s, rt, new_arms)
            } else {
                value.clone()
            }
        }
    }
}

fn freshen_type_binder(
    param: &str,
    body: &ValueRef,
    name: &str,
    fv: &IndexSet<String>,
    bound: &HashSet<String>,
) -> (String, ValueRef) {
    if !fv.contains(param) {
        return (param.to_string(), body.clone());
    }
    let body_fv = free_type_names(body);
    let fresh_name = fresh(param, |c| {
        c == name || fv.contains(c) || bound.contains(c) || body_fv.contains(c)
    });
    let renamed = rename::alpha_rename_type(body, param, &fresh_name);
    (fresh_name, renamed)
}

/// Run `f` with `name` added to the bound set, restoring it afterwards.
fn with_bound<T>(
    bound: &mut HashSet<String>,
    name: &str,
    f: impl FnOnce(&mut HashSet<String>) -> T,
) -> T {
    let added = bound.insert(name.to_string());
    let out = f(bound);
    if added {
        bound.remove(name);
    }
    out
}
