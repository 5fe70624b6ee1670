//! Batch substitution: one pass, many names, no chaining.
//!
//! Replacements are independent: a substituted body is never itself
//! searched for further keys during the same pass. The resolver's outer
//! loop reaches the fixed point by repeating passes.
//!
//! When no key fires anywhere in the input, the input is returned by
//! identity (`Rc`-pointer-equal). Natural-literal identifiers never
//! substitute, even when present as keys.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use triplang_core::{Definition, MatchArm, Value, ValueRef, is_nat_literal};

use crate::analyze::refs::{free_term_names, free_type_names};
use crate::lower::erase_to_typed;

use super::fresh::fresh;
use super::rename;

/// Choose the replacement for a term reference resolved to `def`,
/// mediating between the reference's calculus and the definition's.
/// Combinations outside the table replace nothing.
pub fn replace_term(reference: &Value, def: &Definition) -> Option<ValueRef> {
    match (reference, def) {
        (Value::PolyVar { .. }, Definition::Poly { term, .. }) => Some(term.clone()),
        (Value::Var { .. }, Definition::Typed { term, .. }) => Some(term.clone()),
        (Value::Var { .. }, Definition::Poly { term, .. }) => Some(erase_to_typed(term)),
        (Value::Var { .. } | Value::PolyVar { .. }, Definition::Untyped { term, .. }) => {
            Some(term.clone())
        }
        _ => None,
    }
}

/// Substitute every free term reference named in `subs` by its
/// definition's body, flavor-mediated through [`replace_term`].
pub fn subst_term_batch(value: &ValueRef, subs: &IndexMap<String, Definition>) -> ValueRef {
    let keys: IndexSet<String> = subs
        .iter()
        .filter(|(k, def)| !is_nat_literal(k.as_str()) && def.term().is_some())
        .map(|(k, _)| k.clone())
        .collect();
    if keys.is_empty() {
        return value.clone();
    }

    // Whole-value identity check: nothing to do if no key occurs free.
    let value_fv = free_term_names(value);
    if !keys.iter().any(|k| value_fv.contains(k)) {
        return value.clone();
    }

    let mut fv_union: IndexSet<String> = IndexSet::new();
    for key in &keys {
        if let Some(term) = subs.get(key).and_then(Definition::term) {
            // Erasure preserves term names, so the definition body's free
            // set covers every flavor of replacement.
            fv_union.extend(free_term_names(term));
        }
    }

    let mut bound = HashSet::new();
    batch_term_at(value, subs, &keys, &fv_union, &mut bound)
}

fn batch_term_at(
    value: &ValueRef,
    subs: &IndexMap<String, Definition>,
    keys: &IndexSet<String>,
    fv_union: &IndexSet<String>,
    bound: &mut HashSet<String>,
) -> ValueRef {
    match &**value {
        Value::Var { name } | Value::PolyVar { name } => {
            if keys.contains(name) && !bound.contains(name) {
                if let Some(def) = subs.get(name) {
                    if let Some(replacement) = replace_term(value, def) {
                        return replacement;
                    }
                }
            }
            value.clone()
        }
        Value::Terminal { .. } | Value::TyVar { .. } => value.clone(),
        Value::Abs { param, body } => {
            let (param2, body2) = freshen_batch_binder(param, body, keys, fv_union, bound);
            let new_body = super::with_bound(bound, &param2, |b| {
                batch_term_at(&body2, subs, keys, fv_union, b)
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
            let (param2, body2) = freshen_batch_binder(param, body, keys, fv_union, bound);
            let new_body = super::with_bound(bound, &param2, |b| {
                batch_term_at(&body2, subs, keys, fv_union, b)
            });
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::typed_abs(param2, param_ty.clone(), new_body)
            }
        }
        Value::PolyAbs {
            param,
            param_ty,
            body,
        } => {
            let (param2, body2) = freshen_batch_binder(param, body, keys, fv_union, bound);
            let new_body = super::with_bound(bound, &param2, |b| {
                batch_term_at(&body2, subs, keys, fv_union, b)
            });
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::poly_abs(param2, param_ty.clone(), new_body)
            }
        }
        Value::TypeAbs { param, body } => {
            let b = batch_term_at(body, subs, keys, fv_union, bound);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::type_abs(param.clone(), b)
            }
        }
        Value::Forall { param, body } => {
            let b = batch_term_at(body, subs, keys, fv_union, bound);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::forall(param.clone(), b)
            }
        }
        Value::TypeApp { term, ty } => {
            let t = batch_term_at(term, subs, keys, fv_union, bound);
            if Rc::ptr_eq(&t, term) {
                value.clone()
            } else {
                Value::type_app(t, ty.clone())
            }
        }
        Value::App { lhs, rhs } => {
            let l = batch_term_at(lhs, subs, keys, fv_union, bound);
            let r = batch_term_at(rhs, subs, keys, fv_union, bound);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::TyApp { func, arg } => {
            let fu = batch_term_at(func, subs, keys, fv_union, bound);
            let a = batch_term_at(arg, subs, keys, fv_union, bound);
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
            let v2 = batch_term_at(v, subs, keys, fv_union, bound);
            let (bind2, body2) = freshen_batch_binder(bind, body, keys, fv_union, bound);
            let new_body = super::with_bound(bound, &bind2, |b| {
                batch_term_at(&body2, subs, keys, fv_union, b)
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
            let s = batch_term_at(scrutinee, subs, keys, fv_union, bound);
            let mut changed = !Rc::ptr_eq(&s, scrutinee);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let arm2 = batch_term_arm(arm, subs, keys, fv_union, bound);
                changed = changed || arm2 != *arm;
                new_arms.push(arm2);
            }
            if changed {
                Value::match_on(s, return_ty.clone(), new_arms)
            } else {
                value.clone()
            }
        }
    }
}

/// Rename a binder apart only when a key can actually fire below it;
/// otherwise an untouched subtree must come back untouched.
fn freshen_batch_binder(
    param: &str,
    body: &ValueRef,
    keys: &IndexSet<String>,
    fv_union: &IndexSet<String>,
    bound: &HashSet<String>,
) -> (String, ValueRef) {
    if !fv_union.contains(param) {
        return (param.to_string(), body.clone());
    }
    let body_fv = free_term_names(body);
    let fires = keys
        .iter()
        .any(|k| k.as_str() != param && !bound.contains(k) && body_fv.contains(k));
    if !fires {
        return (param.to_string(), body.clone());
    }
    let fresh_name = fresh(param, |c| {
        keys.contains(c) || fv_union.contains(c) || bound.contains(c) || body_fv.contains(c)
    });
    let renamed = rename::alpha_rename_term(body, param, &fresh_name);
    (fresh_name, renamed)
}

fn batch_term_arm(
    arm: &MatchArm,
    subs: &IndexMap<String, Definition>,
    keys: &IndexSet<String>,
    fv_union: &IndexSet<String>,
    bound: &mut HashSet<String>,
) -> MatchArm {
    let mut params = arm.params.clone();
    let mut body = arm.body.clone();

    for i in 0..params.len() {
        if !fv_union.contains(&params[i]) {
            continue;
        }
        let body_fv = free_term_names(&body);
        let fires = keys
            .iter()
            .any(|k| !params.iter().any(|p| p == k) && !bound.contains(k) && body_fv.contains(k));
        if !fires {
            continue;
        }
        let old = params[i].clone();
        let fresh_name = fresh(&old, |c| {
            keys.contains(c)
                || fv_union.contains(c)
                || bound.contains(c)
                || body_fv.contains(c)
                || params.iter().any(|p| p == c)
        });
        body = rename::alpha_rename_term(&body, &old, &fresh_name);
        params[i] = fresh_name;
    }

    let added: Vec<String> = params
        .iter()
        .filter(|p| bound.insert((*p).clone()))
        .cloned()
        .collect();
    let new_body = batch_term_at(&body, subs, keys, fv_union, bound);
    for p in &added {
        bound.remove(p);
    }

    MatchArm {
        ctor: arm.ctor.clone(),
        params,
        body: new_body,
    }
}

/// Substitute every free type reference named in `subs` by its definition
/// body. Same independence and identity guarantees as the term batch.
pub fn subst_type_batch(value: &ValueRef, subs: &IndexMap<String, ValueRef>) -> ValueRef {
    if subs.is_empty() {
        return value.clone();
    }

    let value_fv = free_type_names(value);
    if !subs.keys().any(|k| value_fv.contains(k)) {
        return value.clone();
    }

    let mut fv_union: IndexSet<String> = IndexSet::new();
    for replacement in subs.values() {
        fv_union.extend(free_type_names(replacement));
    }

    let mut bound = HashSet::new();
    batch_type_at(value, subs, &fv_union, &mut bound)
}

fn batch_type_at(
    value: &ValueRef,
    subs: &IndexMap<String, ValueRef>,
    fv_union: &IndexSet<String>,
    bound: &mut HashSet<String>,
) -> ValueRef {
    match &**value {
        Value::TyVar { name } => {
            if !bound.contains(name) {
                if let Some(replacement) = subs.get(name) {
                    return replacement.clone();
                }
            }
            value.clone()
        }
        Value::Var { .. } | Value::PolyVar { .. } | Value::Terminal { .. } => value.clone(),
        Value::TypeAbs { param, body } => {
            let (param2, body2) = freshen_batch_type_binder(param, body, subs, fv_union, bound);
            let new_body =
                super::with_bound(bound, &param2, |b| batch_type_at(&body2, subs, fv_union, b));
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::type_abs(param2, new_body)
            }
        }
        Value::Forall { param, body } => {
            let (param2, body2) = freshen_batch_type_binder(param, body, subs, fv_union, bound);
            let new_body =
                super::with_bound(bound, &param2, |b| batch_type_at(&body2, subs, fv_union, b));
            if param2 == *param && Rc::ptr_eq(&new_body, body) {
                value.clone()
            } else {
                Value::forall(param2, new_body)
            }
        }
        Value::Abs { param, body } => {
            let b = batch_type_at(body, subs, fv_union, bound);
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
            let t = batch_type_at(param_ty, subs, fv_union, bound);
            let b = batch_type_at(body, subs, fv_union, bound);
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
            let t = batch_type_at(param_ty, subs, fv_union, bound);
            let b = batch_type_at(body, subs, fv_union, bound);
            if Rc::ptr_eq(&t, param_ty) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::poly_abs(param.clone(), t, b)
            }
        }
        Value::TypeApp { term, ty } => {
            let t = batch_type_at(term, subs, fv_union, bound);
            let ty2 = batch_type_at(ty, subs, fv_union, bound);
            if Rc::ptr_eq(&t, term) && Rc::ptr_eq(&ty2, ty) {
                value.clone()
            } else {
                Value::type_app(t, ty2)
            }
        }
        Value::App { lhs, rhs } => {
            let l = batch_type_at(lhs, subs, fv_union, bound);
            let r = batch_type_at(rhs, subs, fv_union, bound);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::TyApp { func, arg } => {
            let fu = batch_type_at(func, subs, fv_union, bound);
            let a = batch_type_at(arg, subs, fv_union, bound);
            if Rc::ptr_eq(&fu, func) && Rc::ptr_eq(&a, arg) {
                value.clone()
            } else {
                Value::ty_app(fu, a)
            }
        }
        Value::Let { name, value: v, body } => {
            let v2 = batch_type_at(v, subs, fv_union, bound);
            let b = batch_type_at(body, subs, fv_union, bound);
            if Rc::ptr_eq(&v2, v) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::let_in(name.clone(), v2, b)
            }
        }
        Value::Match {
            scrutinee,
            return_ty,
            arms,
        } => {
            let s = batch_type_at(scrutinee, subs, fv_union, bound);
            let rt = batch_type_at(return_ty, subs, fv_union, bound);
            let mut changed = !Rc::ptr_eq(&s, scrutinee) || !Rc::ptr_eq(&rt, return_ty);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let b = batch_type_at(&arm.body, subs, fv_union, bound);
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

fn freshen_batch_type_binder(
    param: &str,
    body: &ValueRef,
    subs: &IndexMap<String, ValueRef>,
    fv_union: &IndexSet<String>,
    bound: &HashSet<String>,
) -> (String, ValueRef) {
    if !fv_union.contains(param) {
        return (param.to_string(), body.clone());
    }
    let body_fv = free_type_names(body);
    let fires = subs
        .keys()
        .any(|k| k.as_str() != param && !bound.contains(k) && body_fv.contains(k));
    if !fires {
        return (param.to_string(), body.clone());
    }
    let fresh_name = fresh(param, |c| {
        subs.contains_key(c) || fv_union.contains(c) || bound.contains(c) || body_fv.contains(c)
    });
    let renamed = rename::alpha_rename_type(body, param, &fresh_name);
    (fresh_name, renamed)
}
