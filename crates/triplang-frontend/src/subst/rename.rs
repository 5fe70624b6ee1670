//! Alpha-renaming primitives.
//!
//! `alpha_rename_term` rewrites every term binder named `old` to `new`
//! together with every free term occurrence of `old`, halting descent
//! under a binder already named `new` (shadowing). `alpha_rename_type` is
//! the analogue on the type namespace, where only `TypeAbs` and `Forall`
//! bind.
//!
//! Callers pick `new` fresh, so a rename can never merge two distinct
//! variables; the shadow rule is what keeps a non-fresh rename from
//! walking into scopes where `new` already means something else.

use std::rc::Rc;

use triplang_core::{MatchArm, Value, ValueRef};

/// Rename term binders and free term occurrences of `old` to `new`.
pub fn alpha_rename_term(value: &ValueRef, old: &str, new: &str) -> ValueRef {
    if old == new {
        return value.clone();
    }
    match &**value {
        Value::Var { name } if name == old => Value::var(new),
        Value::PolyVar { name } if name == old => Value::poly_var(new),
        Value::Var { .. }
        | Value::PolyVar { .. }
        | Value::Terminal { .. }
        | Value::TyVar { .. } => value.clone(),
        Value::Abs { param, body } => {
            if param == old {
                Value::abs(new, alpha_rename_term(body, old, new))
            } else if param == new {
                value.clone()
            } else {
                let b = alpha_rename_term(body, old, new);
                if Rc::ptr_eq(&b, body) {
                    value.clone()
                } else {
                    Value::abs(param.clone(), b)
                }
            }
        }
        Value::TypedAbs {
            param,
            param_ty,
            body,
        } => {
            let (param2, body2) = rename_binder(param, body, old, new);
            rebuild_annotated(value, param2, param_ty.clone(), body2, Value::typed_abs)
        }
        Value::PolyAbs {
            param,
            param_ty,
            body,
        } => {
            let (param2, body2) = rename_binder(param, body, old, new);
            rebuild_annotated(value, param2, param_ty.clone(), body2, Value::poly_abs)
        }
        Value::TypeAbs { param, body } => {
            let b = alpha_rename_term(body, old, new);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::type_abs(param.clone(), b)
            }
        }
        Value::Forall { param, body } => {
            let b = alpha_rename_term(body, old, new);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::forall(param.clone(), b)
            }
        }
        Value::TypeApp { term, ty } => {
            let t = alpha_rename_term(term, old, new);
            if Rc::ptr_eq(&t, term) {
                value.clone()
            } else {
                Value::type_app(t, ty.clone())
            }
        }
        Value::App { lhs, rhs } => {
            let l = alpha_rename_term(lhs, old, new);
            let r = alpha_rename_term(rhs, old, new);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::TyApp { func, arg } => {
            let fu = alpha_rename_term(func, old, new);
            let a = alpha_rename_term(arg, old, new);
            if Rc::ptr_eq(&fu, func) && Rc::ptr_eq(&a, arg) {
                value.clone()
            } else {
                Value::ty_app(fu, a)
            }
        }
        Value::Let { name, value: v, body } => {
            let v2 = alpha_rename_term(v, old, new);
            let (name2, body2) = rename_binder(name, body, old, new);
            if name2 == *name && Rc::ptr_eq(&v2, v) && Rc::ptr_eq(&body2, body) {
                value.clone()
            } else {
                Value::let_in(name2, v2, body2)
            }
        }
        Value::Match {
            scrutinee,
            return_ty,
            arms,
        } => {
            let s = alpha_rename_term(scrutinee, old, new);
            let mut changed = !Rc::ptr_eq(&s, scrutinee);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let renamed = rename_arm(arm, old, new);
                changed = changed || renamed != *arm;
                new_arms.push(renamed);
            }
            if changed {
                Value::match_on(s, return_ty.clone(), new_arms)
            } else {
                value.clone()
            }
        }
    }
}

/// Shared binder rule for single-name term binders. Returns the new bound
/// name and the (possibly renamed) body.
fn rename_binder(param: &str, body: &ValueRef, old: &str, new: &str) -> (String, ValueRef) {
    if param == old {
        (new.to_string(), alpha_rename_term(body, old, new))
    } else if param == new {
        (param.to_string(), body.clone())
    } else {
        (param.to_string(), alpha_rename_term(body, old, new))
    }
}

fn rename_arm(arm: &MatchArm, old: &str, new: &str) -> MatchArm {
    let has_old = arm.params.iter().any(|p| p == old);
    let has_new = arm.params.iter().any(|p| p == new);
    if has_old && has_new {
        // Renaming would merge two parameters; the occurrences of `old`
        // are bound here, so the arm stays as-is.
        return arm.clone();
    }
    if has_old {
        let params = arm
            .params
            .iter()
            .map(|p| if p == old { new.to_string() } else { p.clone() })
            .collect();
        return MatchArm {
            ctor: arm.ctor.clone(),
            params,
            body: alpha_rename_term(&arm.body, old, new),
        };
    }
    if has_new {
        // `new` is shadowed in this arm.
        return arm.clone();
    }
    MatchArm {
        ctor: arm.ctor.clone(),
        params: arm.params.clone(),
        body: alpha_rename_term(&arm.body, old, new),
    }
}

fn rebuild_annotated(
    value: &ValueRef,
    param2: String,
    param_ty: ValueRef,
    body2: ValueRef,
    make: impl FnOnce(String, ValueRef, ValueRef) -> ValueRef,
) -> ValueRef {
    let unchanged = match &**value {
        Value::TypedAbs { param, body, .. } | Value::PolyAbs { param, body, .. } => {
            param2 == *param && Rc::ptr_eq(&body2, body)
        }
        _ => false,
    };
    if unchanged {
        value.clone()
    } else {
        make(param2, param_ty, body2)
    }
}

/// Rename type binders (`TypeAbs`, `Forall`) and free type occurrences of
/// `old` to `new`.
pub fn alpha_rename_type(value: &ValueRef, old: &str, new: &str) -> ValueRef {
    if old == new {
        return value.clone();
    }
    match &**value {
        Value::TyVar { name } if name == old => Value::ty_var(new),
        Value::TyVar { .. }
        | Value::Var { .. }
        | Value::PolyVar { .. }
        | Value::Terminal { .. } => value.clone(),
        Value::TypeAbs { param, body } => {
            if param == old {
                Value::type_abs(new, alpha_rename_type(body, old, new))
            } else if param == new {
                value.clone()
            } else {
                let b = alpha_rename_type(body, old, new);
                if Rc::ptr_eq(&b, body) {
                    value.clone()
                } else {
                    Value::type_abs(param.clone(), b)
                }
            }
        }
        Value::Forall { param, body } => {
            if param == old {
                Value::forall(new, alpha_rename_type(body, old, new))
            } else if param == new {
                value.clone()
            } else {
                let b = alpha_rename_type(body, old, new);
                if Rc::ptr_eq(&b, body) {
                    value.clone()
                } else {
                    Value::forall(param.clone(), b)
                }
            }
        }
        Value::Abs { param, body } => {
            let b = alpha_rename_type(body, old, new);
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
            let t = alpha_rename_type(param_ty, old, new);
            let b = alpha_rename_type(body, old, new);
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
            let t = alpha_rename_type(param_ty, old, new);
            let b = alpha_rename_type(body, old, new);
            if Rc::ptr_eq(&t, param_ty) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::poly_abs(param.clone(), t, b)
            }
        }
        Value::TypeApp { term, ty } => {
            let t = alpha_rename_type(term, old, new);
            let a = alpha_rename_type(ty, old, new);
            if Rc::ptr_eq(&t, term) && Rc::ptr_eq(&a, ty) {
                value.clone()
            } else {
                Value::type_app(t, a)
            }
        }
        Value::App { lhs, rhs } => {
            let l = alpha_rename_type(lhs, old, new);
            let r = alpha_rename_type(rhs, old, new);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::TyApp { func, arg } => {
            let fu = alpha_rename_type(func, old, new);
            let a = alpha_rename_type(arg, old, new);
            if Rc::ptr_eq(&fu, func) && Rc::ptr_eq(&a, arg) {
                value.clone()
            } else {
                Value::ty_app(fu, a)
            }
        }
        Value::Let { name, value: v, body } => {
            let v2 = alpha_rename_type(v, old, new);
            let b = alpha_rename_type(body, old, new);
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
            let s = alpha_rename_type(scrutinee, old, new);
            let rt = alpha_rename_type(return_ty, old, new);
            let mut changed = !Rc::ptr_eq(&s, scrutinee) || !Rc::ptr_eq(&rt, return_ty);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let b = alpha_rename_type(&arm.body, old, new);
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
