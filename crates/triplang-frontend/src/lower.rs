//! Cross-calculus lowering: System F terms to simply typed lambda terms by
//! type erasure.
//!
//! The resolver uses this when an untyped-lambda reference position is
//! resolved to a polymorphic definition: type abstractions and type
//! applications disappear, term abstractions keep their annotations.

use std::rc::Rc;

use triplang_core::{MatchArm, Value, ValueRef};

/// Erase the type-level structure of `value`. `TypeAbs` and `TypeApp`
/// nodes vanish; `PolyVar`/`PolyAbs` become their typed-lambda
/// counterparts; everything else is descended into.
pub fn erase_to_typed(value: &ValueRef) -> ValueRef {
    match &**value {
        Value::PolyVar { name } => Value::var(name.clone()),
        Value::PolyAbs {
            param,
            param_ty,
            body,
        } => Value::typed_abs(param.clone(), param_ty.clone(), erase_to_typed(body)),
        Value::TypeAbs { body, .. } => erase_to_typed(body),
        Value::TypeApp { term, .. } => erase_to_typed(term),
        Value::Var { .. }
        | Value::Terminal { .. }
        | Value::TyVar { .. }
        | Value::Forall { .. }
        | Value::TyApp { .. } => value.clone(),
        Value::Abs { param, body } => {
            let b = erase_to_typed(body);
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
            let b = erase_to_typed(body);
            if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::typed_abs(param.clone(), param_ty.clone(), b)
            }
        }
        Value::App { lhs, rhs } => {
            let l = erase_to_typed(lhs);
            let r = erase_to_typed(rhs);
            if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            }
        }
        Value::Let { name, value: v, body } => {
            let v2 = erase_to_typed(v);
            let b = erase_to_typed(body);
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
            // Matches are desugared before resolution runs, but erasure
            // stays total over the AST.
            let s = erase_to_typed(scrutinee);
            let mut changed = !Rc::ptr_eq(&s, scrutinee);
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                let b = erase_to_typed(&arm.body);
                changed = changed || !Rc::ptr_eq(&b, &arm.body);
                new_arms.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: b,
                });
            }
            if changed {
                Value::match_on(s, return_ty.clone(), new_arms)
            } else {
                value.clone()
            }
        }
    }
}
