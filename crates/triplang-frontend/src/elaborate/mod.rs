//! Elaboration: two per-definition rewrites between indexing and
//! resolution.
//!
//! - `apps`: ambiguous applications in System-F bodies whose right side
//!   names a defined type become type applications
//! - `matches`: `match` nodes become typed Church-encoded eliminator
//!   applications
//!
//! Both run in one bottom-up traversal; after it, no `Match` node remains
//! anywhere in the program.

mod apps;
mod matches;


use std::rc::Rc;

use triplang_core::{Definition, MatchArm, Program, Value, ValueRef};

use crate::Result;
use crate::analyze::SymbolTable;

/// Elaborate every definition body. Ambiguous-application rewriting only
/// applies inside `poly` bodies; match desugaring applies wherever a match
/// occurs.
pub fn elaborate_program(program: &Program, table: &SymbolTable) -> Result<Program> {
    let mut definitions = Vec::with_capacity(program.len());
    for def in program.iter() {
        let def2 = match def {
            Definition::Poly {
                name,
                term,
                recursive,
            } => Definition::Poly {
                name: name.clone(),
                term: elaborate_value(term, table, true)?,
                recursive: *recursive,
            },
            Definition::Typed { name, term } => Definition::Typed {
                name: name.clone(),
                term: elaborate_value(term, table, false)?,
            },
            Definition::Untyped { name, term } => Definition::Untyped {
                name: name.clone(),
                term: elaborate_value(term, table, false)?,
            },
            Definition::Combinator { name, term } => Definition::Combinator {
                name: name.clone(),
                term: elaborate_value(term, table, false)?,
            },
            Definition::Type { name, ty } => Definition::Type {
                name: name.clone(),
                ty: elaborate_value(ty, table, false)?,
            },
            other => other.clone(),
        };
        definitions.push(def2);
    }
    Ok(Program::new(definitions))
}

fn elaborate_value(value: &ValueRef, table: &SymbolTable, in_poly: bool) -> Result<ValueRef> {
    match &**value {
        Value::Var { .. }
        | Value::PolyVar { .. }
        | Value::Terminal { .. }
        | Value::TyVar { .. } => Ok(value.clone()),
        Value::Abs { param, body } => {
            let b = elaborate_value(body, table, in_poly)?;
            Ok(if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::abs(param.clone(), b)
            })
        }
        Value::TypedAbs {
            param,
            param_ty,
            body,
        } => {
            let b = elaborate_value(body, table, in_poly)?;
            Ok(if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::typed_abs(param.clone(), param_ty.clone(), b)
            })
        }
        Value::PolyAbs {
            param,
            param_ty,
            body,
        } => {
            let b = elaborate_value(body, table, in_poly)?;
            Ok(if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::poly_abs(param.clone(), param_ty.clone(), b)
            })
        }
        Value::TypeAbs { param, body } => {
            let b = elaborate_value(body, table, in_poly)?;
            Ok(if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::type_abs(param.clone(), b)
            })
        }
        Value::Forall { param, body } => {
            let b = elaborate_value(body, table, in_poly)?;
            Ok(if Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::forall(param.clone(), b)
            })
        }
        Value::TypeApp { term, ty } => {
            let t = elaborate_value(term, table, in_poly)?;
            Ok(if Rc::ptr_eq(&t, term) {
                value.clone()
            } else {
                Value::type_app(t, ty.clone())
            })
        }
        Value::TyApp { func, arg } => {
            let fu = elaborate_value(func, table, in_poly)?;
            let a = elaborate_value(arg, table, in_poly)?;
            Ok(if Rc::ptr_eq(&fu, func) && Rc::ptr_eq(&a, arg) {
                value.clone()
            } else {
                Value::ty_app(fu, a)
            })
        }
        Value::App { lhs, rhs } => {
            let l = elaborate_value(lhs, table, in_poly)?;
            let r = elaborate_value(rhs, table, in_poly)?;
            if in_poly {
                if let Some(ty_arg) = apps::type_argument(&r, table) {
                    return Ok(Value::type_app(l, ty_arg));
                }
            }
            Ok(if Rc::ptr_eq(&l, lhs) && Rc::ptr_eq(&r, rhs) {
                value.clone()
            } else {
                Value::app(l, r)
            })
        }
        Value::Let { name, value: v, body } => {
            let v2 = elaborate_value(v, table, in_poly)?;
            let b = elaborate_value(body, table, in_poly)?;
            Ok(if Rc::ptr_eq(&v2, v) && Rc::ptr_eq(&b, body) {
                value.clone()
            } else {
                Value::let_in(name.clone(), v2, b)
            })
        }
        Value::Match {
            scrutinee,
            return_ty,
            arms,
        } => {
            let s = elaborate_value(scrutinee, table, in_poly)?;
            let mut new_arms = Vec::with_capacity(arms.len());
            for arm in arms {
                new_arms.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: elaborate_value(&arm.body, table, in_poly)?,
                });
            }
            matches::desugar(value, s, return_ty.clone(), new_arms, table)
        }
    }
}
