//! The `Value` sum type: one AST for all four term calculi and the type
//! language.
//!
//! Term names and type names live in disjoint namespaces. A binder only
//! shadows names in its own namespace: `Abs`, `TypedAbs`, `PolyAbs`, `Let`
//! and match-arm parameters bind term names; `TypeAbs` and `Forall` bind
//! type names.
//!
//! Children are `Rc`-shared. Passes rebuild only the spine they change and
//! return untouched subtrees by pointer, which is what makes identity-based
//! memoization and the batch-substitution identity guarantee cheap.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::literal::is_nat_literal;

/// Shared handle to an immutable AST node.
pub type ValueRef = Rc<Value>;

/// An SKI combinator atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    S,
    K,
    I,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::S => write!(f, "S"),
            Combinator::K => write!(f, "K"),
            Combinator::I => write!(f, "I"),
        }
    }
}

/// One arm of a `Value::Match`. `params` bind term names in `body` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchArm {
    pub ctor: String,
    pub params: Vec<String>,
    pub body: ValueRef,
}

/// A TripLang value: a term of any of the four calculi, or a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Untyped lambda term reference.
    Var { name: String },
    /// Untyped lambda abstraction; binds `param` as a term in `body`.
    Abs { param: String, body: ValueRef },
    /// Simply typed lambda abstraction; `param_ty` is a type in the
    /// enclosing scope.
    TypedAbs {
        param: String,
        param_ty: ValueRef,
        body: ValueRef,
    },
    /// System F term reference. Names spelling a natural literal are
    /// opaque constants, never references.
    PolyVar { name: String },
    /// System F term abstraction; `param_ty` is a type in the enclosing
    /// scope.
    PolyAbs {
        param: String,
        param_ty: ValueRef,
        body: ValueRef,
    },
    /// System F type abstraction; binds `param` as a type in `body`.
    TypeAbs { param: String, body: ValueRef },
    /// System F type application: a term applied to a type.
    TypeApp { term: ValueRef, ty: ValueRef },
    /// System F let; `value` sits in the enclosing scope, `name` binds as a
    /// term in `body` only.
    Let {
        name: String,
        value: ValueRef,
        body: ValueRef,
    },
    /// System F pattern match. Elaboration removes this variant.
    Match {
        scrutinee: ValueRef,
        return_ty: ValueRef,
        arms: Vec<MatchArm>,
    },
    /// Generic application. Present in source before elaboration; remains
    /// afterwards when both sides are term-valued. Doubles as SKI
    /// application when the leaves are combinator terminals.
    App { lhs: ValueRef, rhs: ValueRef },
    /// SKI combinator atom.
    Terminal { sym: Combinator },
    /// Type reference.
    TyVar { name: String },
    /// Universal quantification; binds `param` as a type in `body`.
    Forall { param: String, body: ValueRef },
    /// Type constructor application, e.g. `List A`.
    TyApp { func: ValueRef, arg: ValueRef },
}

impl Value {
    pub fn var(name: impl Into<String>) -> ValueRef {
        Rc::new(Value::Var { name: name.into() })
    }

    pub fn abs(param: impl Into<String>, body: ValueRef) -> ValueRef {
        Rc::new(Value::Abs {
            param: param.into(),
            body,
        })
    }

    pub fn typed_abs(param: impl Into<String>, param_ty: ValueRef, body: ValueRef) -> ValueRef {
        Rc::new(Value::TypedAbs {
            param: param.into(),
            param_ty,
            body,
        })
    }

    pub fn poly_var(name: impl Into<String>) -> ValueRef {
        Rc::new(Value::PolyVar { name: name.into() })
    }

    pub fn poly_abs(param: impl Into<String>, param_ty: ValueRef, body: ValueRef) -> ValueRef {
        Rc::new(Value::PolyAbs {
            param: param.into(),
            param_ty,
            body,
        })
    }

    pub fn type_abs(param: impl Into<String>, body: ValueRef) -> ValueRef {
        Rc::new(Value::TypeAbs {
            param: param.into(),
            body,
        })
    }

    pub fn type_app(term: ValueRef, ty: ValueRef) -> ValueRef {
        Rc::new(Value::TypeApp { term, ty })
    }

    pub fn let_in(name: impl Into<String>, value: ValueRef, body: ValueRef) -> ValueRef {
        Rc::new(Value::Let {
            name: name.into(),
            value,
            body,
        })
    }

    pub fn match_on(scrutinee: ValueRef, return_ty: ValueRef, arms: Vec<MatchArm>) -> ValueRef {
        Rc::new(Value::Match {
            scrutinee,
            return_ty,
            arms,
        })
    }

    pub fn app(lhs: ValueRef, rhs: ValueRef) -> ValueRef {
        Rc::new(Value::App { lhs, rhs })
    }

    pub fn terminal(sym: Combinator) -> ValueRef {
        Rc::new(Value::Terminal { sym })
    }

    pub fn ty_var(name: impl Into<String>) -> ValueRef {
        Rc::new(Value::TyVar { name: name.into() })
    }

    pub fn forall(param: impl Into<String>, body: ValueRef) -> ValueRef {
        Rc::new(Value::Forall {
            param: param.into(),
            body,
        })
    }

    pub fn ty_app(func: ValueRef, arg: ValueRef) -> ValueRef {
        Rc::new(Value::TyApp { func, arg })
    }

    /// True for a term variable whose spelling is a natural-literal
    /// identifier. Such nodes are opaque constants for the analyzer and
    /// the substitution engine.
    pub fn is_nat_constant(&self) -> bool {
        match self {
            Value::Var { name } | Value::PolyVar { name } => is_nat_literal(name),
            _ => false,
        }
    }
}

impl MatchArm {
    pub fn new(ctor: impl Into<String>, params: Vec<String>, body: ValueRef) -> Self {
        MatchArm {
            ctor: ctor.into(),
            params,
            body,
        }
    }
}

/// Compact rendering used by diagnostics to name offending terms.
///
/// Not an unparser: output is not meant to re-parse. Natural-literal
/// identifiers render with a trailing `n`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Var { name } | Value::PolyVar { name } => {
                if is_nat_literal(name) {
                    write!(f, "{name}n")
                } else {
                    write!(f, "{name}")
                }
            }
            Value::Abs { param, body } => write!(f, "λ{param}. {body}"),
            Value::TypedAbs {
                param,
                param_ty,
                body,
            }
            | Value::PolyAbs {
                param,
                param_ty,
                body,
            } => write!(f, "λ{param}:{param_ty}. {body}"),
            Value::TypeAbs { param, body } => write!(f, "Λ{param}. {body}"),
            Value::TypeApp { term, ty } => write!(f, "({term} [{ty}])"),
            Value::Let { name, value, body } => {
                write!(f, "let {name} = {value} in {body}")
            }
            Value::Match {
                scrutinee,
                return_ty,
                arms,
            } => {
                write!(f, "match {scrutinee} [{return_ty}] {{")?;
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " |")?;
                    }
                    write!(f, " {}", arm.ctor)?;
                    for p in &arm.params {
                        write!(f, " {p}")?;
                    }
                    write!(f, " => {}", arm.body)?;
                }
                write!(f, " }}")
            }
            Value::App { lhs, rhs } => write!(f, "({lhs} {rhs})"),
            Value::Terminal { sym } => write!(f, "{sym}"),
            Value::TyVar { name } => write!(f, "{name}"),
            Value::Forall { param, body } => write!(f, "∀{param}. {body}"),
            Value::TyApp { func, arg } => write!(f, "({func} {arg})"),
        }
    }
}
