//! Free-variable / external-reference analysis.
//!
//! Computes, for any value, the term and type names referenced but not
//! bound inside it. The traversal is an explicit worklist: application
//! spines push the left child and loop on the right one, so
//! right-associated encodings of lists cost no stack depth.
//!
//! `RefAnalyzer` memoizes results on node identity for the lifetime of one
//! pipeline run. The memo holds a strong reference to each key node, so a
//! cached pointer can never be reused for a different allocation while the
//! analyzer is alive.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use triplang_core::{Value, ValueRef, is_nat_literal};

/// Free term and type references of a value. Each name maps to the first
/// node the traversal saw it at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalRefs {
    pub terms: IndexMap<String, ValueRef>,
    pub types: IndexMap<String, ValueRef>,
}

impl ExternalRefs {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.types.is_empty()
    }
}

/// Names bound at one point of the traversal, split by namespace. Binding
/// clones the underlying set only when it actually grows.
#[derive(Debug, Clone, Default)]
struct Scope {
    terms: Rc<HashSet<String>>,
    types: Rc<HashSet<String>>,
}

impl Scope {
    fn bind_term(&self, name: &str) -> Scope {
        if self.terms.contains(name) {
            return self.clone();
        }
        let mut terms = (*self.terms).clone();
        terms.insert(name.to_string());
        Scope {
            terms: Rc::new(terms),
            types: self.types.clone(),
        }
    }

    fn bind_terms(&self, names: &[String]) -> Scope {
        if names.iter().all(|n| self.terms.contains(n)) {
            return self.clone();
        }
        let mut terms = (*self.terms).clone();
        terms.extend(names.iter().cloned());
        Scope {
            terms: Rc::new(terms),
            types: self.types.clone(),
        }
    }

    fn bind_type(&self, name: &str) -> Scope {
        if self.types.contains(name) {
            return self.clone();
        }
        let mut types = (*self.types).clone();
        types.insert(name.to_string());
        Scope {
            terms: self.terms.clone(),
            types: Rc::new(types),
        }
    }
}

/// Collect the external references of `value` with nothing pre-bound.
pub fn collect_refs(value: &ValueRef) -> ExternalRefs {
    let mut refs = ExternalRefs::default();
    let mut work: Vec<(ValueRef, Scope)> = vec![(value.clone(), Scope::default())];

    while let Some((frame_node, frame_scope)) = work.pop() {
        let mut node = frame_node;
        let scope = frame_scope;
        loop {
            match &*node {
                Value::App { lhs, rhs } => {
                    // Loop on the right child; only the left costs a frame.
                    work.push((lhs.clone(), scope.clone()));
                    let next = rhs.clone();
                    node = next;
                }
                Value::Var { name } | Value::PolyVar { name } => {
                    if !is_nat_literal(name) && !scope.terms.contains(name) {
                        refs.terms
                            .entry(name.clone())
                            .or_insert_with(|| node.clone());
                    }
                    break;
                }
                Value::TyVar { name } => {
                    if !scope.types.contains(name) {
                        refs.types
                            .entry(name.clone())
                            .or_insert_with(|| node.clone());
                    }
                    break;
                }
                Value::Terminal { .. } => break,
                Value::Abs { param, body } => {
                    work.push((body.clone(), scope.bind_term(param)));
                    break;
                }
                Value::TypedAbs {
                    param,
                    param_ty,
                    body,
                }
                | Value::PolyAbs {
                    param,
                    param_ty,
                    body,
                } => {
                    // The annotation sees the outer type scope.
                    work.push((param_ty.clone(), scope.clone()));
                    work.push((body.clone(), scope.bind_term(param)));
                    break;
                }
                Value::TypeAbs { param, body } => {
                    work.push((body.clone(), scope.bind_type(param)));
                    break;
                }
                Value::TypeApp { term, ty } => {
                    work.push((term.clone(), scope.clone()));
                    work.push((ty.clone(), scope.clone()));
                    break;
                }
                Value::Let { name, value, body } => {
                    work.push((value.clone(), scope.clone()));
                    work.push((body.clone(), scope.bind_term(name)));
                    break;
                }
                Value::Match {
                    scrutinee,
                    return_ty,
                    arms,
                } => {
                    work.push((scrutinee.clone(), scope.clone()));
                    work.push((return_ty.clone(), scope.clone()));
                    for arm in arms {
                        work.push((arm.body.clone(), scope.bind_terms(&arm.params)));
                    }
                    break;
                }
                Value::Forall { param, body } => {
                    work.push((body.clone(), scope.bind_type(param)));
                    break;
                }
                Value::TyApp { func, arg } => {
                    work.push((func.clone(), scope.clone()));
                    work.push((arg.clone(), scope.clone()));
                    break;
                }
            }
        }
    }

    refs
}

/// Free term names of `value`, for capture checks.
pub fn free_term_names(value: &ValueRef) -> IndexSet<String> {
    collect_refs(value).terms.into_keys().collect()
}

/// Free type names of `value`, for capture checks.
pub fn free_type_names(value: &ValueRef) -> IndexSet<String> {
    collect_refs(value).types.into_keys().collect()
}

/// External-reference analyzer with an identity-keyed memo. Scope one
/// instance to one pipeline run; the memo keeps its key nodes alive, so it
/// must not outlive the run.
#[derive(Debug, Default)]
pub struct RefAnalyzer {
    memo: HashMap<*const Value, (ValueRef, Rc<ExternalRefs>)>,
}

impl RefAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The external references of `value`. Repeated calls for the same
    /// node return the same shared result.
    pub fn external_references(&mut self, value: &ValueRef) -> Rc<ExternalRefs> {
        let key = Rc::as_ptr(value);
        if let Some((_, refs)) = self.memo.get(&key) {
            return refs.clone();
        }
        let refs = Rc::new(collect_refs(value));
        self.memo.insert(key, (value.clone(), refs.clone()));
        refs
    }

    /// Number of memoized nodes.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}
