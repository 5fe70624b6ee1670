//! Program resolution: inline cross-definition references to a fixed
//! point.
//!
//! Each sweep computes every definition body's external references, builds
//! a flavor-mediated substitution map from the symbol table, and applies
//! one non-chaining batch substitution. Sweeps repeat until nothing fires.
//! A recursive `poly` definition's own name is excluded from its map, so
//! its body converges without self-inlining.
//!
//! References that resolve but are never inlined: imported names (linking
//! is a loader concern), type references naming `data` declarations, and
//! term references naming constructors — declarations are nominal, there
//! is nothing to substitute for them.

#[cfg(test)]
mod resolve_tests;

use std::rc::Rc;

use indexmap::IndexMap;

use triplang_core::{DataConstructor, DataDef, Definition, Program, ValueRef};

use crate::Result;
use crate::analyze::{RefAnalyzer, SymbolTable};
use crate::error::{Diagnostic, Error};
use crate::subst::{subst_term_batch, subst_type_batch};

/// Sweep bound. A chain of acyclic definitions resolves in one sweep per
/// dependency level; hitting the bound means an undeclared cycle.
pub const MAX_RESOLVE_PASSES: usize = 512;

/// Resolve every definition body against the symbol table until no
/// substitution fires anywhere.
pub fn resolve_program(program: &Program, table: &SymbolTable) -> Result<Program> {
    let mut analyzer = RefAnalyzer::new();
    let mut current = program.definitions.clone();

    for _ in 0..MAX_RESOLVE_PASSES {
        let mut changed = false;
        let mut next = Vec::with_capacity(current.len());
        for def in &current {
            let (def2, def_changed) = resolve_definition(def, table, &mut analyzer)?;
            changed = changed || def_changed;
            next.push(def2);
        }
        current = next;
        if !changed {
            return Ok(Program::new(current));
        }
    }

    Err(Diagnostic::new(Error::FixpointOverflow {
        passes: MAX_RESOLVE_PASSES,
    }))
}

fn resolve_definition(
    def: &Definition,
    table: &SymbolTable,
    analyzer: &mut RefAnalyzer,
) -> Result<(Definition, bool)> {
    match def {
        Definition::Poly {
            name,
            term,
            recursive,
        } => {
            let skip = recursive.then_some(name.as_str());
            let term2 = resolve_value(term, table, analyzer, skip, &[])?;
            let changed = !Rc::ptr_eq(&term2, term);
            Ok((
                Definition::Poly {
                    name: name.clone(),
                    term: term2,
                    recursive: *recursive,
                },
                changed,
            ))
        }
        Definition::Typed { name, term } => {
            let term2 = resolve_value(term, table, analyzer, None, &[])?;
            let changed = !Rc::ptr_eq(&term2, term);
            Ok((
                Definition::Typed {
                    name: name.clone(),
                    term: term2,
                },
                changed,
            ))
        }
        Definition::Untyped { name, term } => {
            let term2 = resolve_value(term, table, analyzer, None, &[])?;
            let changed = !Rc::ptr_eq(&term2, term);
            Ok((
                Definition::Untyped {
                    name: name.clone(),
                    term: term2,
                },
                changed,
            ))
        }
        Definition::Combinator { name, term } => {
            let term2 = resolve_value(term, table, analyzer, None, &[])?;
            let changed = !Rc::ptr_eq(&term2, term);
            Ok((
                Definition::Combinator {
                    name: name.clone(),
                    term: term2,
                },
                changed,
            ))
        }
        Definition::Type { name, ty } => {
            let ty2 = resolve_value(ty, table, analyzer, None, &[])?;
            let changed = !Rc::ptr_eq(&ty2, ty);
            Ok((
                Definition::Type {
                    name: name.clone(),
                    ty: ty2,
                },
                changed,
            ))
        }
        Definition::Data(data) => {
            let mut changed = false;
            let mut constructors = Vec::with_capacity(data.constructors.len());
            for ctor in &data.constructors {
                let mut fields = Vec::with_capacity(ctor.fields.len());
                for field in &ctor.fields {
                    // The declaration's own type parameters are bound here.
                    let field2 =
                        resolve_value(field, table, analyzer, None, &data.type_params)?;
                    changed = changed || !Rc::ptr_eq(&field2, field);
                    fields.push(field2);
                }
                constructors.push(DataConstructor {
                    name: ctor.name.clone(),
                    fields,
                });
            }
            Ok((
                Definition::Data(DataDef {
                    name: data.name.clone(),
                    type_params: data.type_params.clone(),
                    constructors,
                }),
                changed,
            ))
        }
        Definition::Module { .. } | Definition::Import { .. } | Definition::Export { .. } => {
            Ok((def.clone(), false))
        }
    }
}

/// One body, one batch. `skip_term` is the defining name of a recursive
/// definition; `local_types` are type names bound by the enclosing
/// declaration (data type parameters).
fn resolve_value(
    value: &ValueRef,
    table: &SymbolTable,
    analyzer: &mut RefAnalyzer,
    skip_term: Option<&str>,
    local_types: &[String],
) -> Result<ValueRef> {
    let refs = analyzer.external_references(value);
    if refs.is_empty() {
        return Ok(value.clone());
    }

    let mut term_subs: IndexMap<String, Definition> = IndexMap::new();
    let mut type_subs: IndexMap<String, ValueRef> = IndexMap::new();
    let mut unresolved_terms: Vec<String> = Vec::new();
    let mut unresolved_types: Vec<String> = Vec::new();

    for name in refs.terms.keys() {
        if Some(name.as_str()) == skip_term {
            continue;
        }
        if let Some(def) = table.term(name) {
            term_subs.insert(name.clone(), def.clone());
        } else if table.constructor(name).is_some() || table.is_imported(name) {
            // Nominal or externally linked; nothing to inline.
        } else {
            unresolved_terms.push(name.clone());
        }
    }

    for name in refs.types.keys() {
        if local_types.iter().any(|t| t == name) {
            continue;
        }
        if let Some(ty) = table.type_alias(name) {
            type_subs.insert(name.clone(), ty.clone());
        } else if table.data(name).is_some() || table.is_imported(name) {
            // Nominal or externally linked.
        } else {
            unresolved_types.push(name.clone());
        }
    }

    if let Some(first) = unresolved_terms.first() {
        let error = Error::UnresolvedTerm {
            name: first.clone(),
        };
        return Err(Diagnostic::new(error)
            .with_term(value.clone())
            .with_unresolved(unresolved_terms, unresolved_types));
    }
    if let Some(first) = unresolved_types.first() {
        let error = Error::UnresolvedType {
            name: first.clone(),
        };
        return Err(Diagnostic::new(error)
            .with_term(value.clone())
            .with_unresolved(unresolved_terms, unresolved_types));
    }

    let substituted = subst_term_batch(value, &term_subs);
    Ok(subst_type_batch(&substituted, &type_subs))
}
