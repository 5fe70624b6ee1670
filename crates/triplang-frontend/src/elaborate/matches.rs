//! Match desugaring into typed Church-encoded eliminator applications.
//!
//! A data value is its own fold, so `match e [τ] { … }` becomes
//! `((e [τ]) f₀ f₁ … fₙ₋₁)` where `fᵢ` handles the i-th declared
//! constructor: arms are reordered to declaration order and each becomes a
//! curried nest of typed System-F abstractions over its constructor's
//! fields.

use triplang_core::{MatchArm, Value, ValueRef};

use crate::Result;
use crate::analyze::{ConstructorInfo, SymbolTable};
use crate::error::{Diagnostic, Error};

/// Desugar one match whose scrutinee and arm bodies are already
/// elaborated. `original` is the pre-desugar node, kept for diagnostics.
pub(super) fn desugar(
    original: &ValueRef,
    scrutinee: ValueRef,
    return_ty: ValueRef,
    arms: Vec<MatchArm>,
    table: &SymbolTable,
) -> Result<ValueRef> {
    if arms.is_empty() {
        return Err(fail(Error::MatchEmpty, original));
    }

    // Every arm's constructor must resolve, and all to the same data type.
    let mut resolved: Vec<(&MatchArm, &ConstructorInfo)> = Vec::with_capacity(arms.len());
    for arm in &arms {
        let info = table.constructor(&arm.ctor).ok_or_else(|| {
            fail(
                Error::UnknownConstructor {
                    ctor: arm.ctor.clone(),
                },
                original,
            )
        })?;
        resolved.push((arm, info));
    }

    let data_name = resolved[0].1.data_name.clone();
    for (_, info) in &resolved {
        if info.data_name != data_name {
            return Err(fail(
                Error::MismatchedDataType {
                    expected: data_name,
                    found: info.data_name.clone(),
                },
                original,
            ));
        }
    }

    let data = table.data(&data_name).ok_or_else(|| {
        fail(
            Error::MissingDataDefinition {
                data: data_name.clone(),
            },
            original,
        )
    })?;

    // Duplicates, then exhaustiveness. All arms resolve into this data
    // type, so covering every declared constructor without repetition
    // means the arm set equals the constructor set.
    for (i, (arm, _)) in resolved.iter().enumerate() {
        if resolved[..i].iter().any(|(prior, _)| prior.ctor == arm.ctor) {
            return Err(fail(
                Error::DuplicateArm {
                    ctor: arm.ctor.clone(),
                },
                original,
            ));
        }
    }

    let missing: Vec<String> = data
        .constructors
        .iter()
        .filter(|c| !arms.iter().any(|arm| arm.ctor == c.name))
        .map(|c| c.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(fail(Error::NonExhaustive { missing }, original));
    }

    for (arm, info) in &resolved {
        if arm.params.len() != info.ctor.fields.len() {
            return Err(fail(
                Error::ArityMismatch {
                    ctor: arm.ctor.clone(),
                    expected: info.ctor.fields.len(),
                    found: arm.params.len(),
                },
                original,
            ));
        }
    }

    // Declaration order, then curry each arm over its constructor fields.
    resolved.sort_by_key(|(_, info)| info.index);

    let mut result = Value::type_app(scrutinee, return_ty);
    for (arm, info) in &resolved {
        let mut handler = arm.body.clone();
        for (param, field_ty) in arm.params.iter().zip(&info.ctor.fields).rev() {
            handler = Value::poly_abs(param.clone(), field_ty.clone(), handler);
        }
        result = Value::app(result, handler);
    }
    Ok(result)
}

fn fail(error: Error, original: &ValueRef) -> Diagnostic {
    Diagnostic::new(error).with_term(original.clone())
}
