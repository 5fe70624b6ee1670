#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! TripLang frontend: lowers parsed programs into a resolved, capture-free,
//! constructor-desugared form for downstream type checking and evaluation.
//!
//! The pipeline runs leaves-first over a program of top-level definitions:
//! - `analyze` - symbol table construction and external-reference analysis
//! - `elaborate` - ambiguous-application rewriting and match desugaring
//! - `subst` - hygienic capture-avoiding substitution (term and type level)
//! - `lower` - cross-calculus type-erasure lowering
//! - `resolve` - cross-definition inlining to a fixed point
//! - `pipeline` - staged facade over the passes
//! - `error` - staged error taxonomy with diagnostic payloads
//!
//! The surface parser, the type checker, and the evaluator are external
//! collaborators: this crate consumes `triplang_core::Program` values and
//! produces a `Program` of identical shape.

pub mod analyze;
pub mod elaborate;
pub mod error;
pub mod lower;
pub mod pipeline;
pub mod resolve;
pub mod subst;

#[cfg(test)]
mod error_tests;
#[cfg(test)]
pub mod test_utils;

pub use analyze::refs::{ExternalRefs, RefAnalyzer};
pub use analyze::symbol_table::SymbolTable;
pub use error::{Diagnostic, Error, Namespace, Stage};
pub use pipeline::{Elaborated, Frontend, Indexed, Resolved};

/// Result type for frontend passes. Every failure is a staged diagnostic.
pub type Result<T> = std::result::Result<T, Diagnostic>;
