#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the TripLang frontend.
//!
//! TripLang unifies four term calculi (untyped lambda, simply typed lambda,
//! System F, SKI combinators) and a named type language in a single value
//! AST. This crate holds the data model shared by every pass:
//! - `value` - the `Value` sum type and its constructor helpers
//! - `program` - top-level definitions and the `Program` container
//! - `literal` - the natural-literal identifier schema
//!
//! Values are immutable once constructed and shared behind `Rc`; every
//! transformation in the frontend returns new nodes and reuses unchanged
//! subtrees by pointer.

pub mod literal;
pub mod program;
pub mod value;

#[cfg(test)]
mod value_tests;

pub use literal::{format_nat, is_nat_literal, parse_nat_literal};
pub use program::{DataConstructor, DataDef, Definition, Program};
pub use value::{Combinator, MatchArm, Value, ValueRef};
