//! Ambiguous-application rewriting.
//!
//! The surface grammar does not distinguish term from type application, so
//! `x T` parses as a generic application. Inside a System-F body, a right
//! operand that is a bare System-F variable naming a defined type is the
//! unambiguous signal of a type application.
//!
//! The decision is a lookup in the type table, not a syntactic check: a
//! term variable sharing its name with a defined type is read as the type.

use triplang_core::{Value, ValueRef};

use crate::analyze::SymbolTable;

/// If `rhs` signals a type application, the type argument to use: a type
/// reference of the same name, to be inlined later by the resolver.
pub(super) fn type_argument(rhs: &ValueRef, table: &SymbolTable) -> Option<ValueRef> {
    match &**rhs {
        Value::PolyVar { name } if table.type_alias(name).is_some() => {
            Some(Value::ty_var(name.clone()))
        }
        _ => None,
    }
}
