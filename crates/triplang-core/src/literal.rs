//! The natural-literal identifier schema.
//!
//! Identifiers spelled as a bare run of decimal digits encode natural
//! numbers. The analyzer and the substitution engine treat such names as
//! atoms: they are never reported as external references and never
//! substituted.

use num_bigint::BigUint;

/// Decode a natural-literal identifier, or `None` if `name` does not match
/// the schema. The schema is a non-empty run of ASCII decimal digits;
/// there is no size bound, hence the big integer.
pub fn parse_nat_literal(name: &str) -> Option<BigUint> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(name.as_bytes(), 10)
}

/// True if `name` matches the natural-literal identifier schema.
pub fn is_nat_literal(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Render a natural for a diagnostics payload. Big integers serialize with
/// a trailing `n`.
pub fn format_nat(n: &BigUint) -> String {
    format!("{n}n")
}
