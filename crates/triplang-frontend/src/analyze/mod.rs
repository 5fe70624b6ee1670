//! Semantic analysis: symbol table construction and reference analysis.
//!
//! - `symbol_table` - one-pass indexer over top-level definitions
//! - `refs` - free-variable / external-reference analyzer

pub mod refs;
pub mod symbol_table;


pub use refs::{ExternalRefs, RefAnalyzer, collect_refs, free_term_names, free_type_names};
pub use symbol_table::{ConstructorInfo, SymbolTable};
