//! Symbol table: one-pass indexing of top-level definitions.
//!
//! Term definitions (poly, typed, untyped, combinator) share the term
//! namespace; type and data definitions share the type namespace.
//! Constructors get their own keyspace, each entry remembering its data
//! type and declaration index for eliminator ordering.

use indexmap::{IndexMap, IndexSet};

use triplang_core::{DataConstructor, DataDef, Definition, Program, ValueRef};

use crate::Result;
use crate::error::{Diagnostic, Error, Namespace};

/// A constructor's location within its data declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub data_name: String,
    pub index: usize,
    pub ctor: DataConstructor,
}

/// Name → definition maps for one program, insertion-ordered.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    terms: IndexMap<String, Definition>,
    types: IndexMap<String, ValueRef>,
    data: IndexMap<String, DataDef>,
    constructors: IndexMap<String, ConstructorInfo>,
    imports: IndexSet<String>,
    exports: IndexSet<String>,
    module: Option<String>,
}

impl SymbolTable {
    /// Walk the definition list once and build the table. Fails on the
    /// first duplicate name (the diagnostic points at the second
    /// occurrence) and enforces the single-module rule.
    pub fn build(program: &Program) -> Result<Self> {
        let mut table = SymbolTable::default();

        for def in program.iter() {
            match def {
                Definition::Poly { name, .. }
                | Definition::Typed { name, .. }
                | Definition::Untyped { name, .. }
                | Definition::Combinator { name, .. } => {
                    if table.terms.contains_key(name) {
                        return Err(duplicate(Namespace::Term, name, def.term().cloned()));
                    }
                    table.terms.insert(name.clone(), def.clone());
                }
                Definition::Type { name, ty } => {
                    if table.type_name_defined(name) {
                        return Err(duplicate(Namespace::Type, name, Some(ty.clone())));
                    }
                    table.types.insert(name.clone(), ty.clone());
                }
                Definition::Data(data) => {
                    if table.type_name_defined(&data.name) {
                        return Err(duplicate(Namespace::Type, &data.name, None));
                    }
                    for (index, ctor) in data.constructors.iter().enumerate() {
                        if table.constructors.contains_key(&ctor.name) {
                            return Err(duplicate(Namespace::Constructor, &ctor.name, None));
                        }
                        table.constructors.insert(
                            ctor.name.clone(),
                            ConstructorInfo {
                                data_name: data.name.clone(),
                                index,
                                ctor: ctor.clone(),
                            },
                        );
                    }
                    table.data.insert(data.name.clone(), data.clone());
                }
                Definition::Module { name } => {
                    if table.module.is_some() {
                        return Err(Diagnostic::new(Error::DuplicateModule { name: name.clone() }));
                    }
                    table.module = Some(name.clone());
                }
                Definition::Import { name, .. } => {
                    table.imports.insert(name.clone());
                }
                Definition::Export { name } => {
                    // Verification that the name exists is deferred to the
                    // module loader.
                    table.exports.insert(name.clone());
                }
            }
        }

        if table.module.is_none() {
            return Err(Diagnostic::new(Error::MissingModule));
        }

        Ok(table)
    }

    /// Term-flavored definition for `name`, if any.
    pub fn term(&self, name: &str) -> Option<&Definition> {
        self.terms.get(name)
    }

    /// Body of the named type definition. Data declarations are not
    /// aliases and do not appear here.
    pub fn type_alias(&self, name: &str) -> Option<&ValueRef> {
        self.types.get(name)
    }

    /// The named data declaration, if any.
    pub fn data(&self, name: &str) -> Option<&DataDef> {
        self.data.get(name)
    }

    /// Constructor lookup across all data declarations.
    pub fn constructor(&self, name: &str) -> Option<&ConstructorInfo> {
        self.constructors.get(name)
    }

    /// True if `name` is taken in the type namespace (alias or data).
    pub fn type_name_defined(&self, name: &str) -> bool {
        self.types.contains_key(name) || self.data.contains_key(name)
    }

    pub fn is_imported(&self, name: &str) -> bool {
        self.imports.contains(name)
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Exported names, in declaration order, for downstream loaders.
    pub fn exports(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(String::as_str)
    }

    pub fn term_names(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

fn duplicate(namespace: Namespace, name: &str, term: Option<ValueRef>) -> Diagnostic {
    let mut diag = Diagnostic::new(Error::Duplicate {
        namespace,
        name: name.to_string(),
    });
    if let Some(term) = term {
        diag = diag.with_term(term);
    }
    diag
}
