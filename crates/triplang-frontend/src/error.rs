//! Staged error taxonomy with diagnostic payloads.
//!
//! Every error names the pipeline stage that detected it. A `Diagnostic`
//! wraps the error with optional context: the offending term, the sets of
//! unresolved names, and a nested cause, all rendered as additional lines
//! under the primary message.

use std::fmt;

use triplang_core::ValueRef;

/// The pipeline stage an error was raised at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Index,
    Elaborate,
    Resolve,
    Typecheck,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "parse"),
            Stage::Index => write!(f, "index"),
            Stage::Elaborate => write!(f, "elaborate"),
            Stage::Resolve => write!(f, "resolve"),
            Stage::Typecheck => write!(f, "typecheck"),
        }
    }
}

/// The two disjoint name universes, plus the constructor keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Term,
    Type,
    Constructor,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Term => write!(f, "term"),
            Namespace::Type => write!(f, "type"),
            Namespace::Constructor => write!(f, "constructor"),
        }
    }
}

/// Errors raised by the frontend passes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Two definitions share a name in the same namespace.
    #[error("duplicate {namespace} definition `{name}`")]
    Duplicate { namespace: Namespace, name: String },

    /// The program has no module header.
    #[error("program has no module declaration")]
    MissingModule,

    /// More than one module header.
    #[error("duplicate module declaration `{name}`")]
    DuplicateModule { name: String },

    /// A match with no arms.
    #[error("match expression has no arms")]
    MatchEmpty,

    /// An arm names a constructor not in the symbol table.
    #[error("unknown constructor `{ctor}` in match arm")]
    UnknownConstructor { ctor: String },

    /// Arms target more than one data type.
    #[error("match arms target both `{expected}` and `{found}`")]
    MismatchedDataType { expected: String, found: String },

    /// A constructor resolves to a data name with no declaration.
    #[error("constructor resolves to `{data}`, which has no data declaration")]
    MissingDataDefinition { data: String },

    /// Two arms name the same constructor.
    #[error("duplicate match arm for constructor `{ctor}`")]
    DuplicateArm { ctor: String },

    /// Arms do not cover every declared constructor.
    #[error("non-exhaustive match; missing {}", .missing.join(", "))]
    NonExhaustive { missing: Vec<String> },

    /// An arm binds a different number of parameters than the constructor
    /// declares fields.
    #[error("arm for `{ctor}` binds {found} parameters but the constructor has {expected} fields")]
    ArityMismatch {
        ctor: String,
        expected: usize,
        found: usize,
    },

    /// A term reference not in the symbol table and not imported.
    #[error("unresolved external term `{name}`")]
    UnresolvedTerm { name: String },

    /// A type reference not in the symbol table and not imported.
    #[error("unresolved external type `{name}`")]
    UnresolvedType { name: String },

    /// The resolver's pass bound was exhausted, which indicates a
    /// dependency cycle not marked recursive.
    #[error("resolution did not reach a fixed point within {passes} passes")]
    FixpointOverflow { passes: usize },
}

impl Error {
    /// The stage this error kind is raised at.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Duplicate { .. } | Error::MissingModule | Error::DuplicateModule { .. } => {
                Stage::Index
            }
            Error::MatchEmpty
            | Error::UnknownConstructor { .. }
            | Error::MismatchedDataType { .. }
            | Error::MissingDataDefinition { .. }
            | Error::DuplicateArm { .. }
            | Error::NonExhaustive { .. }
            | Error::ArityMismatch { .. } => Stage::Elaborate,
            Error::UnresolvedTerm { .. }
            | Error::UnresolvedType { .. }
            | Error::FixpointOverflow { .. } => Stage::Resolve,
        }
    }
}

/// A staged error plus the context needed to point at the offender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: Error,
    /// The term the error was detected in, when one exists.
    pub term: Option<ValueRef>,
    /// Unresolved term names, for resolve-stage failures.
    pub unresolved_terms: Vec<String>,
    /// Unresolved type names, for resolve-stage failures.
    pub unresolved_types: Vec<String>,
    /// A prior diagnostic this one wraps.
    pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
    pub fn new(error: Error) -> Self {
        Diagnostic {
            error,
            term: None,
            unresolved_terms: Vec::new(),
            unresolved_types: Vec::new(),
            cause: None,
        }
    }

    pub fn with_term(mut self, term: ValueRef) -> Self {
        self.term = Some(term);
        self
    }

    pub fn with_unresolved(mut self, terms: Vec<String>, types: Vec<String>) -> Self {
        self.unresolved_terms = terms;
        self.unresolved_types = types;
        self
    }

    pub fn caused_by(mut self, cause: Diagnostic) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn stage(&self) -> Stage {
        self.error.stage()
    }
}

impl From<Error> for Diagnostic {
    fn from(error: Error) -> Self {
        Diagnostic::new(error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage(), self.error)?;
        if let Some(term) = &self.term {
            write!(f, "\n  in term: {term}")?;
        }
        if !self.unresolved_terms.is_empty() {
            write!(f, "\n  unresolved terms: {}", self.unresolved_terms.join(", "))?;
        }
        if !self.unresolved_types.is_empty() {
            write!(f, "\n  unresolved types: {}", self.unresolved_types.join(", "))?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "\n  caused by: {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}
