//! Staged facade over the frontend passes.
//!
//! Ownership flows through the stages: `Frontend::index` builds the symbol
//! table, `Indexed::elaborate` rewrites definition bodies,
//! `Elaborated::resolve` inlines cross-definition references. Each stage
//! exposes the program and symbol table it carries.

use triplang_core::Program;

use crate::Result;
use crate::analyze::SymbolTable;
use crate::elaborate::elaborate_program;
use crate::resolve::resolve_program;

pub struct Frontend;

impl Frontend {
    /// Index the program's definitions, failing on duplicate names or a
    /// missing module header.
    pub fn index(program: Program) -> Result<Indexed> {
        let symbols = SymbolTable::build(&program)?;
        Ok(Indexed { program, symbols })
    }

    /// One-call pipeline: index, elaborate, resolve.
    pub fn run(program: Program) -> Result<Resolved> {
        Self::index(program)?.elaborate()?.resolve()
    }
}

/// A program with its symbol table built.
pub struct Indexed {
    program: Program,
    symbols: SymbolTable,
}

impl Indexed {
    pub fn elaborate(self) -> Result<Elaborated> {
        let program = elaborate_program(&self.program, &self.symbols)?;
        // The resolver inlines definition bodies out of the table, so the
        // table must hold the elaborated ones.
        let symbols = SymbolTable::build(&program)?;
        Ok(Elaborated { program, symbols })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

/// A program whose bodies are elaborated: no match nodes remain, and
/// ambiguous applications are settled.
pub struct Elaborated {
    program: Program,
    symbols: SymbolTable,
}

impl Elaborated {
    pub fn resolve(self) -> Result<Resolved> {
        let program = resolve_program(&self.program, &self.symbols)?;
        Ok(Resolved {
            program,
            symbols: self.symbols,
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

/// A fully resolved program: no external references remain except
/// declared imports and nominal declaration names.
#[derive(Debug)]
pub struct Resolved {
    program: Program,
    symbols: SymbolTable,
}

impl Resolved {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_program(self) -> Program {
        self.program
    }
}
