//! Shared helpers for pass tests: terse program construction.

use triplang_core::{DataConstructor, DataDef, Definition, Program, Value, ValueRef};

use crate::analyze::SymbolTable;

pub fn module(name: &str) -> Definition {
    Definition::Module { name: name.into() }
}

pub fn poly(name: &str, term: ValueRef) -> Definition {
    Definition::Poly {
        name: name.into(),
        term,
        recursive: false,
    }
}

pub fn poly_rec(name: &str, term: ValueRef) -> Definition {
    Definition::Poly {
        name: name.into(),
        term,
        recursive: true,
    }
}

pub fn typed(name: &str, term: ValueRef) -> Definition {
    Definition::Typed {
        name: name.into(),
        term,
    }
}

pub fn untyped(name: &str, term: ValueRef) -> Definition {
    Definition::Untyped {
        name: name.into(),
        term,
    }
}

pub fn combinator(name: &str, term: ValueRef) -> Definition {
    Definition::Combinator {
        name: name.into(),
        term,
    }
}

pub fn type_def(name: &str, ty: ValueRef) -> Definition {
    Definition::Type {
        name: name.into(),
        ty,
    }
}

pub fn import(name: &str, from: &str) -> Definition {
    Definition::Import {
        name: name.into(),
        module: from.into(),
    }
}

pub fn export(name: &str) -> Definition {
    Definition::Export { name: name.into() }
}

/// `data Option T = Some T | None` — Some is declared first.
pub fn option_data() -> Definition {
    Definition::Data(DataDef {
        name: "Option".into(),
        type_params: vec!["T".into()],
        constructors: vec![
            DataConstructor {
                name: "Some".into(),
                fields: vec![Value::ty_var("T")],
            },
            DataConstructor {
                name: "None".into(),
                fields: vec![],
            },
        ],
    })
}

/// `data Bool = True | False`.
pub fn bool_data() -> Definition {
    Definition::Data(DataDef {
        name: "Bool".into(),
        type_params: vec![],
        constructors: vec![
            DataConstructor {
                name: "True".into(),
                fields: vec![],
            },
            DataConstructor {
                name: "False".into(),
                fields: vec![],
            },
        ],
    })
}

pub fn program(definitions: Vec<Definition>) -> Program {
    Program::new(definitions)
}

/// Build a symbol table, panicking on indexing errors.
pub fn table(program: &Program) -> SymbolTable {
    SymbolTable::build(program).expect("indexing should succeed")
}

/// Body of the named term definition in a program.
pub fn body_of<'p>(program: &'p Program, name: &str) -> &'p ValueRef {
    program
        .iter()
        .find(|d| d.name() == name && d.term().is_some())
        .and_then(Definition::term)
        .expect("definition should exist")
}
