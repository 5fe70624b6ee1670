use triplang_core::Value;

use crate::error::{Diagnostic, Error, Stage};

#[test]
fn message_leads_with_the_stage() {
    let diag = Diagnostic::new(Error::MatchEmpty);
    assert_eq!(diag.to_string(), "elaborate error: match expression has no arms");
}

#[test]
fn payload_lines_follow_the_message() {
    let diag = Diagnostic::new(Error::UnresolvedTerm { name: "foo".into() })
        .with_term(Value::app(Value::poly_var("foo"), Value::poly_var("1")))
        .with_unresolved(vec!["foo".into()], vec!["Ghost".into()]);
    let rendered = diag.to_string();
    assert_eq!(
        rendered,
        "resolve error: unresolved external term `foo`\n  \
         in term: (foo 1n)\n  \
         unresolved terms: foo\n  \
         unresolved types: Ghost"
    );
}

#[test]
fn causes_nest_into_the_message() {
    let inner = Diagnostic::new(Error::UnknownConstructor { ctor: "Sum".into() });
    let outer = Diagnostic::new(Error::UnresolvedTerm { name: "f".into() }).caused_by(inner);
    let rendered = outer.to_string();
    assert!(rendered.contains("caused by: elaborate error: unknown constructor `Sum`"));

    let source = std::error::Error::source(&outer).expect("cause is the source");
    assert!(source.to_string().contains("Sum"));
}

#[test]
fn missing_constructor_lists_read_naturally() {
    let err = Error::NonExhaustive {
        missing: vec!["Some".into(), "None".into()],
    };
    assert_eq!(err.to_string(), "non-exhaustive match; missing Some, None");
    assert_eq!(err.stage(), Stage::Elaborate);
}

#[test]
fn errors_convert_into_bare_diagnostics() {
    let diag: Diagnostic = Error::MissingModule.into();
    assert_eq!(diag.stage(), Stage::Index);
    assert!(diag.term.is_none());
}
