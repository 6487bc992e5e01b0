use super::*;
use pretty_assertions::assert_eq;

use crate::errors::EvalErrorKind;

#[test]
fn test_parse_simple_name() {
    let interner = StringInterner::new();
    let name = UnboundName::parse(&interner, "x").unwrap();
    assert_eq!(name.symbol.as_str(), "x");
    assert!(name.path.is_none());
}

#[test]
fn test_parse_absolute_path() {
    let interner = StringInterner::new();
    let name = UnboundName::parse(&interner, "a::b::x").unwrap();
    let path = name.path.clone().unwrap();
    assert!(!path.relative);
    let segments: Vec<&str> = path.segments.iter().map(|s| s.as_str()).collect();
    assert_eq!(segments, vec!["a", "b"]);
    assert_eq!(name.symbol.as_str(), "x");
    assert_eq!(name.to_string(), "a::b::x");
}

#[test]
fn test_parse_relative_path() {
    let interner = StringInterner::new();
    let name = UnboundName::parse(&interner, "::a::x").unwrap();
    assert!(name.path.as_ref().is_some_and(|p| p.relative));
    assert_eq!(name.to_string(), "::a::x");
}

#[test]
fn test_parse_rejects_empty_parts() {
    let interner = StringInterner::new();
    let err = UnboundName::parse(&interner, "a::").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidNamePath { .. }));
    let err = UnboundName::parse(&interner, "a::::b").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidNamePath { .. }));
}

#[test]
fn test_variable_kind_follows_lead() {
    assert_eq!(Variable::kind_for("x"), VariableKind::Plain);
    assert_eq!(Variable::kind_for("^xs"), VariableKind::Injecting);
    assert_eq!(Variable::kind_for("!x"), VariableKind::Productive);
    // a lone lead is an ordinary name
    assert_eq!(Variable::kind_for("^"), VariableKind::Plain);
    assert_eq!(Variable::kind_for("!1"), VariableKind::Plain);
}

#[test]
fn test_sink_target() {
    assert_eq!(sink_target("|x"), Some("x"));
    assert_eq!(sink_target("|^xs"), Some("^xs"));
    assert_eq!(sink_target("|!x"), Some("!x"));
    assert_eq!(sink_target("|"), None);
    assert_eq!(sink_target("|1"), None);
    assert_eq!(sink_target("x"), None);
}

#[test]
fn test_pipe_sink_needs_simple_name() {
    let interner = StringInterner::new();
    assert!(UnboundName::parse(&interner, "|x").unwrap().is_pipe_sink());
    assert!(!UnboundName::parse(&interner, "x").unwrap().is_pipe_sink());
}

#[test]
fn test_sink_reader_is_ordinary_variable() {
    let interner = StringInterner::new();
    let sym = interner.intern("^xs");
    let sink = Variable::sink(sym, PipeId::new(3), 1);
    assert_eq!(sink.kind, VariableKind::Sink);
    let reader = sink.reader();
    assert_eq!(reader.kind, VariableKind::Injecting);
    assert_eq!(reader.pipe, PipeId::new(3));
    assert_eq!(reader.index, 1);
}

#[test]
fn test_display_variables() {
    let interner = StringInterner::new();
    let sym = interner.intern("x");
    let sink = Name::Variable(Variable::sink(sym, PipeId::new(0), 0));
    assert_eq!(sink.to_string(), "|x");
    let plain = Name::Variable(Variable::new(sym, PipeId::new(0), 0));
    assert_eq!(plain.to_string(), "x");
    assert_eq!(plain.symbol(), sym);
}
