use super::*;
use pretty_assertions::assert_eq;

use crate::config::EngineConfig;
use crate::node::{DataKind, NodeKind};
use plait_diagnostic::ErrorCode;

fn builder() -> ExpressionBuilder {
    let runtime = Runtime::new(EngineConfig::testing()).unwrap();
    ExpressionBuilder::new(&runtime)
}

fn sp(start: u32, end: u32) -> Span {
    Span::new(start, end)
}

#[test]
fn test_empty_list_is_nil() {
    let mut b = builder();
    b.open(ExprKind::Prod, sp(0, 1));
    b.close(ExprKind::Prod, sp(1, 2)).unwrap();
    let nodes = b.finish().unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].is_nil());
}

#[test]
fn test_single_atom_collapses() {
    let mut b = builder();
    b.open(ExprKind::Data, sp(0, 1));
    b.number(Number::Int32(4), sp(1, 2));
    b.close(ExprKind::Data, sp(2, 3)).unwrap();
    let nodes = b.finish().unwrap();
    assert!(matches!(nodes[0].kind(), NodeKind::Number(Number::Int32(4))));
}

#[test]
fn test_trivial_children_give_data() {
    let mut b = builder();
    b.open(ExprKind::Prod, sp(0, 1));
    b.number(Number::Int32(1), sp(1, 2));
    b.string("two", sp(3, 8));
    b.symbol("three", sp(9, 15));
    b.close(ExprKind::Prod, sp(15, 16)).unwrap();
    let nodes = b.finish().unwrap();
    assert!(matches!(nodes[0].kind(), NodeKind::Data(DataKind::Trivial, _)));
    assert_eq!(nodes[0].span(), sp(0, 16));
    assert_eq!(nodes[0].to_string(), "[ 1 \"two\" #three ]");
}

#[test]
fn test_names_give_expression_of_bracket_kind() {
    let mut b = builder();
    b.open(ExprKind::Data, sp(0, 1));
    b.name("a", sp(1, 2)).unwrap();
    b.number(Number::Int32(1), sp(3, 4));
    b.close(ExprKind::Data, sp(4, 5)).unwrap();
    b.open(ExprKind::Prod, sp(6, 7));
    b.name("b", sp(7, 8)).unwrap();
    b.close(ExprKind::Prod, sp(8, 9)).unwrap();
    let nodes = b.finish().unwrap();
    assert!(matches!(nodes[0].kind(), NodeKind::Expr(ExprKind::Data, _)));
    assert!(matches!(nodes[1].kind(), NodeKind::Expr(ExprKind::Prod, _)));
}

#[test]
fn test_nested_lists_report_depth() {
    let mut b = builder();
    b.open(ExprKind::Prod, sp(0, 1));
    b.open(ExprKind::Data, sp(1, 2));
    assert_eq!(b.depth(), 2);
    b.close(ExprKind::Data, sp(2, 3)).unwrap();
    assert_eq!(b.depth(), 1);
    b.close(ExprKind::Prod, sp(3, 4)).unwrap();
    assert_eq!(b.depth(), 0);
}

#[test]
fn test_close_without_open() {
    let mut b = builder();
    let err = b.close(ExprKind::Prod, sp(0, 1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E7001);
    assert_eq!(err.message, "Missing start of expression");
    assert_eq!(err.span, Some(sp(0, 1)));
}

#[test]
fn test_mismatched_close() {
    let mut b = builder();
    b.open(ExprKind::Prod, sp(0, 1));
    let err = b.close(ExprKind::Data, sp(1, 2)).unwrap_err();
    assert_eq!(err.message, "Mismatching brackets");
}

#[test]
fn test_unclosed_list() {
    let mut b = builder();
    b.open(ExprKind::Prod, sp(0, 1));
    b.open(ExprKind::Prod, sp(1, 2));
    b.number(Number::Int32(1), sp(2, 3));
    b.close(ExprKind::Prod, sp(3, 4)).unwrap();
    let err = b.finish().unwrap_err();
    assert_eq!(err.message, "Missing end of expression");
    assert_eq!(err.span, Some(sp(0, 1)));
}

#[test]
fn test_bad_name_path() {
    let mut b = builder();
    assert!(b.name("a::::b", sp(0, 6)).is_err());
}
