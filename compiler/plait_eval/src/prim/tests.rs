use super::*;
use pretty_assertions::assert_eq;

use crate::errors::EvalErrorKind;
use crate::node::NodeKind;
use crate::number::Number;
use crate::test_helpers::Session;

fn int(node: &Node) -> Option<i32> {
    match node.kind() {
        NodeKind::Number(Number::Int32(v)) => Some(*v),
        _ => None,
    }
}

#[test]
fn test_table_covers_both_classes() {
    let table = primitive_table();
    assert_eq!(table.len(), 25);
    assert!(table.contains_key(&(CORE, "push-public-namespace")));
    assert!(table.contains_key(&(OPERATORS, "negate")));
}

// List access

#[test]
fn test_head_and_end() {
    let mut s = Session::new();
    assert_eq!(s.show("(head [1 2 3])"), "1");
    assert_eq!(s.show("(end [1 2 3])"), "3");
}

#[test]
fn test_tail_and_front() {
    let mut s = Session::new();
    assert_eq!(s.show("(tail [1 2 3])"), "[ 2 3 ]");
    assert_eq!(s.show("(front [1 2 3])"), "[ 1 2 ]");
    assert_eq!(s.show("(tail [1 2])"), "2");
}

#[test]
fn test_list_access_maps_over_parameters() {
    let mut s = Session::new();
    assert_eq!(s.show("(head [1 2] [3 4])"), "[ 1 3 ]");
}

#[test]
fn test_append() {
    let mut s = Session::new();
    assert_eq!(s.show("(append [1 2] 3 [4 5])"), "[ 1 2 3 4 5 ]");
    assert_eq!(s.show("(append [1 2])"), "[ 1 2 ]");
}

// Arithmetic

#[test]
fn test_precedence_groups_products_first() {
    let mut s = Session::new();
    assert_eq!(int(&s.reduce("(1 + 2 * 3)").unwrap()), Some(7));
    assert_eq!(int(&s.reduce("(2 * 3 + 1)").unwrap()), Some(7));
}

#[test]
fn test_equal_precedence_runs_left_to_right() {
    let mut s = Session::new();
    assert_eq!(int(&s.reduce("(10 - 4 - 2)").unwrap()), Some(4));
    assert_eq!(int(&s.reduce("(20 / 2 % 3)").unwrap()), Some(1));
}

#[test]
fn test_single_operand_uses_zero_value() {
    let mut s = Session::new();
    assert_eq!(int(&s.reduce("((prim #operators #subtract) 5)").unwrap()), Some(-5));
    assert_eq!(int(&s.reduce("((prim #operators #add) 5)").unwrap()), Some(5));
}

#[test]
fn test_negate() {
    let mut s = Session::new();
    assert_eq!(int(&s.reduce("(neg 5)").unwrap()), Some(-5));
    assert_eq!(s.show("(neg true)"), s.show("false"));
}

#[test]
fn test_text_concatenation() {
    let mut s = Session::new();
    assert_eq!(s.show("(\"a\" + 1)"), "\"a1\"");
    assert_eq!(s.show("(1 + \"a\")"), "\"1a\"");
}

#[test]
fn test_data_arithmetic_is_element_wise() {
    let mut s = Session::new();
    assert_eq!(s.show("([1 2] + 1)"), "[ 2 3 ]");
}

#[test]
fn test_division_by_zero() {
    let mut s = Session::new();
    let err = s.reduce("(1 / 0)").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DivisionByZero));
}

// Definitions

#[test]
fn test_define_binds_in_current_namespace() {
    let mut s = Session::new();
    assert_eq!(int(&s.reduce("(define x 5)").unwrap()), Some(5));
    assert_eq!(int(&s.reduce("(x * 2)").unwrap()), Some(10));
    assert!(s.runtime.core().check_local_bind(s.runtime.intern("x")));
}

#[test]
fn test_define_needs_two_parameters() {
    let mut s = Session::new();
    assert!(s.bind("(define x)").is_err());
}

#[test]
fn test_define_duplicate_fails() {
    let mut s = Session::new();
    s.bind("(define x 1)").unwrap();
    let err = s.bind("(define x 2)").unwrap_err();
    assert!(err.is_bind_aggregate());
    assert!(err
        .related
        .iter()
        .any(|e| matches!(e.kind, EvalErrorKind::DuplicateName { .. })));
    assert_eq!(s.show("x"), "1");
}

#[test]
fn test_private_definition_shadows_without_altering_outer() {
    let mut s = Session::new();
    s.bind("(define x 1)").unwrap();
    assert_eq!(s.show("(push-private-namespace (define x 2) x)"), "[ 2 2 ]");
    assert_eq!(s.show("x"), "1");
    assert!(s.ctx.private_namespace().is_none());
}

#[test]
fn test_undefine() {
    let mut s = Session::new();
    s.bind("(define u 1)").unwrap();
    let removed = s.reduce("(undefine u)").unwrap();
    assert!(removed.as_namespace().is_some_and(|ns| ns.is_root()));
    assert!(!s.runtime.core().check_local_bind(s.runtime.intern("u")));
    assert!(s.reduce("(undefine u)").unwrap().is_nil());
}

// Namespaces

#[test]
fn test_namespace_answers_current() {
    let mut s = Session::new();
    let ns = s.reduce("(namespace)").unwrap();
    assert!(ns.as_namespace().is_some_and(|ns| ns.is_root()));
}

#[test]
fn test_new_namespace_under_core() {
    let mut s = Session::new();
    let created = s.reduce("(new-namespace foo)").unwrap();
    let foo = created.as_namespace().cloned().unwrap();
    assert!(foo.is_public());
    assert!(foo.parent().is_some_and(|p| p.is_root()));

    let again = s.reduce("(new-namespace foo)").unwrap();
    assert!(again.as_namespace().is_some_and(|ns| ns.same(&foo)));

    let parent = s.reduce("(parent-namespace foo)").unwrap();
    assert!(parent.as_namespace().is_some_and(|ns| ns.is_root()));
}

#[test]
fn test_new_local_namespace() {
    let mut s = Session::new();
    let created = s.reduce("(new-local-namespace loc)").unwrap();
    assert!(created.as_namespace().is_some_and(|ns| ns.is_local()));
}

#[test]
fn test_new_namespace_rejects_too_many_parameters() {
    let mut s = Session::new();
    assert!(s.bind("(new-namespace a b c)").is_err());
}

#[test]
fn test_set_namespace_redirects_definitions() {
    let mut s = Session::new();
    s.bind("(new-namespace foo)").unwrap();
    s.bind("(set-namespace foo)").unwrap();
    s.bind("(define y 3)").unwrap();
    assert_eq!(s.show("foo::y"), "3");
    assert!(!s.runtime.core().check_local_bind(s.runtime.intern("y")));
    assert!(s.ctx.public_namespace().parent().is_some());
}

#[test]
fn test_push_public_namespace_restores_previous() {
    let mut s = Session::new();
    s.bind("(new-namespace foo)").unwrap();
    assert_eq!(s.show("(push-public-namespace foo (define z 4))"), "4");
    assert_eq!(s.show("foo::z"), "4");
    assert!(s.ctx.public_namespace().is_root());
}

#[test]
fn test_push_public_namespace_needs_a_namespace() {
    let mut s = Session::new();
    s.bind("(define n 1)").unwrap();
    assert!(s.bind("(push-public-namespace n (define z 4))").is_err());
    assert!(s.ctx.public_namespace().is_root());
}

// Printing

#[test]
fn test_print_writes_one_line_per_parameter() {
    let mut s = Session::new();
    let result = s.reduce("(print 1 \"a\")").unwrap();
    assert!(result.is_nil());
    assert_eq!(s.output(), "1\n\"a\"\n");
}
