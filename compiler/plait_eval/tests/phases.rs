//! End-to-end scenarios through the public API: source in, rendered value
//! or error out.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

mod common;

use common::Engine;
use plait_eval::{EvalErrorKind, Node, NodeKind};
use pretty_assertions::assert_eq;

#[test]
fn collapsing_rules() {
    let mut e = Engine::new();
    assert_eq!(e.show("[]"), "()");
    assert_eq!(e.show("[7]"), "7");
    assert_eq!(e.show("[[1 2]]"), "[ 1 2 ]");
    assert_eq!(e.show("[1 [2 3]]"), "[ 1 [ 2 3 ] ]");
}

#[test]
fn operators_group_by_precedence() {
    let mut e = Engine::new();
    assert_eq!(e.show("(1 + 2 * 3)"), "7");
    assert_eq!(e.show("(2 * 3 + 1)"), "7");
    assert_eq!(e.show("(10 - 4 - 3)"), "3");
}

#[test]
fn user_operators_follow_declared_precedence() {
    let mut e = Engine::new();
    e.bind("(define A ((pipeline 10 (#nparms 2 1)) (prim #operators #subtract)))")
        .unwrap();
    e.bind("(define B ((pipeline 5 (#nparms 2 1)) (prim #operators #multiply)))")
        .unwrap();
    assert_eq!(e.show("(10 A 4 B 2)"), "2");
}

#[test]
fn partial_application_is_filled_later() {
    let mut e = Engine::new();
    let step = e.reduce("(+ 2)").unwrap();
    assert!(matches!(step.kind(), NodeKind::Step(_)));
    let filled = step.step_with(&mut e.ctx, &Node::int(5)).unwrap();
    assert_eq!(e.ctx.reduce(&filled).unwrap().to_string(), "7");
}

#[test]
fn arguments_are_single_assignment_per_call() {
    let mut e = Engine::new();
    e.bind("(define sq ((pipeline (#args n)) (n * n)))").unwrap();
    assert_eq!(e.show("(sq 3)"), "9");
    assert_eq!(e.show("(sq 4)"), "16");
    assert_eq!(e.show("((sq 2) + (sq 3))"), "13");
}

#[test]
fn every_bind_problem_is_reported() {
    let mut e = Engine::new();
    let err = e.bind("(a b c)").unwrap_err();
    assert!(err.is_bind_aggregate());
    assert_eq!(err.related.len(), 3);
    assert!(err
        .related
        .iter()
        .all(|r| matches!(r.kind, EvalErrorKind::NameNotFound { .. })));
}

#[test]
fn definitions_persist_across_phases() {
    let mut e = Engine::new();
    e.bind("(define base 40)").unwrap();
    assert_eq!(e.show("(base + 2)"), "42");
    e.bind("(undefine base)").unwrap();
    assert!(e.bind("(base + 2)").is_err());
}

#[test]
fn print_goes_to_configured_handler() {
    let mut e = Engine::new();
    e.reduce("(print (1 + 1) #done)").unwrap();
    assert_eq!(e.output(), "2\n#done\n");
}

#[test]
fn errors_convert_to_diagnostics() {
    let mut e = Engine::new();
    let err = e.reduce("(1 / 0)").unwrap_err();
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, err.code());
}

#[test]
fn forked_contexts_share_definitions() {
    let mut e = Engine::new();
    e.bind("(define shared 1)").unwrap();
    let mut fork = e.ctx.fork();
    let node = e.read("(shared + 1)").unwrap();
    let bound = fork.bind(&node).unwrap();
    assert_eq!(fork.reduce(&bound).unwrap().to_string(), "2");
}
