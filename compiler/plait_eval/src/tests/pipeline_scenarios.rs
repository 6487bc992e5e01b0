//! Pipelines declared in source and called from expressions.

use pretty_assertions::assert_eq;

use crate::errors::EvalErrorKind;
use crate::node::Node;
use crate::test_helpers::Session;

#[test]
fn test_vargs_alone_collects_every_parameter() {
    let mut s = Session::new();
    s.bind("(define all ((pipeline (#vargs rest)) rest))").unwrap();
    assert_eq!(s.show("(all 1 2 3)"), "[ 1 2 3 ]");
}

#[test]
fn test_args_then_vargs() {
    let mut s = Session::new();
    s.bind("(define first ((pipeline (#args a) (#vargs rest)) a))").unwrap();
    s.bind("(define others ((pipeline (#args a) (#vargs rest)) rest))").unwrap();
    assert_eq!(s.show("(first 1 2 3)"), "1");
    assert_eq!(s.show("(others 1 2 3)"), "[ 2 3 ]");
}

#[test]
fn test_stages_feed_sinks() {
    let mut s = Session::new();
    s.bind("(define avg2 ((pipeline (#args a b)) (a + b) |s (s / 2)))")
        .unwrap();
    assert_eq!(s.show("(avg2 4 6)"), "5");
    assert_eq!(s.show("(avg2 10 20)"), "15");
}

#[test]
fn test_pipeline_inside_operator_expression() {
    let mut s = Session::new();
    s.bind("(define sq ((pipeline (#args n)) (n * n)))").unwrap();
    assert_eq!(s.show("((sq 3) + (sq 4))"), "25");
    assert_eq!(s.show("[(sq 2) (sq 5)]"), "[ 4 25 ]");
}

#[test]
fn test_short_lone_call_is_a_step() {
    let mut s = Session::new();
    s.bind("(define pair ((pipeline (#args a b)) (a + b)))").unwrap();
    let step = s.reduce("(pair 1)").unwrap();
    assert_eq!(step.as_step().map(|st| st.holes()), Some(1));
    let filled = step.step_with(&mut s.ctx, &Node::int(6)).unwrap();
    assert_eq!(s.ctx.reduce(&filled).unwrap().to_string(), "7");
}

#[test]
fn test_wrong_arity_is_reported_at_call() {
    let mut s = Session::new();
    // groups before `+`, so it competes for its parameters
    s.bind("(define pair ((pipeline 5 (#args a b)) a))").unwrap();
    let err = s.reduce("(pair 1 + 2)").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InsufficientParameters));
}

#[test]
fn test_user_infix_operator() {
    let mut s = Session::new();
    s.bind("(define avg ((pipeline 20 (#nparms 2 1) (#args a b)) ((a + b) / 2)))")
        .unwrap();
    assert_eq!(s.show("(4 avg 8)"), "6");
}

#[test]
fn test_partial_application_inside_pipeline_body() {
    let mut s = Session::new();
    s.bind("(define add3 ((pipeline) (+ 3)))").unwrap();
    assert_eq!(s.show("(add3 4)"), "7");
}

#[test]
fn test_ristic_declared_from_pipeline_argument() {
    let mut s = Session::new();
    // `x` has no value while `mk` is declared; the declaration waits for a call
    s.bind("(define mk ((pipeline (#args x)) (.ristic x #data)))")
        .unwrap();
    assert_eq!(s.show("(mk #mydata)"), "mydata");
    assert_eq!(s.show("((mydata) 1 2)"), "[ 1 2 ]");
}
