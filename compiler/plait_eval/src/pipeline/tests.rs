use super::*;
use pretty_assertions::assert_eq;

use plait_ir::{Span, StringInterner};

use crate::errors::EvalErrorKind;
use crate::test_helpers::Session;

fn signature(opts: PipeOptions) -> PipeSignature {
    PipeSignature::new(PipeId::new(1), false, opts)
}

fn header(sig: &PipeSignature) -> String {
    let mut out = String::new();
    sig.render_header(&mut out);
    out
}

fn ints(vs: &[i32]) -> Vec<Node> {
    vs.iter().map(|&v| Node::int(v)).collect()
}

/// `+`-like pipeline: two parameters, one taken from the left.
fn infix() -> Arc<Pipeline> {
    let sig = signature(PipeOptions {
        precedence: Some(20),
        parm_count: Some(2),
        prefix_count: Some(1),
        ..PipeOptions::default()
    });
    Arc::new(Pipeline::new(Arc::new(sig), Elements::Empty, vec![], true))
}

fn pipe_node(p: &Arc<Pipeline>) -> Node {
    Node::new(NodeKind::Pipeline(Arc::clone(p)), Span::DUMMY)
}

#[test]
fn test_signature_defaults() {
    let sig = signature(PipeOptions::default());
    assert_eq!(sig.precedence, DEFAULT_PRECEDENCE);
    assert!(!sig.has_args());
    assert_eq!(sig.parm_count, None);
    assert_eq!(header(&sig), "pipeline 100");
}

#[test]
fn test_args_fix_parameter_count() {
    let i = StringInterner::new();
    let sig = signature(PipeOptions {
        args: vec![i.intern("a"), i.intern("b")],
        ..PipeOptions::default()
    });
    assert_eq!(sig.parm_count, Some(2));
    assert_eq!(sig.vars.len(), 2);
    assert_eq!(sig.vars[&i.intern("b")].index, 1);
    assert_eq!(header(&sig), "pipeline 100 (#args a b)");
}

#[test]
fn test_vargs_leave_count_open() {
    let i = StringInterner::new();
    let sig = signature(PipeOptions {
        args: vec![i.intern("a")],
        vargs: Some(i.intern("rest")),
        vargs_flag: true,
        ..PipeOptions::default()
    });
    assert_eq!(sig.parm_count, None);
    assert!(sig.has_vargs());
    assert_eq!(header(&sig), "pipeline 100 (#args a) (#vargs rest)");
}

#[test]
fn test_binding_header_has_no_precedence() {
    let sig = PipeSignature::new(
        PipeId::new(1),
        true,
        PipeOptions {
            parm_count: Some(2),
            ..PipeOptions::default()
        },
    );
    assert_eq!(header(&sig), "bindpipe (#nparms 2)");
}

#[test]
fn test_infix_header() {
    assert_eq!(header(infix().signature()), "pipeline 20 (#nparms 2 1)");
}

#[test]
fn test_binding_pipelines_are_not_productive() {
    let sig = PipeSignature::new(PipeId::new(1), true, PipeOptions::default());
    let p = Pipeline::new(Arc::new(sig), Elements::Empty, vec![], true);
    assert_eq!(p.precedence(), None);
    assert!(infix().precedence().is_some());
    assert!(!infix().has_vars());
}

#[test]
fn test_append_extends_body() {
    let p = infix().append(&Node::int(1));
    assert_eq!(p.body().len(), 1);
    assert_eq!(p.id(), infix().signature().id);
}

// Parameter mapping

#[test]
fn test_map_execute_takes_prefix_and_rest() {
    let p = infix();
    let es = vec![Node::int(1), pipe_node(&p), Node::int(2)];
    let map = map_execute(&p, &es, 1, 0, 2).unwrap();
    assert_eq!(map.parms.len(), 2);
    assert_eq!(map.elements.len(), 1);
    assert_eq!(map.iep, 0);
}

#[test]
fn test_map_execute_needs_prefix() {
    let p = infix();
    let es = vec![pipe_node(&p), Node::int(2)];
    let err = map_execute(&p, &es, 0, 0, 1).err().unwrap();
    assert!(matches!(err.kind, EvalErrorKind::InsufficientPrefixParameters));
}

#[test]
fn test_map_execute_trims_surplus_prefix() {
    let p = infix();
    let mut es = ints(&[7, 1]);
    es.push(pipe_node(&p));
    es.push(Node::int(2));
    let map = map_execute(&p, &es, 2, 0, 3).unwrap();
    let parms: Vec<String> = map.parms.iter().map(ToString::to_string).collect();
    assert_eq!(parms, vec!["1", "2"]);
    // 7 stays in front of the evaluator slot
    assert_eq!(map.elements.len(), 2);
    assert_eq!(map.iep, 1);
}

#[test]
fn test_map_step_makes_step_for_missing_operand() {
    let p = infix();
    let es = vec![pipe_node(&p), Node::int(2)];
    let map = map_step(&p, &es, 0).unwrap();
    let step = map.prod.as_step().cloned().unwrap();
    assert_eq!(step.holes(), 1);
    assert!(step.template()[0].is_none());
}

#[test]
fn test_map_step_rejects_surplus_prefix() {
    let p = infix();
    let mut es = ints(&[1, 2]);
    es.push(pipe_node(&p));
    let err = map_step(&p, &es, 2).err().unwrap();
    assert!(matches!(err.kind, EvalErrorKind::TooManyPrefixParameters));
}

#[test]
fn test_none_parameter_is_a_hole() {
    let p = infix();
    let es = vec![Node::none(), pipe_node(&p), Node::int(2)];
    let map = map_step(&p, &es, 1).unwrap();
    assert!(map.prod.is_step());
}

// Running

#[test]
fn test_body_stages_chain() {
    let mut s = Session::new();
    // the tail becomes the parameter list of neg
    s.bind("(define negtail ((pipeline) tail neg))").unwrap();
    assert_eq!(s.show("(negtail [1 2 3])"), "[ -2 -3 ]");
}

#[test]
fn test_empty_body_answers_parameters() {
    let mut s = Session::new();
    s.bind("(define same ((pipeline)))").unwrap();
    assert_eq!(s.show("(same 1 2)"), "[ 1 2 ]");
    assert_eq!(s.show("(same [1 2])"), "[ [ 1 2 ] ]");
}

#[test]
fn test_pipe_sink_stores_parameters() {
    let mut s = Session::new();
    s.bind("(define twice ((pipeline) |x (x + x)))").unwrap();
    assert_eq!(s.show("(twice 4)"), "8");
    assert_eq!(s.show("(twice 5)"), "10");
}

#[test]
fn test_duplicate_sink_fails() {
    let mut s = Session::new();
    assert!(s.bind("(define bad ((pipeline) |x |x))").is_err());
}

#[test]
fn test_user_binding_pipeline_sees_raw_names() {
    let mut s = Session::new();
    s.bind("(define quote ((bindpipe (#nparms 1)) (prim #core #undefine)))")
        .unwrap();
    s.bind("(define gone 1)").unwrap();
    s.bind("(quote gone)").unwrap();
    assert!(!s.runtime.core().check_local_bind(s.runtime.intern("gone")));
}
