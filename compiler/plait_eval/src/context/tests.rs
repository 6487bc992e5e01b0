use super::*;
use pretty_assertions::assert_eq;

use crate::config::EngineConfig;
use crate::elements::Elements;
use crate::errors::{primitive_error, EvalErrorKind};
use crate::pipeline::{PipeOptions, Pipeline};
use crate::test_helpers::Session;

fn frame_for(ctx: &ExecutionContext, id: u64) -> Arc<Frame> {
    let opts = PipeOptions {
        args: vec![ctx.intern("a")],
        ..PipeOptions::default()
    };
    let sig = PipeSignature::new(PipeId::new(id), false, opts);
    let p = Pipeline::new(Arc::new(sig), Elements::Empty, vec![], true);
    Arc::new(Frame::new(&p, None, &Node::int(1)).unwrap())
}

fn related_kinds(err: &EvalError) -> Vec<&EvalErrorKind> {
    err.related.iter().map(|e| &e.kind).collect()
}

// Bind errors

#[test]
fn test_bind_collects_every_missing_name() {
    let mut s = Session::new();
    let err = s.bind("(a b c)").unwrap_err();
    assert!(err.is_bind_aggregate());
    assert_eq!(err.related.len(), 3);
    assert!(related_kinds(&err)
        .iter()
        .all(|k| matches!(k, EvalErrorKind::NameNotFound { .. })));
    // the next bind starts clean
    assert!(!s.ctx.has_bind_errors());
    assert!(s.bind("(1 + 2)").is_ok());
}

#[test]
fn test_soft_names_suspend_recording() {
    let mut s = Session::new();
    let node = s.read("nope");
    let bound = s.ctx.with_soft_names(|ctx| ctx.bind(&node)).unwrap();
    assert!(matches!(bound.kind(), NodeKind::Name(Name::Unbound(_))));

    let err = s.ctx.bind(&node).unwrap_err();
    assert!(matches!(
        related_kinds(&err)[..],
        [EvalErrorKind::NameNotFound { .. }]
    ));
}

#[test]
fn test_pipe_sink_is_not_a_missing_name() {
    let mut s = Session::new();
    let bound = s.bind("|x").unwrap();
    assert!(bound.name_symbol().is_some());
}

// Flow trail

#[test]
fn test_flow_errors_carry_the_trail() {
    let mut s = Session::new();
    let outer = s.read("(outer)");
    // distinct positions so the trail keeps both entries
    let inner = s.read("        (inner)");
    let err = s
        .ctx
        .with_flow(&outer, |ctx| {
            ctx.with_flow(&inner, |_| -> EvalResult<()> { Err(primitive_error("boom")) })
        })
        .unwrap_err();
    let trail = err.backtrace.unwrap();
    let labels: Vec<&str> = trail.frames().iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["( outer )", "( inner )"]);
    assert_eq!(s.ctx.flow_depth(), 0);
}

#[test]
fn test_flow_is_unwound_after_a_phase() {
    let mut s = Session::new();
    assert!(s.reduce("(1 / 0)").is_err());
    assert_eq!(s.ctx.flow_depth(), 0);
    assert_eq!(s.show("(1 + 1)"), "2");
}

#[test]
fn test_runtime_error_has_backtrace() {
    let mut s = Session::new();
    let err = s.reduce("(1 / 0)").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DivisionByZero));
    assert!(err.backtrace.is_some_and(|b| !b.is_empty()));
}

#[test]
fn test_flow_depth_is_limited() {
    let config = EngineConfig {
        max_flow_depth: 2,
        ..EngineConfig::testing()
    };
    let mut ctx = ExecutionContext::new(Runtime::new(config).unwrap());
    let n = Node::int(1);
    let err = ctx
        .with_flow(&n, |ctx| {
            ctx.with_flow(&n, |ctx| ctx.with_flow(&n, |_| Ok(())))
        })
        .unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::DepthExceeded { stack: "flow", limit: 2 }
    ));
}

// Frames

#[test]
fn test_frame_depth_is_limited() {
    let config = EngineConfig::testing().with_max_frame_depth(1);
    let mut ctx = ExecutionContext::new(Runtime::new(config).unwrap());
    ctx.push_frame(frame_for(&ctx, 1)).unwrap();
    let err = ctx.push_frame(frame_for(&ctx, 2)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DepthExceeded { stack: "frame", .. }));
    assert_eq!(ctx.frame_depth(), 1);
}

#[test]
fn test_popping_empty_frame_stack_fails() {
    let mut s = Session::new();
    let err = s.ctx.pop_frame().unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::StackUnderflow { .. }));
}

#[test]
fn test_scoped_frame_pops_on_drop() {
    let mut s = Session::new();
    let frame = frame_for(&s.ctx, 1);
    {
        let scoped = s.ctx.with_frame(frame).unwrap();
        assert_eq!(scoped.frame_depth(), 1);
        assert!(scoped.current_frame().is_some());
    }
    assert_eq!(s.ctx.frame_depth(), 0);
}

// Namespaces

#[test]
fn test_private_namespace_shadows_and_pops() {
    let mut s = Session::new();
    let x = s.ctx.intern("x");
    s.ctx.public_namespace().add_binding(x, Node::int(1)).unwrap();

    s.ctx.push_private_namespace();
    s.ctx.namespace().add_binding(x, Node::int(2)).unwrap();
    assert_eq!(s.show("x"), "2");

    s.ctx.pop_private_namespace().unwrap();
    assert!(s.ctx.private_namespace().is_none());
    assert_eq!(s.show("x"), "1");

    let err = s.ctx.pop_private_namespace().unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NamespaceOperation { .. }));
}

#[test]
fn test_with_private_namespace_restores_on_error() {
    let mut s = Session::new();
    let out: EvalResult<()> = s
        .ctx
        .with_private_namespace(|ctx| {
            assert!(ctx.private_namespace().is_some());
            Err(primitive_error("inside"))
        });
    assert!(out.is_err());
    assert!(s.ctx.private_namespace().is_none());
}

#[test]
fn test_fork_is_independent() {
    let mut s = Session::new();
    let mut fork = s.ctx.fork();
    let y = fork.intern("y");
    fork.push_private_namespace();
    fork.namespace().add_binding(y, Node::int(4)).unwrap();
    assert!(fork.defined_name(y, Span::DUMMY).is_some());
    assert!(s.ctx.defined_name(y, Span::DUMMY).is_none());

    // the public tree is shared
    let z = fork.intern("z");
    fork.public_namespace().add_binding(z, Node::int(5)).unwrap();
    assert_eq!(s.show("z"), "5");
}

// Paths

#[test]
fn test_absolute_and_relative_paths() {
    let mut s = Session::new();
    let created = s.reduce("(new-namespace foo)").unwrap();
    let foo = created.as_namespace().cloned().unwrap();
    foo.add_binding(s.ctx.intern("y"), Node::int(3)).unwrap();
    assert_eq!(s.show("foo::y"), "3");
    assert_eq!(s.show("::foo::y"), "3");
}

#[test]
fn test_missing_member_is_undefined() {
    let mut s = Session::new();
    s.reduce("(new-namespace foo)").unwrap();
    let node = s.read("foo::nope");
    let NodeKind::Name(Name::Unbound(name)) = node.kind() else {
        panic!("expected a name");
    };
    let found = s.ctx.lookup_name(name, node.span()).unwrap();
    assert!(matches!(found.kind(), NodeKind::Name(Name::Undefined(_))));
}

#[test]
fn test_path_through_non_namespace() {
    let mut s = Session::new();
    s.bind("(define x 5)").unwrap();
    let err = s.bind("x::y").unwrap_err();
    assert!(matches!(
        related_kinds(&err)[..],
        [EvalErrorKind::NotANamespace { .. }]
    ));
    let err = s.bind("missing::y").unwrap_err();
    assert!(matches!(
        related_kinds(&err)[..],
        [EvalErrorKind::NameNotFound { .. }]
    ));
}

#[test]
fn test_long_flow_labels_are_cut() {
    let long = "x".repeat(200);
    let label = flow_label(&Node::string(&long, Span::DUMMY));
    assert!(label.ends_with("..."));
    assert_eq!(label.len(), FLOW_LABEL_MAX + 3);
}
