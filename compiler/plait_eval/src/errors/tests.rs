use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_factory_sets_kind_and_message() {
    let err = duplicate_name("x");
    assert_eq!(err.message, "Name 'x' has already been defined");
    assert_eq!(err.code(), ErrorCode::E1002);
}

#[test]
fn test_with_span_ignores_dummy() {
    let err = too_many_parameters().with_span(Span::DUMMY);
    assert_eq!(err.span, None);
    let err = err.with_span(Span::new(2, 5)).or_span(Span::new(7, 9));
    assert_eq!(err.span, Some(Span::new(2, 5)));
}

#[test]
fn test_bind_aggregate_keeps_order() {
    let err = bind_aggregate(vec![
        name_not_found("a").with_span(Span::new(1, 2)),
        name_not_found("b"),
        name_not_found("c"),
    ]);
    assert!(err.is_bind_aggregate());
    assert_eq!(err.related.len(), 3);
    assert_eq!(err.message, "Binding failed with 3 errors");
    assert_eq!(err.span, Some(Span::new(1, 2)));
    let names: Vec<_> = err.related.iter().map(|e| e.message.clone()).collect();
    assert_eq!(
        names,
        vec![
            "Name 'a' not found".to_string(),
            "Name 'b' not found".to_string(),
            "Name 'c' not found".to_string()
        ]
    );
}

#[test]
fn test_to_diagnostic_nests_related() {
    let err = ristic_validation(
        "pipeline",
        vec![invalid_ristic_parameters("Option list is empty")],
    );
    let rendered = err.to_diagnostic().to_string();
    assert_eq!(
        rendered,
        "error[E5001]: Invalid 'pipeline' ristic: 1 validation errors\n  error[E5005]: Option list is empty\n"
    );
}

#[test]
fn test_flow_backtrace_collapses_same_position() {
    let frame = |label: &str, span: Span| FlowFrame {
        label: label.to_string(),
        span: Some(span),
    };
    let trace = FlowBacktrace::new(vec![
        frame("( 1 + x )", Span::new(0, 9)),
        frame("( 1 + x )", Span::new(0, 9)),
        frame("x", Span::new(6, 7)),
    ]);
    assert_eq!(trace.len(), 2);
    assert_eq!(
        trace.to_string(),
        "flow backtrace:\n  0: ( 1 + x ) at 0..9\n  1: x at 6..7\n"
    );
}

#[test]
fn test_missing_variable_pipe() {
    let err = variable_not_found("a", PipeId::new(7));
    assert_eq!(err.missing_variable_pipe(), Some(PipeId::new(7)));
    assert_eq!(division_by_zero().missing_variable_pipe(), None);
}
