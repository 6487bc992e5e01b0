use super::*;

#[test]
fn test_span_basic() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(!span.is_dummy());
}

#[test]
fn test_span_merge() {
    let merged = Span::new(10, 20).merge(Span::new(15, 30));
    assert_eq!(merged, Span::new(10, 30));
}

#[test]
fn test_span_merge_skips_dummy() {
    let span = Span::new(4, 9);
    assert_eq!(Span::DUMMY.merge(span), span);
    assert_eq!(span.merge(Span::DUMMY), span);
}

#[test]
fn test_span_try_from_range() {
    assert_eq!(Span::try_from_range(3..7), Ok(Span::new(3, 7)));
    let too_big = (u32::MAX as usize) + 1;
    assert_eq!(
        Span::try_from_range(0..too_big),
        Err(SpanError::EndTooLarge(too_big))
    );
}
