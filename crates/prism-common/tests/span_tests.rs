use super::*;

#[test]
fn test_span_line_count() {
    assert_eq!(Span::lines(3, 3).line_count(), 1);
    assert_eq!(Span::lines(3, 7).line_count(), 5);
    // Degenerate spans still cover one line
    assert_eq!(Span::lines(9, 2).line_count(), 1);
}

#[test]
fn test_span_contains() {
    let outer = Span {
        start_line: 1,
        end_line: 10,
        start_column: 1,
        end_column: 2,
        ..Span::default()
    };
    let inner = Span {
        start_line: 2,
        end_line: 4,
        start_column: 5,
        end_column: 6,
        ..Span::default()
    };

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(outer.contains(&outer));
}

#[test]
fn test_span_display_uses_start_position() {
    assert_eq!(Span::at(12, 7).to_string(), "12:7");
}

#[test]
fn test_span_serde_round_trip_keeps_all_fields() {
    let span = Span::at(4, 9).with_offsets(40, 52);
    let json = serde_json::to_string(&span).unwrap();
    let back: Span = serde_json::from_str(&json).unwrap();
    assert_eq!(back, span);
    assert!(json.contains("\"start_offset\":40"));
}
