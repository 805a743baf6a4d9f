use sqint::{
    diagnostics::{Category, Diagnostic, Severity, Span, aggregate},
    source::SourceUnit
};

fn diag(rule_id: &'static str, severity: Severity, span: Span) -> Diagnostic {
    Diagnostic {
        rule_id,
        severity,
        category: Category::Syntax,
        message: format!("{} fired", rule_id),
        span
    }
}

#[test]
fn test_line_col_translation() {
    let unit = SourceUnit::new("t.py", "ab\ncd\n");
    assert_eq!(unit.line_col(0), (1, 1));
    assert_eq!(unit.line_col(1), (1, 2));
    assert_eq!(unit.line_col(3), (2, 1));
    assert_eq!(unit.line_col(4), (2, 2));
}

#[test]
fn test_line_col_counts_characters_not_bytes() {
    // 'é' is two bytes but one column
    let unit = SourceUnit::new("t.py", "é = 1");
    assert_eq!(unit.line_col(3), (1, 3));
}

#[test]
fn test_line_col_clamps_past_the_end() {
    let unit = SourceUnit::new("t.py", "ab");
    assert_eq!(unit.line_col(99), (1, 3));
}

#[test]
fn test_pragma_variants() {
    let unit = SourceUnit::new("t.py", "x = 1  # sqint: ignore\ny = 2  # sqint:ignore\nz = 3\n");
    assert!(unit.is_ignored_line(1));
    assert!(unit.is_ignored_line(2));
    assert!(!unit.is_ignored_line(3));
}

#[test]
fn test_plain_comment_is_not_a_pragma() {
    let unit = SourceUnit::new("t.py", "x = 1  # just a note\n");
    assert!(!unit.is_ignored_line(1));
}

#[test]
fn test_aggregate_drops_exact_duplicates() {
    let unit = SourceUnit::new("t.py", "abc\ndef\n");
    let span = Span::new(0, 3);
    let report = aggregate(
        &unit,
        vec![
            diag("SYN003", Severity::Error, span),
            diag("SYN003", Severity::Error, span),
        ]
    );
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn test_aggregate_keeps_same_span_different_rules() {
    let unit = SourceUnit::new("t.py", "abc\n");
    let span = Span::new(0, 3);
    let report = aggregate(
        &unit,
        vec![
            diag("SYN003", Severity::Error, span),
            diag("RISK001", Severity::Warning, span),
        ]
    );
    assert_eq!(report.diagnostics.len(), 2);
}

#[test]
fn test_aggregate_drops_pragma_suppressed_lines() {
    let unit = SourceUnit::new("t.py", "bad line  # sqint: ignore\nother\n");
    let report = aggregate(
        &unit,
        vec![
            diag("SYN001", Severity::Error, Span::new(0, 3)),
            diag("SYN001", Severity::Error, Span::new(26, 31)),
        ]
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 2);
}

#[test]
fn test_aggregate_orders_by_position_then_severity() {
    let unit = SourceUnit::new("t.py", "abc\ndef\n");
    let report = aggregate(
        &unit,
        vec![
            diag("CLS003", Severity::Info, Span::new(4, 7)),
            diag("RISK001", Severity::Warning, Span::new(0, 3)),
            diag("SYN001", Severity::Error, Span::new(0, 3)),
        ]
    );
    let ids: Vec<_> = report.diagnostics.iter().map(|d| d.rule_id).collect();
    assert_eq!(ids, ["SYN001", "RISK001", "CLS003"]);
}

#[test]
fn test_severity_ordering_and_parse() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
    assert_eq!(Severity::parse("error"), Some(Severity::Error));
    assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
    assert_eq!(Severity::parse("info"), Some(Severity::Info));
    assert_eq!(Severity::parse("fatal"), None);
}

#[test]
fn test_severity_display() {
    assert_eq!(Severity::Error.to_string(), "ERROR");
    assert_eq!(Severity::Warning.to_string(), "WARN");
    assert_eq!(Severity::Info.to_string(), "INFO");
}

#[test]
fn test_span_contains() {
    let outer = Span::new(10, 20);
    assert!(outer.contains(&Span::new(10, 20)));
    assert!(outer.contains(&Span::new(12, 15)));
    assert!(!outer.contains(&Span::new(5, 15)));
    assert!(!outer.contains(&Span::new(15, 25)));
}

#[test]
fn test_count_by_severity() {
    let unit = SourceUnit::new("t.py", "abc\n");
    let report = aggregate(
        &unit,
        vec![
            diag("SYN001", Severity::Error, Span::new(0, 1)),
            diag("RISK001", Severity::Warning, Span::new(1, 2)),
            diag("RISK002", Severity::Warning, Span::new(2, 3)),
        ]
    );
    assert_eq!(report.count_by(Severity::Error), 1);
    assert_eq!(report.count_by(Severity::Warning), 2);
    assert_eq!(report.count_by(Severity::Info), 0);
}
