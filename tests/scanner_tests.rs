use sqint::{
    scanner::{LiteralKind, LiteralOccurrence, scan_unit},
    source::SourceUnit
};

fn scan(src: &str) -> Vec<LiteralOccurrence> {
    scan_unit(&SourceUnit::new("test.py", src))
}

fn find_kind(occurrences: &[LiteralOccurrence], kind: LiteralKind) -> &LiteralOccurrence {
    occurrences
        .iter()
        .find(|o| o.kind == kind)
        .expect("occurrence of expected kind")
}

#[test]
fn test_plain_double_quoted() {
    let src = r#"query = "SELECT 1""#;
    let occurrences = scan(src);
    assert_eq!(occurrences.len(), 1);
    let occ = &occurrences[0];
    assert_eq!(occ.kind, LiteralKind::Plain);
    assert_eq!(occ.value, "SELECT 1");
    assert_eq!(&src[occ.span.start..occ.span.end], "\"SELECT 1\"");
    assert!(!occ.truncated);
}

#[test]
fn test_plain_single_quoted() {
    let occurrences = scan("x = 'abc'");
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].value, "abc");
}

#[test]
fn test_escape_sequences_decoded() {
    let occurrences = scan("x = \"a\\tb\\nc\"");
    assert_eq!(occurrences[0].value, "a\tb\nc");
}

#[test]
fn test_raw_string_keeps_backslashes() {
    let occurrences = scan("x = r\"a\\nb\"");
    assert_eq!(occurrences[0].kind, LiteralKind::Raw);
    assert_eq!(occurrences[0].value, "a\\nb");
}

#[test]
fn test_triple_quoted_multiline() {
    let src = "x = \"\"\"SELECT id\nFROM users\"\"\"";
    let occurrences = scan(src);
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].kind, LiteralKind::Multiline);
    assert_eq!(occurrences[0].value, "SELECT id\nFROM users");
}

#[test]
fn test_fstring_interpolation_span() {
    let occurrences = scan("q = f\"SELECT * FROM {table}\"");
    let occ = &occurrences[0];
    assert_eq!(occ.kind, LiteralKind::Interpolated);
    assert_eq!(occ.value, "SELECT * FROM {table}");
    assert_eq!(occ.interp_spans.len(), 1);
    let span = occ.interp_spans[0];
    assert_eq!(&occ.value[span.start..span.end], "{table}");
}

#[test]
fn test_fstring_escaped_braces_are_not_interpolations() {
    let occurrences = scan("q = f\"WHERE a = {{literal}}\"");
    let occ = &occurrences[0];
    assert!(occ.interp_spans.is_empty());
    assert_eq!(occ.value, "WHERE a = {literal}");
}

#[test]
fn test_fstring_nested_call_in_expression() {
    let occurrences = scan("q = f\"SELECT * FROM {get_table(env, 1)}\"");
    let occ = &occurrences[0];
    assert_eq!(occ.interp_spans.len(), 1);
    let span = occ.interp_spans[0];
    assert_eq!(&occ.value[span.start..span.end], "{get_table(env, 1)}");
}

#[test]
fn test_percent_application_marks_formatted() {
    let occurrences = scan("q = \"SELECT * FROM t WHERE x = %s\" % name");
    assert_eq!(occurrences[0].kind, LiteralKind::Formatted);
}

#[test]
fn test_format_call_marks_formatted() {
    let occurrences = scan("q = \"SELECT {} FROM t\".format(col)");
    assert_eq!(occurrences[0].kind, LiteralKind::Formatted);
}

#[test]
fn test_percent_on_later_expression_is_not_format() {
    let occurrences = scan("x = \"SELECT 1\", total % 3");
    assert_eq!(occurrences[0].kind, LiteralKind::Plain);
}

#[test]
fn test_unterminated_single_line_is_truncated() {
    let occurrences = scan("q = \"SELECT * FROM users");
    assert_eq!(occurrences.len(), 1);
    assert!(occurrences[0].truncated);
    assert_eq!(occurrences[0].value, "SELECT * FROM users");
}

#[test]
fn test_unterminated_triple_quoted_with_dangling_quote() {
    let occurrences = scan("q = \"\"\"SELECT * FROM users\"");
    assert_eq!(occurrences.len(), 1);
    let occ = &occurrences[0];
    assert_eq!(occ.kind, LiteralKind::Multiline);
    assert!(occ.truncated);
    assert_eq!(occ.value, "SELECT * FROM users\"");
}

#[test]
fn test_unterminated_triple_quoted_with_two_closing_quotes() {
    let occurrences = scan("q = \"\"\"SELECT 1\"\"");
    assert_eq!(occurrences.len(), 1);
    assert!(occurrences[0].truncated);
}

#[test]
fn test_unterminated_string_does_not_stop_the_scan() {
    let occurrences = scan("q = \"SELECT 1\nother = \"SELECT 2\"\n");
    assert_eq!(occurrences.len(), 2);
    assert!(occurrences[0].truncated);
    assert!(!occurrences[1].truncated);
    assert_eq!(occurrences[1].value, "SELECT 2");
}

#[test]
fn test_concatenation_with_trailing_identifier() {
    let occurrences = scan("query = \"SELECT * FROM \" + table_name");
    assert_eq!(occurrences.len(), 2);
    let combined = find_kind(&occurrences, LiteralKind::Concatenated);
    assert_eq!(combined.value, "SELECT * FROM table_name");
    assert_eq!(combined.interp_spans.len(), 1);
    let span = combined.interp_spans[0];
    assert_eq!(&combined.value[span.start..span.end], "table_name");
    find_kind(&occurrences, LiteralKind::ConcatFragment);
}

#[test]
fn test_concatenation_with_leading_identifier() {
    let src = "q = prefix + \" WHERE id = 1\"";
    let occurrences = scan(src);
    let combined = find_kind(&occurrences, LiteralKind::Concatenated);
    assert_eq!(combined.value, "prefix WHERE id = 1");
    assert_eq!(&src[combined.span.start..combined.span.end], "prefix + \" WHERE id = 1\"");
}

#[test]
fn test_literal_only_concatenation_is_not_synthesized() {
    let occurrences = scan("q = \"SELECT * \" + \"FROM t\"");
    assert_eq!(occurrences.len(), 2);
    assert!(occurrences.iter().all(|o| o.kind == LiteralKind::Plain));
}

#[test]
fn test_three_part_chain_around_identifier() {
    let occurrences = scan("q = \"SELECT * FROM t WHERE a = '\" + val + \"'\"");
    let combined = find_kind(&occurrences, LiteralKind::Concatenated);
    assert_eq!(combined.value, "SELECT * FROM t WHERE a = 'val'");
    assert_eq!(combined.interp_spans.len(), 1);
    assert_eq!(
        occurrences
            .iter()
            .filter(|o| o.kind == LiteralKind::ConcatFragment)
            .count(),
        2
    );
}

#[test]
fn test_comments_are_skipped() {
    assert!(scan("# q = \"SELECT 1\"").is_empty());
}

#[test]
fn test_identifier_ending_in_prefix_letter() {
    // the trailing `r` of an identifier is not a raw-string prefix
    assert!(scan("answer = xr + 1").is_empty());
}

#[test]
fn test_map_value_offset_accounts_for_escapes() {
    let src = "q = \"SELECT\\t* FROM t\"";
    let occurrences = scan(src);
    let occ = &occurrences[0];
    assert_eq!(occ.value, "SELECT\t* FROM t");
    let value_offset = occ.value.find("FROM").unwrap();
    let source_offset = occ.map_value_offset(value_offset);
    assert_eq!(&src[source_offset..source_offset + 4], "FROM");
}

#[test]
fn test_map_value_offset_stays_within_span() {
    let occurrences = scan("q = \"SELECT 1\"");
    let occ = &occurrences[0];
    let mapped = occ.map_value_offset(10_000);
    assert!(mapped >= occ.span.start && mapped <= occ.span.end);
}
