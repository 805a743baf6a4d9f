use sqint::{
    diagnostics::{Category, Diagnostic, Severity},
    normalize::normalize,
    scanner::scan_unit,
    source::SourceUnit,
    validate::{SqlDialect, validate}
};

fn validate_src(src: &str, dialect: SqlDialect) -> Option<Diagnostic> {
    let unit = SourceUnit::new("test.py", src);
    let occurrences = scan_unit(&unit);
    let occ = &occurrences[0];
    let payload = normalize(occ);
    validate(&payload, occ, dialect)
}

#[test]
fn test_valid_select() {
    let diag = validate_src(
        "q = \"SELECT id, name FROM users WHERE id = 1\"",
        SqlDialect::Ansi
    );
    assert!(diag.is_none());
}

#[test]
fn test_valid_insert() {
    let diag = validate_src(
        "q = \"INSERT INTO products (name, price) VALUES ('laptop', 999.99)\"",
        SqlDialect::Ansi
    );
    assert!(diag.is_none());
}

#[test]
fn test_valid_with_parameter_marker() {
    let diag = validate_src("q = \"SELECT * FROM users WHERE id = ?\"", SqlDialect::Ansi);
    assert!(diag.is_none());
}

#[test]
fn test_valid_delete() {
    let diag = validate_src("q = \"DELETE FROM sessions WHERE expired = 1\"", SqlDialect::Ansi);
    assert!(diag.is_none());
}

#[test]
fn test_valid_multiline_statement() {
    let diag = validate_src(
        "q = \"\"\"SELECT id,\n       name\nFROM users\nWHERE id = 1\"\"\"",
        SqlDialect::Ansi
    );
    assert!(diag.is_none());
}

#[test]
fn test_misspelled_leading_keyword() {
    let diag = validate_src("q = \"SELCT * FROM users\"", SqlDialect::Ansi).unwrap();
    assert_eq!(diag.rule_id, "SYN001");
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.category, Category::Syntax);
    assert!(diag.message.contains("SELCT"));
}

#[test]
fn test_unknown_leading_keyword() {
    let diag = validate_src("q = \"FETCH ALL THE THINGS\"", SqlDialect::Ansi).unwrap();
    assert_eq!(diag.rule_id, "SYN001");
}

#[test]
fn test_unclosed_parenthesis() {
    let diag =
        validate_src("q = \"INSERT INTO users (name VALUES ('test')\"", SqlDialect::Ansi).unwrap();
    assert_eq!(diag.rule_id, "SYN002");
    assert!(diag.message.contains("unbalanced parentheses"));
}

#[test]
fn test_stray_closing_parenthesis() {
    let diag = validate_src("q = \"SELECT * FROM users)\"", SqlDialect::Ansi).unwrap();
    assert_eq!(diag.rule_id, "SYN002");
}

#[test]
fn test_parenthesis_inside_sql_string_is_ignored() {
    let diag = validate_src(
        "q = \"SELECT * FROM logs WHERE note = '(unclosed'\"",
        SqlDialect::Ansi
    );
    assert!(diag.is_none());
}

#[test]
fn test_incomplete_statement() {
    let diag = validate_src("q = \"SELECT * FROM\"", SqlDialect::Ansi).unwrap();
    assert_eq!(diag.rule_id, "SYN003");
    assert!(diag.message.contains("SQL syntax error"));
}

#[test]
fn test_diagnostic_span_lies_within_literal() {
    let src = "q = \"SELCT * FROM users\"";
    let unit = SourceUnit::new("test.py", src);
    let occurrences = scan_unit(&unit);
    let occ = &occurrences[0];
    let payload = normalize(occ);
    let diag = validate(&payload, occ, SqlDialect::Ansi).unwrap();
    assert!(occ.span.contains(&diag.span));
    assert_eq!(&src[diag.span.start..diag.span.end], "SELCT");
}

#[test]
fn test_all_dialects_accept_a_simple_select() {
    for dialect in [SqlDialect::Ansi, SqlDialect::Postgres, SqlDialect::MySql] {
        let diag = validate_src("q = \"SELECT id FROM users\"", dialect);
        assert!(diag.is_none());
    }
}

#[test]
fn test_dialect_parse() {
    assert_eq!(SqlDialect::parse("ansi"), Some(SqlDialect::Ansi));
    assert_eq!(SqlDialect::parse("postgres"), Some(SqlDialect::Postgres));
    assert_eq!(SqlDialect::parse("postgresql"), Some(SqlDialect::Postgres));
    assert_eq!(SqlDialect::parse("MySQL"), Some(SqlDialect::MySql));
    assert_eq!(SqlDialect::parse("oracle"), None);
}

#[test]
fn test_supported_dialect_names() {
    let supported = SqlDialect::supported();
    assert!(supported.contains(&"ansi"));
    assert!(supported.contains(&"postgres"));
    assert!(supported.contains(&"mysql"));
}
