//! Permissive SQL grammar validation of normalized payloads.
//!
//! Validation is layered: a leading-keyword check and a parenthesis-balance
//! check produce the two most common diagnostics with precise expectation
//! messages, then [`sqlparser`] handles the full dialect-agnostic grammar
//! (SELECT with joins, grouping, ordering, limits, window functions and
//! CTEs, INSERT, UPDATE, DELETE, CREATE TABLE, ALTER TABLE). At most one
//! syntax diagnostic is produced, at the first point of failure. Semantic
//! correctness (unknown tables or columns) is out of scope.

use std::sync::LazyLock;

use regex::Regex;
use sqlparser::{
    dialect::{AnsiDialect, Dialect, MySqlDialect, PostgreSqlDialect},
    parser::{Parser, ParserError}
};

use crate::{
    classify::STATEMENT_KEYWORDS,
    diagnostics::{Category, Diagnostic, Severity, Span},
    normalize::NormalizedPayload,
    scanner::LiteralOccurrence
};

/// SQL dialect used for grammar validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlDialect {
    #[default]
    Ansi,
    Postgres,
    MySql
}

impl SqlDialect {
    /// Convert to a sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::MySql => Box::new(MySqlDialect {})
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ansi" => Some(Self::Ansi),
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" => Some(Self::MySql),
            _ => None
        }
    }

    pub fn supported() -> [&'static str; 3] {
        ["ansi", "postgres", "mysql"]
    }
}

static ERROR_POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*at Line: (\d+), Column:? (\d+)")
        .unwrap_or_else(|_| Regex::new("$^").expect("empty pattern"))
});

/// Validate a normalized payload, returning the first syntax diagnostic.
///
/// Returns `None` on a successful parse.
pub fn validate(
    payload: &NormalizedPayload,
    occurrence: &LiteralOccurrence,
    dialect: SqlDialect
) -> Option<Diagnostic> {
    let sql = payload.sql();

    if let Some(diag) = check_leading_keyword(sql, payload, occurrence) {
        return Some(diag);
    }
    if let Some(diag) = check_parentheses(sql, payload, occurrence) {
        return Some(diag);
    }

    match Parser::parse_sql(dialect.into_parser_dialect().as_ref(), sql) {
        Ok(_) => None,
        Err(e) => Some(parser_diagnostic(e, payload, occurrence))
    }
}

/// SYN001: the statement must open with a recognized keyword.
fn check_leading_keyword(
    sql: &str,
    payload: &NormalizedPayload,
    occurrence: &LiteralOccurrence
) -> Option<Diagnostic> {
    let trimmed_start = sql.len() - sql.trim_start().len();
    let rest = &sql[trimmed_start..];
    let token_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let token = &rest[..token_len];

    if token.is_empty() || STATEMENT_KEYWORDS.iter().any(|k| token.eq_ignore_ascii_case(k)) {
        return None;
    }

    let start = payload.map_to_source(occurrence, trimmed_start);
    let end = payload
        .map_to_source(occurrence, trimmed_start + token_len)
        .max(start);
    Some(Diagnostic {
        rule_id:  "SYN001",
        severity: Severity::Error,
        category: Category::Syntax,
        message:  format!(
            "unexpected leading keyword '{}': expected SELECT, INSERT, UPDATE, or DELETE \
             (or CREATE, ALTER, DROP, WITH, MERGE)",
            token
        ),
        span:     Span::new(start, end)
    })
}

/// SYN002: parenthesis balance, ignoring content inside SQL string literals.
fn check_parentheses(
    sql: &str,
    payload: &NormalizedPayload,
    occurrence: &LiteralOccurrence
) -> Option<Diagnostic> {
    let mut stack: Vec<usize> = Vec::new();
    let mut in_quote = false;
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut mismatch: Option<usize> = None;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                if in_quote && bytes.get(i + 1) == Some(&b'\'') {
                    i += 1;
                } else {
                    in_quote = !in_quote;
                }
            }
            b'(' if !in_quote => stack.push(i),
            b')' if !in_quote => {
                if stack.pop().is_none() {
                    mismatch = Some(i);
                    break;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let offset = mismatch.or_else(|| stack.first().copied())?;
    let start = payload.map_to_source(occurrence, offset);
    Some(Diagnostic {
        rule_id:  "SYN002",
        severity: Severity::Error,
        category: Category::Syntax,
        message:  if mismatch.is_some() {
            "unbalanced parentheses: closing parenthesis without a matching open".to_string()
        } else {
            "unbalanced parentheses: opening parenthesis is never closed".to_string()
        },
        span:     Span::new(start, (start + 1).min(occurrence.span.end))
    })
}

/// SYN003: first failure reported by the grammar parser.
fn parser_diagnostic(
    error: ParserError,
    payload: &NormalizedPayload,
    occurrence: &LiteralOccurrence
) -> Diagnostic {
    let raw_message = match error {
        ParserError::ParserError(msg) | ParserError::TokenizerError(msg) => msg,
        ParserError::RecursionLimitExceeded => "statement nesting too deep".to_string()
    };

    let (message, payload_offset) = match ERROR_POSITION.captures(&raw_message) {
        Some(caps) => {
            let line: usize = caps[1].parse().unwrap_or(1);
            let column: usize = caps[2].parse().unwrap_or(1);
            let cleaned = ERROR_POSITION.replace(&raw_message, "").trim_end().to_string();
            (cleaned, payload.offset_of(line, column))
        }
        None => (raw_message, 0)
    };

    let start = payload.map_to_source(occurrence, payload_offset);
    let span = Span::new(start, occurrence.span.end.max(start));

    // a parse failure expecting a closing parenthesis is a paren-structure
    // problem even when the raw open/close counts happen to balance
    if message.contains("')'") || message.contains(": )") {
        return Diagnostic {
            rule_id: "SYN002",
            severity: Severity::Error,
            category: Category::Syntax,
            message: format!("unbalanced parentheses: {}", message),
            span
        };
    }

    Diagnostic {
        rule_id: "SYN003",
        severity: Severity::Error,
        category: Category::Syntax,
        message: format!("SQL syntax error: {}", message),
        span
    }
}
