//! Unsafe query-construction detection.
//!
//! Works on the original occurrence and its context, before normalization:
//! the lexical kind tells us whether variable data is resolved into the
//! query text itself (concatenation, `%`/`.format()` application, f-string
//! interpolation) or left as parameter markers for a downstream binding
//! call. Only the former is flagged; a literal that merely *contains* `?` or
//! `%s` markers is safe binding and produces no warning.

use crate::{
    classify::{ClassificationResult, Verdict},
    context::SyntacticContext,
    diagnostics::{Category, Diagnostic, Severity},
    scanner::{LiteralKind, LiteralOccurrence}
};

/// Emit injection-risk warnings for one SQL-classified occurrence.
pub fn detect(
    occurrence: &LiteralOccurrence,
    context: &SyntacticContext,
    classification: &ClassificationResult
) -> Vec<Diagnostic> {
    if classification.verdict != Verdict::Sql {
        return vec![];
    }

    let bound = context
        .bound_name
        .as_ref()
        .map(|n| format!(" bound to '{}'", n))
        .unwrap_or_default();

    match occurrence.kind {
        LiteralKind::Concatenated => vec![Diagnostic {
            rule_id:  "RISK001",
            severity: Severity::Warning,
            category: Category::InjectionRisk,
            message:  format!(
                "SQL query{} is assembled by string concatenation with a non-literal \
                 operand; pass the value as a bound parameter instead",
                bound
            ),
            span:     occurrence.span
        }],
        LiteralKind::Formatted => vec![Diagnostic {
            rule_id:  "RISK002",
            severity: Severity::Warning,
            category: Category::InjectionRisk,
            message:  format!(
                "SQL query{} resolves values into the statement text via %/format() \
                 substitution; use parameter binding instead",
                bound
            ),
            span:     occurrence.span
        }],
        LiteralKind::Interpolated => vec![Diagnostic {
            rule_id:  "RISK003",
            severity: Severity::Warning,
            category: Category::InjectionRisk,
            message:  format!(
                "SQL query{} interpolates expressions directly into the statement \
                 text; use parameter binding instead",
                bound
            ),
            span:     occurrence.span
        }],
        _ => vec![]
    }
}
