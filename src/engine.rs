//! Per-file analysis pipeline and the parallel run driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────┐   ┌─────────┐   ┌──────────┐   ┌───────────┐   ┌───────────┐
//! │ Scanner │──▶│ Context │──▶│Classifier│──▶│Normalizer │──▶│ Validator │
//! └─────────┘   └─────────┘   └──────────┘   └─────┬─────┘   └─────┬─────┘
//!                                   │              │               │
//!                                   │        ┌─────▼─────┐   ┌─────▼─────┐
//!                                   └───────▶│   Risk    │──▶│Aggregator │
//!                                            └───────────┘   └───────────┘
//! ```
//!
//! A single file's analysis is a pure function of its text: no shared
//! mutable state, no I/O. The run driver distributes units across a
//! [`rayon`] worker pool, checks the cancellation flag between units (never
//! within one), and sorts the final reports by path so the output is
//! deterministic regardless of scheduling. An internal failure inside one
//! unit's pipeline becomes an `ANA001` diagnostic for that unit instead of
//! aborting the run.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::atomic::{AtomicBool, Ordering}
};

use rayon::prelude::*;

use crate::{
    cache::{cache_diagnostics, get_cached},
    classify::{self, Rationale, Verdict},
    context,
    diagnostics::{Category, Diagnostic, FileReport, Severity, Span, aggregate},
    normalize,
    risk,
    scanner::{self, LiteralKind},
    source::SourceUnit,
    validate::{self, SqlDialect}
};

/// Analysis engine: dialect and classifier threshold.
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    pub dialect:        SqlDialect,
    pub min_confidence: f64
}

impl Engine {
    pub fn new(dialect: SqlDialect, min_confidence: f64) -> Self {
        Self {
            dialect,
            min_confidence
        }
    }

    /// Analyze every unit on the worker pool and return reports sorted by
    /// path.
    ///
    /// Cancellation is cooperative and checked between units only: a unit
    /// whose analysis has started always completes. Units skipped by
    /// cancellation are reported as analysis-incomplete, so every unit that
    /// entered the run appears in the result.
    pub fn run(&self, units: &[SourceUnit], cancel: &AtomicBool) -> Vec<FileReport> {
        let mut reports: Vec<FileReport> = units
            .par_iter()
            .map(|unit| {
                if cancel.load(Ordering::Relaxed) {
                    cancelled_report(unit)
                } else {
                    self.analyze_unit(unit)
                }
            })
            .collect();
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        reports
    }

    /// Analyze one unit, consulting the diagnostic cache first.
    ///
    /// A panic anywhere in the pipeline is contained here and reported as an
    /// analysis-incomplete diagnostic; the rest of the run is unaffected.
    pub fn analyze_unit(&self, unit: &SourceUnit) -> FileReport {
        if let Some(cached) = get_cached(unit.text(), self.dialect, self.min_confidence) {
            return FileReport {
                path:        unit.path().to_string(),
                diagnostics: cached
            };
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.analyze_inner(unit)));
        let report = match result {
            Ok(report) => report,
            Err(_) => aggregate(
                unit,
                vec![Diagnostic {
                    rule_id:  "ANA001",
                    severity: Severity::Warning,
                    category: Category::AnalysisIncomplete,
                    message:  "analysis of this file failed and was abandoned".to_string(),
                    span:     Span::new(0, 0)
                }]
            )
        };

        cache_diagnostics(
            unit.text(),
            self.dialect,
            self.min_confidence,
            report.diagnostics.clone()
        );
        report
    }

    fn analyze_inner(&self, unit: &SourceUnit) -> FileReport {
        let occurrences = scanner::scan_unit(unit);
        let mut diagnostics = Vec::new();

        for occurrence in &occurrences {
            // fragments are covered by their chain's synthesized occurrence
            if occurrence.kind == LiteralKind::ConcatFragment {
                continue;
            }

            let ctx = context::resolve(unit, occurrence);
            let classification = classify::classify(occurrence, &ctx);

            match classification.verdict {
                Verdict::NotSql => continue,
                Verdict::Ambiguous => {
                    diagnostics.push(ambiguous_diagnostic(occurrence, classification.rationale));
                    continue;
                }
                Verdict::Sql => {}
            }

            if classification.confidence < self.min_confidence {
                diagnostics.push(Diagnostic {
                    rule_id:  "CLS003",
                    severity: Severity::Info,
                    category: Category::SuspectClassification,
                    message:  format!(
                        "string looks like SQL but classification confidence ({:.2}) is below \
                         the threshold ({:.2}); not validated",
                        classification.confidence, self.min_confidence
                    ),
                    span:     occurrence.span
                });
                continue;
            }

            let payload = normalize::normalize(occurrence);
            if let Some(diag) = validate::validate(&payload, occurrence, self.dialect) {
                diagnostics.push(diag);
            }
            diagnostics.extend(risk::detect(occurrence, &ctx, &classification));
        }

        aggregate(unit, diagnostics)
    }
}

fn cancelled_report(unit: &SourceUnit) -> FileReport {
    aggregate(
        unit,
        vec![Diagnostic {
            rule_id:  "ANA001",
            severity: Severity::Warning,
            category: Category::AnalysisIncomplete,
            message:  "analysis cancelled before this file was processed".to_string(),
            span:     Span::new(0, 0)
        }]
    )
}

fn ambiguous_diagnostic(
    occurrence: &crate::scanner::LiteralOccurrence,
    rationale: Rationale
) -> Diagnostic {
    match rationale {
        Rationale::CommentOnly => Diagnostic {
            rule_id:  "CLS001",
            severity: Severity::Info,
            category: Category::SuspectClassification,
            message:  "SQL-like text behind a SQL comment marker is never executed; remove it \
                       or drop the marker"
                .to_string(),
            span:     occurrence.span
        },
        Rationale::Truncated => Diagnostic {
            rule_id:  "CLS002",
            severity: Severity::Info,
            category: Category::SuspectClassification,
            message:  "unterminated string literal; SQL analysis of the truncated text was \
                       skipped"
                .to_string(),
            span:     occurrence.span
        },
        _ => Diagnostic {
            rule_id:  "CLS003",
            severity: Severity::Info,
            category: Category::SuspectClassification,
            message:  "string is ambiguously SQL-like; not validated".to_string(),
            span:     occurrence.span
        }
    }
}
