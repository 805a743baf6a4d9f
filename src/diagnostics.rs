//! Diagnostic types and the per-file aggregator.
//!
//! Every pipeline stage that has something to report produces a
//! [`Diagnostic`] carrying a byte span into the source unit. The aggregator
//! translates spans into 1-based file coordinates, drops duplicates and
//! pragma-suppressed entries, and returns an ordered [`FileReport`].

use std::collections::HashSet;

use serde::Serialize;

use crate::source::SourceUnit;

/// Severity of a diagnostic, ordered from lowest to highest.
///
/// The run exit code is derived from the highest severity found among the
/// severities listed in `fail_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR")
        }
    }
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None
        }
    }
}

/// Diagnostic category for grouping and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Syntax,
    InjectionRisk,
    SuspectClassification,
    AnalysisIncomplete
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::InjectionRisk => write!(f, "injection-risk"),
            Self::SuspectClassification => write!(f, "suspect-classification"),
            Self::AnalysisIncomplete => write!(f, "analysis-incomplete")
        }
    }
}

/// Half-open byte range into a source unit's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end:   usize
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// A single finding, in byte coordinates, before aggregation.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable rule identifier (e.g. "SYN001", "RISK001")
    pub rule_id:  &'static str,
    pub severity: Severity,
    pub category: Category,
    pub message:  String,
    pub span:     Span
}

/// A finding resolved to 1-based file coordinates, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct FileDiagnostic {
    pub line:       usize,
    pub column:     usize,
    pub end_line:   usize,
    pub end_column: usize,
    pub severity:   Severity,
    pub category:   Category,
    pub rule_id:    &'static str,
    pub message:    String
}

/// All diagnostics for one source unit, ordered and deduplicated.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path:        String,
    pub diagnostics: Vec<FileDiagnostic>
}

impl FileReport {
    pub fn count_by(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Collect diagnostics for a unit into an ordered report.
///
/// Exact (span, rule id) duplicates are dropped, as are diagnostics whose
/// span starts on a pragma-suppressed line. The remainder is sorted by
/// (line, column, severity-descending).
pub fn aggregate(unit: &SourceUnit, diagnostics: Vec<Diagnostic>) -> FileReport {
    let mut seen: HashSet<(Span, &'static str)> = HashSet::new();
    let mut resolved: Vec<FileDiagnostic> = Vec::with_capacity(diagnostics.len());

    for diag in diagnostics {
        if !seen.insert((diag.span, diag.rule_id)) {
            continue;
        }
        let (line, column) = unit.line_col(diag.span.start);
        if unit.is_ignored_line(line) {
            continue;
        }
        let (end_line, end_column) = unit.line_col(diag.span.end);
        resolved.push(FileDiagnostic {
            line,
            column,
            end_line,
            end_column,
            severity: diag.severity,
            category: diag.category,
            rule_id: diag.rule_id,
            message: diag.message
        });
    }

    resolved.sort_by(|a, b| {
        a.line
            .cmp(&b.line)
            .then_with(|| a.column.cmp(&b.column))
            .then_with(|| b.severity.cmp(&a.severity))
    });

    FileReport {
        path:        unit.path().to_string(),
        diagnostics: resolved
    }
}
