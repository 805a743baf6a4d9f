use colored::Colorize;
use serde::Serialize;

use crate::diagnostics::{FileReport, Severity};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    pub verbose: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            verbose: false
        }
    }
}

/// Run result for serialization
#[derive(Debug, Serialize)]
struct RunResult<'a> {
    files:    &'a [FileReport],
    errors:   usize,
    warnings: usize,
    infos:    usize
}

/// Format the full run report based on output options
pub fn format_report(reports: &[FileReport], opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => {
            let result = RunResult {
                files:    reports,
                errors:   total(reports, Severity::Error),
                warnings: total(reports, Severity::Warning),
                infos:    total(reports, Severity::Info)
            };
            serde_json::to_string_pretty(&result).unwrap_or_default()
        }
        OutputFormat::Text => format_text(reports, opts)
    }
}

fn format_text(reports: &[FileReport], opts: &OutputOptions) -> String {
    let mut output = String::new();

    for report in reports {
        if report.diagnostics.is_empty() {
            if opts.verbose {
                output.push_str(&format!("{}: ok\n", report.path));
            }
            continue;
        }

        let header = format!("{}:", report.path);
        if opts.colored {
            output.push_str(&header.cyan().bold().to_string());
        } else {
            output.push_str(&header);
        }
        output.push('\n');

        for diag in &report.diagnostics {
            let severity = if opts.colored {
                match diag.severity {
                    Severity::Error => diag.severity.to_string().red().bold().to_string(),
                    Severity::Warning => diag.severity.to_string().yellow().to_string(),
                    Severity::Info => diag.severity.to_string().blue().to_string()
                }
            } else {
                diag.severity.to_string()
            };
            output.push_str(&format!(
                "  {}:{}: {} [{}] {}\n",
                diag.line, diag.column, severity, diag.rule_id, diag.message
            ));
        }
    }

    let errors = total(reports, Severity::Error);
    let warnings = total(reports, Severity::Warning);
    let infos = total(reports, Severity::Info);
    let summary = format!(
        "{} file(s) checked: {} error(s), {} warning(s), {} info\n",
        reports.len(),
        errors,
        warnings,
        infos
    );
    if !output.is_empty() {
        output.push('\n');
    }
    output.push_str(&summary);
    output
}

fn total(reports: &[FileReport], severity: Severity) -> usize {
    reports.iter().map(|r| r.count_by(severity)).sum()
}

/// Exit code for a run: 2 when a failing error exists, 1 for any other
/// failing severity, 0 otherwise.
pub fn exit_code(reports: &[FileReport], fail_on: &[Severity]) -> i32 {
    let failing = reports
        .iter()
        .flat_map(|r| r.diagnostics.iter())
        .filter(|d| fail_on.contains(&d.severity))
        .map(|d| d.severity)
        .max();

    match failing {
        Some(Severity::Error) => 2,
        Some(_) => 1,
        None => 0
    }
}
