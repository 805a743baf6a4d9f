//! # sqint
//!
//! Finds SQL statements embedded in source-code string literals and
//! validates them.
//!
//! `sqint` scans source files for string literals, decides heuristically
//! which of them carry SQL, neutralizes host-language interpolation, and
//! parses the result against a permissive SQL grammar. It also warns about
//! query construction patterns that resolve variable data into the query
//! text instead of binding it as parameters.
//!
//! # Architecture
//!
//! Each file runs through a fixed pipeline, in parallel across files using
//! [`rayon`]:
//!
//! 1. **Scanner** - a lexical state machine over the host language's string
//!    grammar (plain, raw, triple-quoted, f-string, concatenation chains).
//! 2. **Context resolver** - best-effort structural context (assignment
//!    target, callee, dict key) without a full host parse.
//! 3. **Classifier** - SQL / not-SQL / ambiguous verdict with a confidence
//!    score and rationale.
//! 4. **Normalizer** - interpolations and parameter markers become one
//!    neutral token the grammar accepts anywhere an expression may appear.
//! 5. **Validator** - dialect-agnostic SQL grammar via [`sqlparser`]; at
//!    most one syntax diagnostic per payload, at the first failure point.
//! 6. **Risk detector** - warnings for concatenated, `%`/`.format()`-ed and
//!    f-string-built queries.
//! 7. **Aggregator** - ordered, deduplicated diagnostics per file.
//!
//! # Quick Start
//!
//! ```bash
//! # Check a project tree
//! sqint check src/
//!
//! # CI integration: fail on warnings too, machine-readable output
//! sqint check src/ --fail-on error --fail-on warning -f json
//!
//! # Validate against a specific dialect
//! sqint check app.py --dialect postgres
//! ```
//!
//! # Rules
//!
//! | ID | Severity | Description |
//! |----|----------|-------------|
//! | SYN001 | error | Invalid/unexpected leading keyword |
//! | SYN002 | error | Unbalanced parentheses |
//! | SYN003 | error | SQL parse failure at the first error point |
//! | RISK001 | warning | Query assembled by string concatenation |
//! | RISK002 | warning | `%`/`.format()` substitution into the query text |
//! | RISK003 | warning | f-string interpolation into the query text |
//! | CLS001 | info | Comment-only SQL-like literal |
//! | CLS002 | info | Unterminated literal, analysis truncated |
//! | CLS003 | info | SQL-like literal below the confidence threshold |
//! | ANA001 | warning | Per-file analysis failed or was abandoned |
//!
//! Suppress any line with a trailing `# sqint: ignore` comment.
//!
//! # Exit Codes
//!
//! The exit code reflects the highest severity found among the severities
//! listed in `fail_on`:
//!
//! - `0` - no failing diagnostics
//! - `1` - failing warnings or infos
//! - `2` - failing errors
//!
//! # Configuration
//!
//! Loaded from (in order of precedence) command-line arguments, environment
//! variables (`SQINT_DIALECT`, `SQINT_MIN_CONFIDENCE`), `.sqint.toml` in the
//! current directory, then `~/.config/sqint/config.toml`:
//!
//! ```toml
//! [engine]
//! sql_dialect = "ansi"
//! min_classifier_confidence = 0.5
//! fail_on = ["error"]
//!
//! [files]
//! patterns = ["*.py", "*.pyi"]
//! ignore_patterns = ["**/migrations/**"]
//! ```
//!
//! # Modules
//!
//! - [`scanner`] - string-literal lexer and concatenation-chain synthesis
//! - [`context`] - syntactic context resolution
//! - [`classify`] - SQL-vs-prose classification
//! - [`normalize`] - interpolation/parameter-marker neutralization
//! - [`validate`] - SQL grammar validation
//! - [`risk`] - injection-risk detection
//! - [`diagnostics`] - diagnostic types and per-file aggregation
//! - [`engine`] - pipeline orchestration and the parallel driver
//! - [`files`] - file enumeration and reading
//! - [`config`] - configuration loading and validation
//! - [`output`] - text and JSON report formatting
//! - [`cache`] - per-content diagnostic cache
//! - [`error`] - error types and constructors

mod cache;
mod classify;
mod cli;
mod config;
mod context;
mod diagnostics;
mod engine;
mod error;
mod files;
mod normalize;
mod output;
mod risk;
mod scanner;
mod source;
mod validate;

use std::{process, sync::atomic::AtomicBool, time::Duration};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    cli::{Cli, Commands, Format},
    config::Config,
    diagnostics::{Category, Diagnostic, FileReport, Severity, Span, aggregate},
    engine::Engine,
    error::AppResult,
    files::{LoadedUnit, collect_files, load_units},
    output::{OutputFormat, OutputOptions, exit_code, format_report},
    source::SourceUnit
};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Check {
            paths,
            dialect,
            min_confidence,
            fail_on,
            output_format,
            verbose,
            no_color
        } => {
            // CLI arguments override file and environment configuration
            if let Some(dialect) = dialect {
                config.engine.sql_dialect = dialect.config_name().to_string();
            }
            if let Some(confidence) = min_confidence {
                config.engine.min_classifier_confidence = confidence;
            }
            if !fail_on.is_empty() {
                config.engine.fail_on = fail_on
                    .iter()
                    .map(|s| s.config_name().to_string())
                    .collect();
            }

            let sql_dialect = config.dialect()?;
            let fail_severities = config.fail_on()?;

            let file_list = collect_files(&paths, &config.files)?;
            let loaded = load_units(&file_list);

            let mut units = Vec::new();
            let mut reports: Vec<FileReport> = Vec::new();
            for unit in loaded {
                match unit {
                    LoadedUnit::Ready(unit) => units.push(unit),
                    LoadedUnit::Unreadable { path, error } => {
                        reports.push(unreadable_report(path, &error));
                    }
                }
            }

            // Show progress indicator
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message(format!("Checking {} file(s)...", units.len()));
            pb.enable_steady_tick(Duration::from_millis(100));

            let engine = Engine::new(sql_dialect, config.engine.min_classifier_confidence);
            let cancel = AtomicBool::new(false);
            let mut run_reports = engine.run(&units, &cancel);
            pb.finish_and_clear();

            reports.append(&mut run_reports);
            reports.sort_by(|a, b| a.path.cmp(&b.path));

            let opts = OutputOptions {
                format: match output_format {
                    Format::Text => OutputFormat::Text,
                    Format::Json => OutputFormat::Json
                },
                colored: !no_color,
                verbose
            };
            println!("{}", format_report(&reports, &opts));

            Ok(exit_code(&reports, &fail_severities))
        }
    }
}

/// A file whose text could not be read is reported as analysis-incomplete
/// rather than aborting the run.
fn unreadable_report(path: String, error: &std::io::Error) -> FileReport {
    let unit = SourceUnit::new(path, String::new());
    aggregate(
        &unit,
        vec![Diagnostic {
            rule_id:  "ANA001",
            severity: Severity::Warning,
            category: Category::AnalysisIncomplete,
            message:  format!("could not read file: {}", error),
            span:     Span::new(0, 0)
        }]
    )
}
