use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// sqint - find and validate SQL embedded in source-code string literals
#[derive(Parser, Debug)]
#[command(name = "sqint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan files or directories for embedded SQL and validate it
    Check {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// SQL dialect for validation
        #[arg(short, long, value_enum, env = "SQINT_DIALECT")]
        dialect: Option<Dialect>,

        /// Minimum classifier confidence for validation
        #[arg(long, env = "SQINT_MIN_CONFIDENCE")]
        min_confidence: Option<f64>,

        /// Severities that produce a failing exit code (repeatable)
        #[arg(long, value_enum)]
        fail_on: Vec<FailSeverity>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Show files without diagnostics in the report
        #[arg(short, long)]
        verbose: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Ansi,
    Postgres,
    Mysql
}

impl Dialect {
    pub fn config_name(self) -> &'static str {
        match self {
            Self::Ansi => "ansi",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql"
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FailSeverity {
    Info,
    Warning,
    Error
}

impl FailSeverity {
    pub fn config_name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error"
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json
}
