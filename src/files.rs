//! File enumeration for a run.
//!
//! Walks directories honoring `.gitignore` (via the `ignore` crate), then
//! filters by include/exclude glob patterns. Explicitly named files bypass
//! the include patterns. All file text is read here, before any unit enters
//! the worker pool, so no I/O happens inside per-file analysis.

use std::{fs, path::PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::{
    config::FilesConfig,
    error::{AppResult, glob_pattern_error},
    source::SourceUnit
};

/// A unit ready for analysis, or one whose text could not be read.
pub enum LoadedUnit {
    Ready(SourceUnit),
    Unreadable { path: String, error: std::io::Error }
}

/// Enumerate candidate files under the given paths.
///
/// Directories are walked recursively; files named explicitly on the command
/// line are always included, pattern filters apply only to walked entries.
pub fn collect_files(paths: &[PathBuf], config: &FilesConfig) -> AppResult<Vec<PathBuf>> {
    let include = build_globset(&config.patterns)?;
    let exclude = build_globset(&config.ignore_patterns)?;

    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            if !exclude.is_match(path) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            let walker = WalkBuilder::new(path)
                .git_ignore(config.respect_gitignore)
                .git_exclude(config.respect_gitignore)
                .hidden(!config.include_hidden)
                .build();

            for entry in walker.flatten() {
                let entry_path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_file())
                    && matches_name(&include, entry_path)
                    && !matches_name(&exclude, entry_path)
                {
                    files.push(entry_path.to_path_buf());
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Read every file up front and pair each with its text.
pub fn load_units(files: &[PathBuf]) -> Vec<LoadedUnit> {
    files
        .iter()
        .map(|path| {
            let display = path.display().to_string();
            match fs::read_to_string(path) {
                Ok(text) => LoadedUnit::Ready(SourceUnit::new(display, text)),
                Err(error) => LoadedUnit::Unreadable {
                    path: display,
                    error
                }
            }
        })
        .collect()
}

fn build_globset(patterns: &[String]) -> AppResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| glob_pattern_error(pattern, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| glob_pattern_error("<combined>", e))
}

/// Match a pattern set against the full path or, for bare patterns like
/// `*.py`, against the file name alone.
fn matches_name(set: &GlobSet, path: &std::path::Path) -> bool {
    set.is_match(path)
        || path
            .file_name()
            .is_some_and(|name| set.is_match(std::path::Path::new(name)))
}
