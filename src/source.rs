//! Source file representation with byte-offset line indexing.
//!
//! A [`SourceUnit`] owns one file's text for the duration of a pipeline run.
//! The line table is built once, up front, so every downstream stage can
//! translate byte offsets into 1-based line/column pairs without rescanning
//! the text. Lines carrying a `# sqint: ignore` pragma are recorded here and
//! consulted by the aggregator when filtering diagnostics.

use std::collections::HashSet;

/// One analyzed file: path, raw text and a byte-offset line table.
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    path:        String,
    text:        String,
    /// Byte offset of the start of each line, in order. Always non-empty.
    line_starts: Vec<usize>,
    /// 1-based line numbers suppressed by an ignore pragma.
    ignored:     HashSet<usize>
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        let mut ignored = HashSet::new();
        let mut line_begin = 0;

        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                if line_has_pragma(&text[line_begin..offset]) {
                    ignored.insert(line_starts.len());
                }
                line_starts.push(offset + 1);
                line_begin = offset + 1;
            }
        }
        if line_begin < text.len() && line_has_pragma(&text[line_begin..]) {
            ignored.insert(line_starts.len());
        }

        Self {
            path: path.into(),
            text,
            line_starts,
            ignored
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Translate a byte offset into a 1-based (line, column) pair.
    ///
    /// Columns count characters, not bytes. Offsets past the end of the text
    /// resolve to the last position, so clamped spans stay addressable.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1
        };
        let col = self.text[self.line_starts[line_idx]..offset].chars().count() + 1;
        (line_idx + 1, col)
    }

    /// Whether diagnostics starting on this 1-based line are suppressed.
    pub fn is_ignored_line(&self, line: usize) -> bool {
        self.ignored.contains(&line)
    }
}

fn line_has_pragma(line: &str) -> bool {
    line.find('#')
        .map(|pos| {
            let comment = line[pos + 1..].trim_start();
            comment.starts_with("sqint: ignore") || comment.starts_with("sqint:ignore")
        })
        .unwrap_or(false)
}
