//! Interpolation and parameter-marker normalization.
//!
//! Before a payload reaches the grammar validator, every host-language
//! interpolation span and every recognized external-parameter marker
//! (`?`, `:name`, `%s`-style, `{}`/`{name}`) is replaced with one neutral
//! token that parses as a SQL expression. The payload tracks a mapping back
//! to original byte coordinates so validator diagnostics land inside the
//! originating literal. Unrecognized interpolation forms are left as literal
//! text; the resulting syntax error is acceptable and surfaced downstream.

use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::LiteralOccurrence;

/// Neutral stand-in accepted by the SQL grammar wherever a value,
/// identifier-list element, or expression may appear.
pub const PLACEHOLDER_TOKEN: &str = "PLACEHOLDER";

static PARAM_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    // ?           positional marker
    // :name       named marker (:: casts excluded)
    // %(name)s    named percent style
    // %s %d %i %f positional percent style
    // {} {name}   brace style
    Regex::new(
        r"\?|(?:^|[^:]):[A-Za-z_][A-Za-z0-9_]*|%\([^)]+\)[sdif]|%[sdif]|\{[A-Za-z0-9_]*\}"
    )
    .unwrap_or_else(|_| Regex::new(r"\?").expect("fallback marker pattern"))
});

#[derive(Debug, Clone, Copy)]
struct Segment {
    payload_start:  usize,
    payload_end:    usize,
    /// Offset into the occurrence value where this segment's text begins.
    /// Placeholder segments map everything to the replaced span's start.
    value_start:    usize,
    is_placeholder: bool
}

/// A literal value with interpolations neutralized, plus the mapping back to
/// the original occurrence. Lives only for the validator/risk-detector call.
#[derive(Debug, Clone)]
pub struct NormalizedPayload {
    sql:      String,
    segments: Vec<Segment>
}

impl NormalizedPayload {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Map a byte offset in the normalized SQL back to a source byte offset.
    pub fn map_to_source(&self, occurrence: &LiteralOccurrence, payload_offset: usize) -> usize {
        let value_offset = self
            .segments
            .iter()
            .find(|s| payload_offset >= s.payload_start && payload_offset < s.payload_end)
            .or_else(|| self.segments.last())
            .map_or(0, |s| {
                if s.is_placeholder {
                    s.value_start
                } else {
                    s.value_start + (payload_offset - s.payload_start)
                }
            });
        occurrence.map_value_offset(value_offset)
    }

    /// Resolve a 1-based (line, column) pair reported against the normalized
    /// SQL into a payload byte offset.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let mut remaining = line.saturating_sub(1);
        let mut offset = 0;
        for (idx, b) in self.sql.bytes().enumerate() {
            if remaining == 0 {
                break;
            }
            if b == b'\n' {
                remaining -= 1;
                offset = idx + 1;
            }
        }
        (offset + column.saturating_sub(1)).min(self.sql.len())
    }
}

struct Builder {
    sql:      String,
    segments: Vec<Segment>
}

impl Builder {
    fn new() -> Self {
        Self {
            sql:      String::new(),
            segments: Vec::new()
        }
    }

    fn push_text(&mut self, text: &str, value_start: usize) {
        if text.is_empty() {
            return;
        }
        let payload_start = self.sql.len();
        self.sql.push_str(text);
        self.segments.push(Segment {
            payload_start,
            payload_end: self.sql.len(),
            value_start,
            is_placeholder: false
        });
    }

    fn push_placeholder(&mut self, value_start: usize) {
        let payload_start = self.sql.len();
        self.sql.push_str(PLACEHOLDER_TOKEN);
        self.segments.push(Segment {
            payload_start,
            payload_end: self.sql.len(),
            value_start,
            is_placeholder: true
        });
    }
}

/// Normalize a SQL-classified occurrence for grammar validation.
///
/// Interpolation spans recorded by the scanner are replaced first; the
/// remaining text is scanned for parameter markers outside single-quoted SQL
/// string regions.
pub fn normalize(occurrence: &LiteralOccurrence) -> NormalizedPayload {
    let value = occurrence.value.as_str();
    let mut builder = Builder::new();
    let mut cursor = 0;

    let mut spans = occurrence.interp_spans.clone();
    spans.sort_by_key(|s| s.start);
    for span in &spans {
        if span.start < cursor || span.end > value.len() {
            continue; // malformed span, keep the text as-is
        }
        replace_markers(&mut builder, &value[cursor..span.start], cursor);
        builder.push_placeholder(span.start);
        cursor = span.end;
    }
    replace_markers(&mut builder, &value[cursor..], cursor);

    NormalizedPayload {
        sql:      builder.sql,
        segments: builder.segments
    }
}

/// Replace parameter markers in a literal-text region, skipping content
/// inside single-quoted SQL strings.
fn replace_markers(builder: &mut Builder, text: &str, value_base: usize) {
    let mut emitted = 0;
    for (region_start, region_end, quoted) in quote_regions(text) {
        let region = &text[region_start..region_end];
        if quoted {
            continue;
        }
        for m in PARAM_MARKERS.find_iter(region) {
            let mut start = region_start + m.start();
            let end = region_start + m.end();
            if start < emitted {
                continue;
            }
            let matched = &text[start..end];
            // the named-marker alternative captures one leading context byte
            if !matched.starts_with(':') && matched.contains(':') {
                start += matched.find(':').unwrap_or(0);
            }
            builder.push_text(&text[emitted..start], value_base + emitted);
            builder.push_placeholder(value_base + start);
            emitted = end;
        }
    }
    builder.push_text(&text[emitted..], value_base + emitted);
}

/// Split text into (start, end, inside-single-quotes) regions.
fn quote_regions(text: &str) -> Vec<(usize, usize, bool)> {
    let mut regions = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if in_quote && bytes.get(i + 1) == Some(&b'\'') {
                i += 2; // escaped quote inside a SQL string
                continue;
            }
            let boundary = if in_quote { i + 1 } else { i };
            if boundary > start {
                regions.push((start, boundary, in_quote));
            }
            start = boundary;
            in_quote = !in_quote;
        }
        i += 1;
    }
    if start < bytes.len() {
        regions.push((start, bytes.len(), in_quote));
    }
    regions
}
