//! String-literal scanner for Python-like source text.
//!
//! The scanner is a single-pass lexical state machine over the host file:
//!
//! ```text
//! NORMAL ──quote──▶ IN_STRING ──backslash──▶ IN_ESCAPE (one char)
//!    ▲                  │  ▲                      │
//!    │                  │  └──────────────────────┘
//!    └──closing quote───┘
//!                       │
//!            interpolation open ──▶ IN_INTERP_EXPR(depth)
//! ```
//!
//! It recognizes plain single/double-quoted strings, raw strings (`r"..."`,
//! no escape processing), triple-quoted multi-line strings, f-string
//! interpolation with nested-delimiter depth tracking, and `%` / `.format()`
//! application following a literal. A separate pass over the scanned
//! occurrences synthesizes a combined occurrence for `+`-concatenation chains
//! that include at least one non-literal operand.
//!
//! An unterminated string at end of input (or end of line for single-quoted
//! strings) degrades to a single truncated occurrence instead of aborting the
//! scan of the rest of the file.

use crate::{diagnostics::Span, source::SourceUnit};

/// Lexical flavor of a string-literal occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Plain,
    /// `r"..."` - no escape processing
    Raw,
    /// Triple-quoted
    Multiline,
    /// f-string containing at least one `{expr}`
    Interpolated,
    /// Literal with `%` or `.format(...)` applied directly to it
    Formatted,
    /// Member of a concatenation chain covered by a synthesized occurrence
    ConcatFragment,
    /// Synthesized occurrence spanning a whole `+` chain with a non-literal
    /// operand
    Concatenated
}

/// Byte range into a [`LiteralOccurrence`]'s decoded value that holds an
/// unresolved interpolation (f-string expression or chain operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpSpan {
    pub start: usize,
    pub end:   usize
}

/// One string-literal-like expression found in a source unit.
#[derive(Debug, Clone)]
pub struct LiteralOccurrence {
    /// Byte span in the source, including quotes and prefix
    pub span:         Span,
    /// Raw lexical form as it appears in the source
    pub raw:          String,
    pub kind:         LiteralKind,
    /// Decoded textual value; interpolations are kept verbatim and marked
    pub value:        String,
    /// Spans into `value` holding unresolved interpolations
    pub interp_spans: Vec<InterpSpan>,
    /// Set when the literal was unterminated at end of line/input
    pub truncated:    bool,
    /// Source offset where the decoded content begins
    content_start:    usize,
    /// (value offset, extra source bytes before it) pairs for escape decoding
    escape_adjusts:   Vec<(usize, usize)>
}

impl LiteralOccurrence {
    /// Map a byte offset into `value` back to a source byte offset.
    ///
    /// The result is always clamped into the occurrence's span, so a span
    /// derived from it lies within the original literal.
    pub fn map_value_offset(&self, value_offset: usize) -> usize {
        let extra: usize = self
            .escape_adjusts
            .iter()
            .take_while(|(vo, _)| *vo <= value_offset)
            .map(|(_, delta)| delta)
            .sum();
        (self.content_start + value_offset + extra).clamp(self.span.start, self.span.end)
    }
}

/// Lazy iterator over the string literals of one piece of source text.
///
/// Restartable by constructing a new scanner over the same text.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InString,
    InEscape,
    InInterpExpr(u32)
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Scan forward from the current position to the next literal start.
    ///
    /// Comments run to end of line; identifiers are consumed wholesale so a
    /// trailing `r`/`f`/`b` of a name is never mistaken for a string prefix.
    fn advance_to_literal(&mut self) -> Option<(usize, bool, bool)> {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            match b {
                b'#' => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b'\'' | b'"' => return Some((self.pos, false, false)),
                _ if b.is_ascii_alphabetic() || b == b'_' => {
                    let ident_start = self.pos;
                    while self.pos < bytes.len() && is_ident_byte(bytes[self.pos]) {
                        self.pos += 1;
                    }
                    let ident = &self.src[ident_start..self.pos];
                    if self.pos < bytes.len()
                        && (bytes[self.pos] == b'\'' || bytes[self.pos] == b'"')
                        && let Some((raw, interp)) = prefix_flags(ident)
                    {
                        return Some((ident_start, raw, interp));
                    }
                }
                _ => {
                    self.pos += next_char_len(self.src, self.pos);
                }
            }
        }
        None
    }

    #[allow(clippy::too_many_lines)]
    fn scan_string(&mut self, start: usize, raw: bool, interp: bool) -> LiteralOccurrence {
        let bytes = self.src.as_bytes();
        let quote = bytes[self.pos];
        let triple = self.pos + 2 < bytes.len()
            && bytes[self.pos + 1] == quote
            && bytes[self.pos + 2] == quote;
        self.pos += if triple { 3 } else { 1 };

        let content_start = self.pos;
        let mut value = String::new();
        let mut interp_spans = Vec::new();
        let mut escape_adjusts = Vec::new();
        let mut state = ScanState::InString;
        let mut truncated = false;
        let mut closed = false;

        while self.pos < bytes.len() {
            let ch = next_char(self.src, self.pos);
            let ch_len = ch.len_utf8();

            match state {
                ScanState::InString => {
                    if ch == quote as char {
                        if !triple {
                            self.pos += 1;
                            closed = true;
                            break;
                        }
                        if self.pos + 2 < bytes.len()
                            && bytes[self.pos + 1] == quote
                            && bytes[self.pos + 2] == quote
                        {
                            self.pos += 3;
                            closed = true;
                            break;
                        }
                        if self.pos + 2 >= bytes.len() {
                            // dangling partial closer at EOF: still unterminated
                            while self.pos < bytes.len() {
                                let rest = next_char(self.src, self.pos);
                                value.push(rest);
                                self.pos += rest.len_utf8();
                            }
                            truncated = true;
                            break;
                        }
                        value.push(ch);
                        self.pos += 1;
                    } else if ch == '\\' {
                        if raw {
                            // backslash stays in the value but still guards a
                            // following quote from closing the string
                            value.push('\\');
                            self.pos += 1;
                            if self.pos < bytes.len() {
                                let next = next_char(self.src, self.pos);
                                if next != '\n' || triple {
                                    value.push(next);
                                    self.pos += next.len_utf8();
                                }
                            }
                        } else {
                            state = ScanState::InEscape;
                            self.pos += 1;
                        }
                    } else if interp && ch == '{' {
                        if self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'{' {
                            escape_adjusts.push((value.len(), 1));
                            value.push('{');
                            self.pos += 2;
                        } else {
                            let span_start = value.len();
                            value.push('{');
                            self.pos += 1;
                            interp_spans.push(InterpSpan {
                                start: span_start,
                                end:   span_start + 1
                            });
                            state = ScanState::InInterpExpr(1);
                        }
                    } else if interp && ch == '}' {
                        if self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'}' {
                            escape_adjusts.push((value.len(), 1));
                            value.push('}');
                            self.pos += 2;
                        } else {
                            value.push('}');
                            self.pos += 1;
                        }
                    } else if ch == '\n' && !triple {
                        truncated = true;
                        break;
                    } else {
                        value.push(ch);
                        self.pos += ch_len;
                    }
                }
                ScanState::InEscape => {
                    // exactly one escaped character, then back to the string
                    let decoded = match ch {
                        'n' => Some('\n'),
                        't' => Some('\t'),
                        'r' => Some('\r'),
                        '0' => Some('\0'),
                        '\\' | '\'' | '"' => Some(ch),
                        _ => None
                    };
                    match decoded {
                        Some(d) => {
                            escape_adjusts.push((value.len(), 1 + ch_len - d.len_utf8()));
                            value.push(d);
                        }
                        None if ch == '\n' => {
                            // line continuation inside the literal
                            escape_adjusts.push((value.len(), 2));
                        }
                        None => {
                            value.push('\\');
                            value.push(ch);
                        }
                    }
                    self.pos += ch_len;
                    state = ScanState::InString;
                }
                ScanState::InInterpExpr(depth) => {
                    if ch == '\n' && !triple {
                        truncated = true;
                        break;
                    }
                    let new_depth = match ch {
                        '{' | '(' | '[' => Some(depth + 1),
                        '}' | ')' | ']' => Some(depth - 1),
                        '\'' | '"' => {
                            // skip a nested string inside the expression
                            value.push(ch);
                            self.pos += 1;
                            while self.pos < bytes.len() {
                                let inner = next_char(self.src, self.pos);
                                value.push(inner);
                                self.pos += inner.len_utf8();
                                if inner == ch {
                                    break;
                                }
                            }
                            continue;
                        }
                        _ => None
                    };
                    value.push(ch);
                    self.pos += ch_len;
                    if let Some(d) = new_depth {
                        if d == 0 {
                            if let Some(last) = interp_spans.last_mut() {
                                last.end = value.len();
                            }
                            state = ScanState::InString;
                        } else {
                            state = ScanState::InInterpExpr(d);
                        }
                    }
                }
            }
        }

        if !closed && !truncated {
            truncated = true;
        }
        if truncated && let Some(last) = interp_spans.last_mut() {
            last.end = last.end.max(value.len().min(last.start + 1));
        }

        let end = self.pos;
        let mut kind = if interp && !interp_spans.is_empty() {
            LiteralKind::Interpolated
        } else if raw {
            LiteralKind::Raw
        } else if triple {
            LiteralKind::Multiline
        } else {
            LiteralKind::Plain
        };
        if closed
            && matches!(
                kind,
                LiteralKind::Plain | LiteralKind::Raw | LiteralKind::Multiline
            )
            && has_format_application(self.src, end)
        {
            kind = LiteralKind::Formatted;
        }

        LiteralOccurrence {
            span: Span::new(start, end),
            raw: self.src[start..end].to_string(),
            kind,
            value,
            interp_spans,
            truncated,
            content_start,
            escape_adjusts
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = LiteralOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, raw, interp) = self.advance_to_literal()?;
        if raw || interp {
            // skip the prefix letters up to the quote
            let bytes = self.src.as_bytes();
            while bytes[self.pos] != b'\'' && bytes[self.pos] != b'"' {
                self.pos += 1;
            }
        }
        Some(self.scan_string(start, raw, interp))
    }
}

/// Scan a unit and synthesize combined occurrences for concatenation chains.
///
/// Fragments joined by `+` with at least one non-literal operand are each
/// reported individually (re-kinded as [`LiteralKind::ConcatFragment`]) and
/// covered by one synthesized [`LiteralKind::Concatenated`] occurrence whose
/// value holds the fragments' text with every non-literal operand marked as
/// an interpolation span.
pub fn scan_unit(unit: &SourceUnit) -> Vec<LiteralOccurrence> {
    let src = unit.text();
    let mut occurrences: Vec<LiteralOccurrence> = Scanner::new(src).collect();
    let mut synthesized = Vec::new();

    let mut i = 0;
    while i < occurrences.len() {
        let (chain_end_idx, combined) = build_chain(src, &occurrences, i);
        if let Some(combined) = combined {
            for frag in &mut occurrences[i..=chain_end_idx] {
                frag.kind = LiteralKind::ConcatFragment;
            }
            synthesized.push(combined);
        }
        i = chain_end_idx + 1;
    }

    occurrences.extend(synthesized);
    occurrences.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then_with(|| b.span.end.cmp(&a.span.end))
    });
    occurrences
}

/// Walk a `+` chain starting at fragment `i`.
///
/// Returns the index of the last literal fragment consumed and, when the
/// chain has a non-literal operand, the synthesized combined occurrence.
fn build_chain(
    src: &str,
    occurrences: &[LiteralOccurrence],
    i: usize
) -> (usize, Option<LiteralOccurrence>) {
    let first = &occurrences[i];
    if first.truncated {
        return (i, None);
    }

    // leading non-literal operands: `ident + "..."`
    let mut chain_start = first.span.start;
    let mut leading: Vec<(usize, usize)> = Vec::new();
    let mut back = chain_start;
    loop {
        let Some(plus) = skip_trivia_back(src, back).checked_sub(1) else {
            break;
        };
        if src.as_bytes().get(plus) != Some(&b'+') {
            break;
        }
        let ident_end = skip_trivia_back(src, plus);
        let Some(ident_start) = match_identifier_back(src, ident_end) else {
            break;
        };
        leading.push((ident_start, ident_end));
        chain_start = ident_start;
        back = ident_start;
    }
    leading.reverse();

    // trailing elements: (`+` (literal | ident))*
    let mut last_idx = i;
    let mut chain_end = first.span.end;
    let mut trailing: Vec<ChainElement> = Vec::new();
    let mut cursor = first.span.end;
    loop {
        let after_trivia = skip_trivia(src, cursor);
        if src.as_bytes().get(after_trivia) != Some(&b'+') {
            break;
        }
        let operand_start = skip_trivia(src, after_trivia + 1);
        if last_idx + 1 < occurrences.len()
            && occurrences[last_idx + 1].span.start == operand_start
            && !occurrences[last_idx + 1].truncated
        {
            last_idx += 1;
            trailing.push(ChainElement::Literal(last_idx));
            cursor = occurrences[last_idx].span.end;
        } else if let Some(operand_end) = match_identifier(src, operand_start) {
            trailing.push(ChainElement::NonLiteral(operand_start, operand_end));
            cursor = operand_end;
        } else {
            break;
        }
        chain_end = cursor;
    }

    let has_non_literal = !leading.is_empty()
        || trailing
            .iter()
            .any(|e| matches!(e, ChainElement::NonLiteral(..)));
    if !has_non_literal {
        return (last_idx, None);
    }

    let mut value = String::new();
    let mut interp_spans = Vec::new();
    let mut push_operand = |value: &mut String, spans: &mut Vec<InterpSpan>, text: &str| {
        let start = value.len();
        value.push_str(text);
        spans.push(InterpSpan {
            start,
            end: value.len()
        });
    };

    for &(s, e) in &leading {
        push_operand(&mut value, &mut interp_spans, &src[s..e]);
    }
    value.push_str(&occurrences[i].value);
    for element in &trailing {
        match element {
            ChainElement::Literal(idx) => value.push_str(&occurrences[*idx].value),
            ChainElement::NonLiteral(s, e) => {
                push_operand(&mut value, &mut interp_spans, &src[*s..*e]);
            }
        }
    }

    let span = Span::new(chain_start, chain_end);
    (
        last_idx,
        Some(LiteralOccurrence {
            span,
            raw: src[chain_start..chain_end].to_string(),
            kind: LiteralKind::Concatenated,
            value,
            interp_spans,
            truncated: false,
            content_start: chain_start,
            escape_adjusts: Vec::new()
        })
    )
}

enum ChainElement {
    Literal(usize),
    NonLiteral(usize, usize)
}

fn prefix_flags(ident: &str) -> Option<(bool, bool)> {
    if ident.len() > 2 {
        return None;
    }
    let mut raw = false;
    let mut interp = false;
    for c in ident.chars() {
        match c.to_ascii_lowercase() {
            'r' => raw = true,
            'f' => interp = true,
            'b' | 'u' => {}
            _ => return None
        }
    }
    Some((raw, interp))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn next_char(src: &str, pos: usize) -> char {
    src[pos..].chars().next().unwrap_or('\0')
}

fn next_char_len(src: &str, pos: usize) -> usize {
    src[pos..].chars().next().map_or(1, char::len_utf8)
}

/// Skip whitespace, backslash-newline continuations and `#` comments.
fn skip_trivia(src: &str, mut pos: usize) -> usize {
    let bytes = src.as_bytes();
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'\\' if bytes.get(pos + 1) == Some(&b'\n') => pos += 2,
            b'#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            _ => break
        }
    }
    pos
}

/// Skip whitespace and continuations backwards; returns the offset just past
/// the previous non-trivia byte.
fn skip_trivia_back(src: &str, mut pos: usize) -> usize {
    let bytes = src.as_bytes();
    while pos > 0 {
        match bytes[pos - 1] {
            b' ' | b'\t' | b'\r' => pos -= 1,
            b'\n' if pos >= 2 && bytes[pos - 2] == b'\\' => pos -= 2,
            _ => break
        }
    }
    pos
}

/// Match an identifier expression (dotted path, calls, subscripts) starting
/// at `pos`; returns the offset past its end.
fn match_identifier(src: &str, pos: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let b = *bytes.get(pos)?;
    if !b.is_ascii_alphabetic() && b != b'_' {
        return None;
    }
    let mut end = pos;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    loop {
        match bytes.get(end) {
            Some(b'.') if bytes.get(end + 1).is_some_and(|b| is_ident_byte(*b)) => {
                end += 1;
                while end < bytes.len() && is_ident_byte(bytes[end]) {
                    end += 1;
                }
            }
            Some(open @ (b'(' | b'[')) => {
                let close = if *open == b'(' { b')' } else { b']' };
                let mut depth = 0u32;
                let mut scan = end;
                loop {
                    match bytes.get(scan) {
                        Some(b) if *b == *open => depth += 1,
                        Some(b) if *b == close => {
                            depth -= 1;
                            if depth == 0 {
                                scan += 1;
                                break;
                            }
                        }
                        Some(_) => {}
                        None => return Some(end)
                    }
                    scan += 1;
                }
                end = scan;
            }
            _ => break
        }
    }
    Some(end)
}

/// Match an identifier ending just before `end`; returns its start offset.
fn match_identifier_back(src: &str, end: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    if end == 0 || !is_ident_byte(bytes[end - 1]) {
        return None;
    }
    let mut start = end;
    while start > 0 && (is_ident_byte(bytes[start - 1]) || bytes[start - 1] == b'.') {
        start -= 1;
    }
    if bytes[start].is_ascii_digit() {
        return None;
    }
    Some(start)
}

/// Whether the text following a closed literal applies `%` or `.format(...)`
/// to it, resolving values directly into the string.
fn has_format_application(src: &str, end: usize) -> bool {
    let pos = skip_trivia(src, end);
    let bytes = src.as_bytes();
    if src[pos..].starts_with(".format(") {
        return true;
    }
    if bytes.get(pos) == Some(&b'%') {
        // `%=` is augmented assignment, `%%`/format specifiers never follow a
        // closing quote directly
        return bytes.get(pos + 1) != Some(&b'=');
    }
    false
}
