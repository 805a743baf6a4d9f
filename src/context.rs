//! Best-effort syntactic context resolution for literal occurrences.
//!
//! The resolver looks at the local structure around a literal's span
//! (preceding assignment and identifier, enclosing call's callee, dict key,
//! `return` keyword) without a full host-language parse. Resolution never
//! fails: when nothing recognizable surrounds the literal the role is
//! [`Role::Other`] with empty identifier fields.

use std::sync::LazyLock;

use compact_str::CompactString;
use regex::Regex;

use crate::{scanner::LiteralOccurrence, source::SourceUnit};

/// Syntactic role of a literal occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Assignment,
    CallArgument,
    DictValue,
    Return,
    Other
}

/// Structural context attached to a literal occurrence.
#[derive(Debug, Clone)]
pub struct SyntacticContext {
    pub role:       Role,
    /// Assignment target or dict key the literal is bound to
    pub bound_name: Option<CompactString>,
    /// Callee name when the literal is a call argument
    pub callee:     Option<CompactString>,
    /// Enclosing function/class name chain, outermost first
    pub enclosing:  Vec<CompactString>
}

impl SyntacticContext {
    fn other() -> Self {
        Self {
            role:       Role::Other,
            bound_name: None,
            callee:     None,
            enclosing:  Vec::new()
        }
    }
}

static DEF_OR_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(?:async[ \t]+)?(def|class)[ \t]+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap_or_else(|_| Regex::new("$^").expect("empty pattern"))
});

/// Resolve the syntactic context of an occurrence within its unit.
pub fn resolve(unit: &SourceUnit, occurrence: &LiteralOccurrence) -> SyntacticContext {
    let src = unit.text();
    let start = occurrence.span.start.min(src.len());

    let mut ctx = match local_role(src, start) {
        Some(resolved) => resolved,
        None => SyntacticContext::other()
    };
    ctx.enclosing = enclosing_chain(src, start);
    ctx
}

fn local_role(src: &str, literal_start: usize) -> Option<SyntacticContext> {
    let bytes = src.as_bytes();
    let before = skip_ws_back(bytes, literal_start);
    if before == 0 {
        return None;
    }

    match bytes[before - 1] {
        b'=' => assignment_context(src, before - 1),
        b':' => dict_value_context(src, before - 1),
        b'(' | b',' => call_argument_context(src, literal_start),
        _ => {
            let word_start = ident_start_back(bytes, before);
            if &src[word_start..before] == "return" {
                Some(SyntacticContext {
                    role:       Role::Return,
                    bound_name: None,
                    callee:     None,
                    enclosing:  Vec::new()
                })
            } else {
                None
            }
        }
    }
}

/// `name = "..."`, `obj.attr = "..."` or `name: ann = "..."`.
fn assignment_context(src: &str, eq_pos: usize) -> Option<SyntacticContext> {
    let bytes = src.as_bytes();
    // reject ==, !=, <=, >=, augmented assignment except +=
    if eq_pos > 0 && matches!(bytes[eq_pos - 1], b'=' | b'!' | b'<' | b'>' | b'*' | b'/' | b'%') {
        return None;
    }
    let mut end = skip_ws_back(bytes, eq_pos);
    if end > 0 && bytes[end - 1] == b'+' {
        end = skip_ws_back(bytes, end - 1);
    }

    let mut start = ident_start_back(bytes, end);
    if start == end {
        // `name: str = ...` - skip the annotation back to the colon
        if let Some(colon) = src[..end].rfind(':') {
            let ann_end = skip_ws_back(bytes, colon);
            start = ident_start_back(bytes, ann_end);
            if start == ann_end {
                return None;
            }
            return Some(bound(&src[start..ann_end]));
        }
        return None;
    }
    Some(bound(last_path_component(&src[start..end])))
}

fn bound(name: &str) -> SyntacticContext {
    SyntacticContext {
        role:       Role::Assignment,
        bound_name: Some(CompactString::from(name)),
        callee:     None,
        enclosing:  Vec::new()
    }
}

/// `{"key": "..."}` - the key before the colon names the literal.
fn dict_value_context(src: &str, colon_pos: usize) -> Option<SyntacticContext> {
    let bytes = src.as_bytes();
    let key_end = skip_ws_back(bytes, colon_pos);
    if key_end == 0 {
        return None;
    }
    let quote = bytes[key_end - 1];
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let key_start = src[..key_end - 1].rfind(quote as char)?;
    Some(SyntacticContext {
        role:       Role::DictValue,
        bound_name: Some(CompactString::from(&src[key_start + 1..key_end - 1])),
        callee:     None,
        enclosing:  Vec::new()
    })
}

/// Walk back through balanced brackets to the enclosing call's callee.
fn call_argument_context(src: &str, literal_start: usize) -> Option<SyntacticContext> {
    let bytes = src.as_bytes();
    let mut depth = 0i32;
    let mut pos = literal_start;
    while pos > 0 {
        pos -= 1;
        match bytes[pos] {
            b')' | b']' | b'}' => depth += 1,
            b'(' if depth == 0 => {
                let callee_end = skip_ws_back(bytes, pos);
                let callee_start = ident_start_back(bytes, callee_end);
                if callee_start == callee_end {
                    return None;
                }
                return Some(SyntacticContext {
                    role:       Role::CallArgument,
                    bound_name: None,
                    callee:     Some(CompactString::from(last_path_component(
                        &src[callee_start..callee_end]
                    ))),
                    enclosing:  Vec::new()
                });
            }
            b'{' | b'[' if depth == 0 => return None,
            b'(' | b'[' | b'{' => depth -= 1,
            b'\n' if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

/// Collect `def`/`class` names above the literal with strictly decreasing
/// indentation, outermost first.
fn enclosing_chain(src: &str, literal_start: usize) -> Vec<CompactString> {
    let literal_line_start = src[..literal_start].rfind('\n').map_or(0, |p| p + 1);
    let literal_indent = indent_width(&src[literal_line_start..literal_start]);

    let mut chain = Vec::new();
    let mut max_indent = literal_indent;
    for line in src[..literal_line_start].lines().rev() {
        if let Some(caps) = DEF_OR_CLASS.captures(line) {
            let indent = indent_width(&caps[1]);
            if indent < max_indent {
                chain.push(CompactString::from(&caps[3]));
                max_indent = indent;
                if indent == 0 {
                    break;
                }
            }
        }
    }
    chain.reverse();
    chain
}

fn indent_width(prefix: &str) -> usize {
    prefix
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

fn skip_ws_back(bytes: &[u8], mut pos: usize) -> usize {
    while pos > 0 {
        match bytes[pos - 1] {
            b' ' | b'\t' | b'\r' | b'\n' => pos -= 1,
            b'\\' if pos < bytes.len() && bytes[pos] == b'\n' => pos -= 1,
            _ => break
        }
    }
    pos
}

fn ident_start_back(bytes: &[u8], end: usize) -> usize {
    let mut start = end;
    while start > 0
        && (bytes[start - 1].is_ascii_alphanumeric()
            || bytes[start - 1] == b'_'
            || bytes[start - 1] == b'.')
    {
        start -= 1;
    }
    start
}

fn last_path_component(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
