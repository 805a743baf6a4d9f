//! Heuristic SQL-vs-prose classification of literal occurrences.
//!
//! The classifier maps a literal and its syntactic context to a tagged
//! [`ClassificationResult`]: verdict, confidence score, the keywords that
//! matched, and a rationale tag. Keeping the evidence instead of collapsing
//! to a boolean lets downstream severity tuning and future rules reuse it.
//!
//! The core rule set:
//!
//! - A leading DML/DDL keyword (case-insensitive) is SQL with high
//!   confidence, regardless of context.
//! - A keyword appearing only mid-string inside otherwise prose-like text is
//!   NOT_SQL unless the density of uppercase clause keywords says otherwise.
//!   This rejects "User SELECT operation completed" while accepting
//!   "SELECT * FROM users WHERE id = 1".
//! - A leading token one edit away from a statement keyword is treated as
//!   SQL-intended so misspellings like "SELCT" reach the validator.
//! - A literal starting with a SQL comment marker is AMBIGUOUS: not
//!   executable, but worth a low-severity note rather than a silent drop.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::{
    context::SyntacticContext,
    scanner::{LiteralKind, LiteralOccurrence}
};

/// Statement-starting keywords that mark a payload as SQL.
pub const STATEMENT_KEYWORDS: [&str; 9] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "WITH", "MERGE",
];

/// Clause keywords used for mid-string density scoring.
const CLAUSE_KEYWORDS: [&str; 14] = [
    "FROM", "WHERE", "VALUES", "SET", "JOIN", "INTO", "TABLE", "ORDER", "GROUP", "BY", "LIMIT",
    "HAVING", "UNION", "ON",
];

/// Identifier fragments that suggest a SQL-bearing variable or callee.
const CONTEXT_NAMES: [&str; 6] = ["sql", "query", "statement", "stmt", "cmd", "execute"];

/// Classification verdict for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Sql,
    NotSql,
    Ambiguous
}

/// Why the classifier reached its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rationale {
    LeadingKeyword,
    LeadingKeywordTypo,
    KeywordDensity,
    ProseLike,
    CommentOnly,
    Empty,
    Truncated,
    NoEvidence
}

/// Tagged classification outcome, consumed by the downstream stages.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub verdict:          Verdict,
    pub confidence:       f64,
    pub matched_keywords: SmallVec<[CompactString; 4]>,
    pub rationale:        Rationale
}

impl ClassificationResult {
    fn new(verdict: Verdict, confidence: f64, rationale: Rationale) -> Self {
        Self {
            verdict,
            confidence,
            matched_keywords: SmallVec::new(),
            rationale
        }
    }
}

/// Classify one occurrence given its syntactic context.
///
/// Synthesized concatenation occurrences are classified on the combined text
/// of all their fragments (already merged into the occurrence value).
pub fn classify(
    occurrence: &LiteralOccurrence,
    context: &SyntacticContext
) -> ClassificationResult {
    let text = occurrence.value.trim();

    if text.is_empty() {
        return ClassificationResult::new(Verdict::NotSql, 1.0, Rationale::Empty);
    }

    if text.starts_with("--") {
        let rest = text.trim_start_matches('-').trim_start();
        if leading_keyword(rest).is_some() || contains_statement_keyword(rest) {
            let mut result =
                ClassificationResult::new(Verdict::Ambiguous, 0.5, Rationale::CommentOnly);
            collect_keywords(text, &mut result.matched_keywords);
            return result;
        }
        return ClassificationResult::new(Verdict::NotSql, 0.9, Rationale::ProseLike);
    }

    let mut result = base_classification(text);

    if occurrence.truncated && result.verdict == Verdict::Sql {
        result.verdict = Verdict::Ambiguous;
        result.rationale = Rationale::Truncated;
        result.confidence = result.confidence.min(0.6);
        return result;
    }

    // context evidence: a binding or callee named like a query holder raises
    // confidence without flipping a prose verdict
    if result.verdict == Verdict::Sql && context_matches(context) {
        result.confidence = (result.confidence + 0.2).min(1.0);
    }

    // fragments inherit whatever the combined occurrence decides; their own
    // partial text is classified only for the record
    if occurrence.kind == LiteralKind::ConcatFragment {
        result.confidence = result.confidence.min(0.8);
    }

    result
}

fn base_classification(text: &str) -> ClassificationResult {
    if let Some(keyword) = leading_keyword(text) {
        let mut result = ClassificationResult::new(Verdict::Sql, 0.95, Rationale::LeadingKeyword);
        result.matched_keywords.push(CompactString::from(keyword));
        collect_keywords(text, &mut result.matched_keywords);
        return result;
    }

    let first = first_token(text);
    if let Some(keyword) = near_statement_keyword(first) {
        let mut result =
            ClassificationResult::new(Verdict::Sql, 0.6, Rationale::LeadingKeywordTypo);
        result.matched_keywords.push(CompactString::from(keyword));
        collect_keywords(text, &mut result.matched_keywords);
        return result;
    }

    if contains_statement_keyword(text) {
        // mid-string keyword: SQL only when enough clause keywords appear in
        // SQL-typical (uppercase) form
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let clause_hits = tokens
            .iter()
            .filter(|t| {
                let trimmed = t.trim_matches(|c: char| !c.is_ascii_alphanumeric());
                CLAUSE_KEYWORDS.contains(&trimmed) && trimmed.chars().all(|c| c.is_ascii_uppercase())
            })
            .count();
        let density = clause_hits as f64 / tokens.len().max(1) as f64;
        if density >= 0.25 {
            let mut result =
                ClassificationResult::new(Verdict::Sql, 0.5 + density.min(0.3), Rationale::KeywordDensity);
            collect_keywords(text, &mut result.matched_keywords);
            return result;
        }
        return ClassificationResult::new(Verdict::NotSql, 0.8, Rationale::ProseLike);
    }

    ClassificationResult::new(Verdict::NotSql, 0.9, Rationale::NoEvidence)
}

/// First token if it is a statement keyword, case-insensitive.
fn leading_keyword(text: &str) -> Option<&'static str> {
    let first = first_token(text);
    STATEMENT_KEYWORDS
        .iter()
        .find(|k| first.eq_ignore_ascii_case(k))
        .copied()
}

fn first_token(text: &str) -> &str {
    let start = text.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(0);
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    &rest[..end]
}

fn contains_statement_keyword(text: &str) -> bool {
    text.split_whitespace().any(|t| {
        let trimmed = t.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        STATEMENT_KEYWORDS
            .iter()
            .any(|k| trimmed.eq_ignore_ascii_case(k))
    })
}

fn collect_keywords(text: &str, out: &mut SmallVec<[CompactString; 4]>) {
    for token in text.split_whitespace() {
        let trimmed = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        let upper = trimmed.to_ascii_uppercase();
        if (STATEMENT_KEYWORDS.contains(&upper.as_str())
            || CLAUSE_KEYWORDS.contains(&upper.as_str()))
            && !out.iter().any(|k| k.as_str() == upper)
        {
            out.push(CompactString::from(upper));
        }
    }
}

/// Whether a token is within edit distance one of a statement keyword.
fn near_statement_keyword(token: &str) -> Option<&'static str> {
    if token.len() < 4 {
        return None;
    }
    let upper = token.to_ascii_uppercase();
    STATEMENT_KEYWORDS
        .iter()
        .find(|k| within_one_edit(&upper, k))
        .copied()
}

fn within_one_edit(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a == b {
        return false;
    }
    match a.len().abs_diff(b.len()) {
        0 => a.iter().zip(b).filter(|(x, y)| x != y).count() == 1,
        1 => {
            let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
            let mut i = 0;
            let mut j = 0;
            let mut skipped = false;
            while i < short.len() && j < long.len() {
                if short[i] == long[j] {
                    i += 1;
                    j += 1;
                } else if skipped {
                    return false;
                } else {
                    skipped = true;
                    j += 1;
                }
            }
            true
        }
        _ => false
    }
}

fn context_matches(context: &SyntacticContext) -> bool {
    let name_matches = |name: &CompactString| {
        let lower = name.to_lowercase();
        CONTEXT_NAMES.iter().any(|n| lower.contains(n))
    };
    context.bound_name.as_ref().is_some_and(name_matches)
        || context.callee.as_ref().is_some_and(name_matches)
}
