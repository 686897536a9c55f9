//! Decoding of the semi-structured `substances` cell.
//!
//! Cells usually hold a bracketed, single-quoted pseudo-list such as
//! `['Fentanyl', 'Xylazine']`, but hand-edited exports also contain
//! unquoted comma lists, half-quoted fragments and stray brackets. Decoding is
//! an ordered chain of attempts, each of which always returns; the first one
//! that applies wins, and the worst case is an empty list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'([^']*)'|"([^"]*)""#).expect("valid quoted-fragment regex"));

/// One decoding attempt: `Some` when it applies.
type Attempt = fn(&str) -> Option<Vec<String>>;

const ATTEMPTS: &[Attempt] = &[empty_marker, structured, quoted_fragments, comma_split];

/// Decode a raw substances cell into its labels.
///
/// Labels are returned as written (not normalized); callers normalize.
pub fn parse_substance_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();

    ATTEMPTS
        .iter()
        .find_map(|attempt| attempt(trimmed))
        .unwrap_or_default()
}

fn empty_marker(s: &str) -> Option<Vec<String>> {
    (s.is_empty() || s == "[]").then(Vec::new)
}

/// Strict parse after mapping every quote character to `"`.
fn structured(s: &str) -> Option<Vec<String>> {
    let standard: String = s
        .chars()
        .map(|c| match c {
            '\'' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect();

    match serde_json::from_str::<Value>(&standard).ok()? {
        Value::Array(items) => Some(items.into_iter().map(value_to_label).collect()),
        Value::Null => Some(Vec::new()),
        scalar => Some(vec![value_to_label(scalar)]),
    }
}

fn value_to_label(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn quoted_fragments(s: &str) -> Option<Vec<String>> {
    let labels: Vec<String> = QUOTED
        .captures_iter(s)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|label| !label.is_empty())
        .collect();

    (!labels.is_empty()).then_some(labels)
}

fn comma_split(s: &str) -> Option<Vec<String>> {
    let stripped: String = s
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect();

    Some(
        stripped
            .split(',')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
