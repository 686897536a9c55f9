//! Free-text canonicalization for join keys and substance labels.
//!
//! City names, state names and substance labels all pass through
//! [`normalize_text`] so that case, diacritic, spacing and "County" suffix
//! variants from independently sourced datasets collapse to one key.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const COUNTY_SUFFIX: &str = " county";

/// Canonicalize a free-text value.
///
/// Lowercases, decomposes (NFKD) and drops combining marks, removes
/// abbreviation dots, collapses whitespace runs to a single space, trims, and
/// strips trailing `county` words. `None` and the literal `"nan"` (how empty
/// spreadsheet cells are often exported) yield the empty string.
///
/// Total and idempotent: `normalize_text(Some(&normalize_text(x))) == normalize_text(x)`.
pub fn normalize_text(value: Option<&str>) -> String {
    let Some(raw) = value else {
        return String::new();
    };

    let folded = strip_marks(&strip_marks(raw).to_lowercase());
    let mut collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    while collapsed.ends_with(COUNTY_SUFFIX) {
        collapsed.truncate(collapsed.len() - COUNTY_SUFFIX.len());
        collapsed.truncate(collapsed.trim_end().len());
    }

    if collapsed == "nan" {
        return String::new();
    }
    collapsed
}

/// NFKD-decompose and drop combining marks and abbreviation dots.
fn strip_marks(value: &str) -> String {
    value
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch) && *ch != '.')
        .collect()
}

/// Gazetteer join key: normalized (city, state).
pub type JoinKey = (String, String);

/// Build the gazetteer join key for a (city, state) pair.
pub fn join_key(city: Option<&str>, state: Option<&str>) -> JoinKey {
    (normalize_text(city), normalize_text(state))
}
