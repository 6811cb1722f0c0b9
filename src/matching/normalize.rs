//! Organization name normalization.
//!
//! The normalized form exists only for comparison; display always uses
//! the raw name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Organizational suffix tokens removed during normalization. Matched as
/// whole words only, so "coinc" or "incorporated" are never touched.
pub const ORG_SUFFIX_STOPLIST: [&str; 8] =
    ["inc", "ltd", "llc", "co", "corp", "group", "plc", "limited"];

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());
static SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b({})\b", ORG_SUFFIX_STOPLIST.join("|"))).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Map a raw organization name to its canonical comparison form.
///
/// Lower-cases the string, strips every character that is not an ASCII
/// letter, digit, or whitespace, removes whole-word organizational
/// suffixes, collapses runs of whitespace, and trims. Total, pure, and
/// idempotent.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lowered, "");
    let without_suffixes = SUFFIX_RE.replace_all(&stripped, "");
    let collapsed = WHITESPACE_RE.replace_all(&without_suffixes, " ");
    collapsed.trim().to_string()
}
