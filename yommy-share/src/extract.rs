//! URL extraction from shared content.
//!
//! A miss is a normal result (`None`), never an error.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{RawShareInput, SharedUrl};

/// `http`/`https` followed by `://` and a run of URL characters
/// (unreserved, percent-encoded, sub-delims and gen-delims). ASCII only.
const URL_PATTERN: &str = r"https?://[A-Za-z0-9_\-.~:/?#\[\]@!$&'()*+,;=%]+";

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"))
}

/// Produces zero or one URL from raw shared content.
pub fn extract(input: &RawShareInput) -> Option<SharedUrl> {
    match input {
        RawShareInput::Url(value) => SharedUrl::new(value.as_str()),
        RawShareInput::Text(text) => extract_from_text(text),
    }
}

/// Returns the leftmost `http(s)://` match in `text`.
///
/// Without a match, text whose trimmed form starts with `"http"` is returned
/// whole and unmodified. This fallback is knowingly over-broad: it accepts
/// strings such as `"httpnotaurl but still"`.
pub fn extract_from_text(text: &str) -> Option<SharedUrl> {
    if let Some(found) = find_first_url(text) {
        return SharedUrl::new(found);
    }
    if text.trim().starts_with("http") {
        return SharedUrl::new(text);
    }
    None
}

/// Leftmost scheme-prefixed URL substring, if any. Later matches are ignored.
pub fn find_first_url(text: &str) -> Option<&str> {
    url_regex().find(text).map(|m| m.as_str())
}
