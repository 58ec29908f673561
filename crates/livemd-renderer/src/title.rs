//! Title guessing.
//!
//! A deliberately dumb heuristic: if the very first element of the rendered
//! document is an `<h1>`, its content is the title. There is no front matter
//! or metadata parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Title used when the document does not start with a top-level heading.
pub const DEFAULT_TITLE: &str = "livemd";

/// Anchored at the start of the document, only whitespace may precede `<h1>`.
static LEADING_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A\s*<h1>(.*?)</h1>").expect("valid regex"));

/// Guess a title from rendered HTML.
///
/// Returns the content of the leading `<h1>` element verbatim, or `None` if
/// the document starts with anything else.
#[must_use]
pub fn guess_title(html: &str) -> Option<String> {
    LEADING_H1
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Guess a title from rendered HTML, falling back to `fallback`.
#[must_use]
pub fn guess_title_or(html: &str, fallback: &str) -> String {
    guess_title(html).unwrap_or_else(|| fallback.to_owned())
}
