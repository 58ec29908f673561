//! Markdown conversion.

use pulldown_cmark::{Options, Parser, html};

use crate::sanitize::sanitize;

/// Render markdown bytes to sanitized HTML.
///
/// Invalid UTF-8 sequences are replaced with `U+FFFD` rather than rejected;
/// no input is a hard error in `CommonMark`.
#[must_use]
pub fn render(markdown: &[u8]) -> String {
    let source = String::from_utf8_lossy(markdown);
    let parser = Parser::new_ext(&source, Options::empty());

    let mut unsafe_html = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut unsafe_html, parser);

    sanitize(&unsafe_html)
}
