//! HTML sanitization.
//!
//! Strips everything a browser could execute from converted markdown: script
//! and style elements (including their content), event handler attributes and
//! links with schemes outside [`URL_SCHEMES`].

use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::Builder;

/// URL schemes allowed in `href` and `src` attributes.
const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Policy for user-generated content, built once and shared.
static POLICY: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder
        .url_schemes(URL_SCHEMES.iter().copied().collect::<HashSet<_>>())
        .link_rel(Some("noopener noreferrer"))
        // Fenced code blocks carry their info string as `language-*`
        .add_tag_attributes("code", &["class"]);
    builder
});

/// Sanitize an HTML fragment.
#[must_use]
pub fn sanitize(html: &str) -> String {
    POLICY.clean(html).to_string()
}
