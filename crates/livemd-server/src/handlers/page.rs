//! Preview page endpoint.
//!
//! Serves the current snapshot wrapped in the viewer page. The page carries
//! the websocket URL the viewer script connects to for further updates.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::Html;

use crate::state::AppState;

const TEMPLATE: &str = include_str!("../assets/view.html");

/// Host used in the websocket URL when the request carries none.
const DEFAULT_HOST: &str = "localhost";

/// Handle GET /.
pub(crate) async fn get_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let snapshot = state.hub.snapshot();

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .unwrap_or(DEFAULT_HOST);
    let ws_url = format!("ws://{host}/update");

    let mut title = plain_text(&snapshot.title);
    if title.trim().is_empty() {
        state.hub.fallback_title().clone_into(&mut title);
    }

    Html(render_page(&title, &escape_attribute(&ws_url), &snapshot.html))
}

/// Fill the page template in a single pass.
///
/// Substituted values are never scanned for placeholders.
fn render_page(title: &str, ws_url: &str, content: &str) -> String {
    let mut out = String::with_capacity(TEMPLATE.len() + title.len() + content.len());
    let mut rest = TEMPLATE;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        match &after[..end] {
            "title" => out.push_str(title),
            "ws_url" => out.push_str(ws_url),
            "content" => out.push_str(content),
            _ => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Drop markup from a sanitized HTML fragment, keeping entity references.
fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

/// Escape a value for a double-quoted HTML attribute.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_page_fills_placeholders() {
        let page = render_page("Notes", "ws://localhost:8081/update", "<p>Body</p>");

        assert!(page.contains("<title>Notes</title>"));
        assert!(page.contains(r#"data-ws-url="ws://localhost:8081/update""#));
        assert!(page.contains("<p>Body</p>"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_page_does_not_expand_substituted_values() {
        let page = render_page("{{content}}", "ws://h/update", "<p>{{title}}</p>");

        assert!(page.contains("<title>{{content}}</title>"));
        assert!(page.contains("<p>{{title}}</p>"));
    }

    #[test]
    fn test_plain_text_strips_tags() {
        assert_eq!(plain_text("Hello <em>World</em>"), "Hello World");
        assert_eq!(plain_text("A &amp; B"), "A &amp; B");
        assert_eq!(plain_text("<img src=\"x.png\">"), "");
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute(r#"ws://a"b<c>&'d/update"#),
            "ws://a&quot;b&lt;c&gt;&amp;&#39;d/update"
        );
    }
}
