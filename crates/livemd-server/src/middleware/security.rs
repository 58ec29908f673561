//! Security headers middleware.
//!
//! Every response carries a content security policy that only lets the page
//! run its own viewer script and talk to the update websocket, plus
//! `nosniff` and a frame ban.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy header value.
///
/// Rendered documents may reference remote images; nothing else leaves the
/// origin except the update websocket.
const CSP: &str = "default-src 'self'; \
                   script-src 'self'; \
                   style-src 'self'; \
                   img-src 'self' data: http: https:; \
                   connect-src 'self' ws: wss:; \
                   object-src 'none'; \
                   frame-ancestors 'none'";

/// Headers set on every response, overriding whatever a handler set.
const HEADERS: [(&str, &str); 3] = [
    ("content-security-policy", CSP),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
];

/// One header layer per entry in [`HEADERS`].
pub(crate) fn header_layers() -> impl Iterator<Item = SetResponseHeaderLayer<HeaderValue>> {
    HEADERS.into_iter().map(|(name, value)| {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        )
    })
}
