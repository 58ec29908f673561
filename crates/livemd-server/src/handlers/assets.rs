//! Viewer script and stylesheet.
//!
//! Both are compiled into the binary; the page loads them from `/assets/`
//! because the content security policy forbids inline scripts.

use axum::http::header;
use axum::response::IntoResponse;

const SCRIPT: &str = include_str!("../assets/livemd.js");
const STYLESHEET: &str = include_str!("../assets/livemd.css");

/// Handle GET /assets/livemd.js.
pub(crate) async fn get_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        SCRIPT,
    )
}

/// Handle GET /assets/livemd.css.
pub(crate) async fn get_stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
