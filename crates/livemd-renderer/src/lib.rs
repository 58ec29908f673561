//! Markdown to sanitized HTML conversion for livemd.
//!
//! The crate exposes two pure functions used by the live preview pipeline:
//!
//! - [`render`]: markdown bytes to HTML that is safe to hand to a browser
//! - [`guess_title`]: best-effort page title from rendered HTML
//!
//! # Dialect
//!
//! Markdown is parsed as plain `CommonMark` with every `pulldown-cmark` extension
//! disabled, so the same input always renders the same way regardless of how
//! the crate is configured.
//!
//! # Example
//!
//! ```
//! use livemd_renderer::{guess_title_or, render};
//!
//! let html = render(b"# Hello\n\nSome *text*");
//! assert_eq!(guess_title_or(&html, "livemd"), "Hello");
//! ```

mod markdown;
mod sanitize;
mod title;

pub use markdown::render;
pub use sanitize::sanitize;
pub use title::{DEFAULT_TITLE, guess_title, guess_title_or};
