//! HTTP request handlers.

pub(crate) mod assets;
pub(crate) mod page;
pub(crate) mod update;
