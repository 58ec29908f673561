//! CLI command implementations.

pub(crate) mod preview;

pub(crate) use preview::PreviewArgs;
