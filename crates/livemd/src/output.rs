//! Human-facing startup and error lines on stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    url: Style,
    warning: Style,
    error: Style,
}

impl Output {
    /// Create a new output formatter writing to stderr.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            url: Style::new().cyan().bold(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
        }
    }

    /// Report which config file was picked up.
    pub(crate) fn config(&self, path: &Path) {
        self.line(&format!("Config: {}", path.display()));
    }

    /// Report the file being watched, as given on the command line.
    pub(crate) fn watching(&self, path: &Path) {
        self.line(&format!("Watching \"{}\" for changes", path.display()));
    }

    /// Report the preview URL.
    pub(crate) fn serving(&self, url: &str) {
        self.line(&format!("Serving on {}", self.url.apply_to(url)));
    }

    /// Print a non-fatal problem (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warning.apply_to(msg).to_string());
    }

    /// Print the error that ends the process (red).
    pub(crate) fn fatal(&self, err: &dyn Display) {
        self.line(&self.error.apply_to(format!("Error: {err}")).to_string());
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }
}
