//! Preview command: render, watch and serve one markdown file.

use std::path::PathBuf;

use clap::Args;
use livemd_config::{CliSettings, Config};
use livemd_server::{PreviewServer, ServerConfig};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for previewing a file.
#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// Markdown file to preview.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Open a browser window with the markdown document.
    #[arg(short, long)]
    pub browser: bool,

    /// Port to start the web server on (overrides config, default: 8081).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config, default: 127.0.0.1).
    #[arg(long)]
    pub host: Option<String>,

    /// Path to configuration file (default: auto-discover livemd.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fold writes arriving within this many milliseconds into one render.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl PreviewArgs {
    /// Settings that override the configuration file.
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            open_browser: self.browser.then_some(true),
            debounce_ms: self.debounce_ms,
        }
    }

    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            output.config(path);
        }

        let server_config = ServerConfig::from_config(&config, self.file.clone());
        let server = PreviewServer::bind(server_config).await?;

        output.watching(&self.file);
        let url = server.url();
        output.serving(&url);

        if config.server.open_browser {
            tracing::debug!(%url, "Opening browser");
            if let Err(err) = open::that_detached(&url) {
                output.warning(&format!("Could not open browser: {err}"));
            }
        }

        server.serve().await?;
        Ok(())
    }
}
