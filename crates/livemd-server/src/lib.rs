//! HTTP server for livemd.
//!
//! Serves a live preview of a single markdown file:
//! - `GET /` renders the current snapshot into the viewer page
//! - `GET /update` upgrades to a websocket that pushes every new snapshot
//! - `GET /assets/*` serves the viewer script and stylesheet
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use livemd_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         target: PathBuf::from("README.md"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Startup order
//!
//! [`PreviewServer::bind`] performs the initial render, starts the change
//! watcher and binds the listener, in that order. Any failure along the way
//! aborts startup before a single request is served.

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use livemd_preview::{
    BroadcastPipeline, ChangeWatcher, DocumentSource, FsSource, PipelineEvent, PreviewHub,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub use error::ServerError;
use state::AppState;

/// Capacity of the watcher to pipeline channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on (0 picks a free port).
    pub port: u16,
    /// Markdown file to preview.
    pub target: PathBuf,
    /// Title used when the document has no leading heading.
    pub fallback_title: String,
    /// Window for folding rapid writes into one render.
    pub debounce: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8081,
            target: PathBuf::new(),
            fallback_title: livemd_preview::DEFAULT_TITLE.to_owned(),
            debounce: Duration::ZERO,
        }
    }
}

impl ServerConfig {
    /// Build the server configuration for `target` from loaded settings.
    #[must_use]
    pub fn from_config(config: &livemd_config::Config, target: PathBuf) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            target,
            fallback_title: config.preview.fallback_title.clone(),
            debounce: Duration::from_millis(config.preview.debounce_ms),
        }
    }
}

/// A preview server that has rendered its document and bound its listener.
pub struct PreviewServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
    _watcher: ChangeWatcher,
}

impl PreviewServer {
    /// Render the target, start watching it and bind the listener.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Preview`] if the target cannot be resolved, read
    /// or watched, and [`ServerError::Address`] or [`ServerError::Bind`] if
    /// the listener cannot be set up.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let source: Arc<dyn DocumentSource> = Arc::new(FsSource::open(&config.target)?);
        let hub = Arc::new(PreviewHub::new(config.fallback_title.clone()));

        let mut pipeline = BroadcastPipeline::new(Arc::clone(&source), Arc::clone(&hub))
            .with_debounce(config.debounce);
        pipeline.initialize()?;

        let (events_tx, events_rx) = mpsc::channel::<PipelineEvent>(EVENT_CHANNEL_CAPACITY);
        let watcher = ChangeWatcher::start(source.path(), events_tx)?;
        tokio::spawn(pipeline.run(events_rx));

        let addr = format!("{}:{}", config.host, config.port);
        let resolved = resolve_addr(&config.host, config.port)
            .await
            .map_err(|source| ServerError::Address {
                addr: addr.clone(),
                source,
            })?;

        let listener = TcpListener::bind(resolved)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!(address = %local_addr, "Listening");

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(AppState { hub }),
            _watcher: watcher,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Hub holding the current snapshot and the connected viewers.
    #[must_use]
    pub fn hub(&self) -> &Arc<PreviewHub> {
        &self.state.hub
    }

    /// URL a browser on this machine can open.
    #[must_use]
    pub fn url(&self) -> String {
        let ip = self.local_addr.ip();
        if ip.is_unspecified() {
            format!("http://localhost:{}/", self.local_addr.port())
        } else {
            format!("http://{}/", self.local_addr)
        }
    }

    /// Serve requests until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] if the server stops with an I/O error.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve requests until `signal` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] if the server stops with an I/O error.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = app::create_router(self.state);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(ServerError::Serve)
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the server fails to start or stops with an I/O error.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    PreviewServer::bind(config).await?.serve().await
}

/// Resolve `host:port`, accepting names as well as literal addresses.
async fn resolve_addr(host: &str, port: u16) -> std::io::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address found"))
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn config_for(target: PathBuf) -> ServerConfig {
        ServerConfig {
            port: 0,
            target,
            ..ServerConfig::default()
        }
    }

    async fn fetch_root(addr: SocketAddr) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: preview.test\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_from_config() {
        let mut config = livemd_config::Config::default();
        config.server.port = 9000;
        config.preview.fallback_title = "Draft".to_owned();
        config.preview.debounce_ms = 150;

        let server_config = ServerConfig::from_config(&config, PathBuf::from("notes.md"));

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 9000);
        assert_eq!(server_config.target, PathBuf::from("notes.md"));
        assert_eq!(server_config.fallback_title, "Draft");
        assert_eq!(server_config.debounce, Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_bind_missing_target_fails() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = PreviewServer::bind(config_for(temp_dir.path().join("missing.md"))).await;

        assert!(matches!(result, Err(ServerError::Preview(_))));
    }

    #[tokio::test]
    async fn test_bind_invalid_host_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("notes.md");
        fs::write(&target, "# Notes").unwrap();
        let config = ServerConfig {
            host: "not a host".to_owned(),
            ..config_for(target)
        };

        let result = PreviewServer::bind(config).await;

        assert!(matches!(result, Err(ServerError::Address { .. })));
    }

    #[tokio::test]
    async fn test_serves_rendered_page() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("notes.md");
        fs::write(&target, "# Notes\n\nHello").unwrap();

        let server = PreviewServer::bind(config_for(target)).await.unwrap();
        let addr = server.local_addr();
        assert_eq!(server.url(), format!("http://{addr}/"));

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(async move {
            let _ = stop_rx.await;
        }));

        let response = fetch_root(addr).await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("<title>Notes</title>"));
        assert!(response.contains("<p>Hello</p>"));
        assert!(response.contains("ws://preview.test/update"));

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
