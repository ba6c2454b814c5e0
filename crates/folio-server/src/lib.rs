//! Local HTTP server for Folio sites.
//!
//! Serves a built output directory with `tower-http` and, in watch mode,
//! rebuilds it when sources change:
//!
//! ```text
//! Browser ──HTTP──► axum router ──► ServeDir(output_dir)
//!                                        ▲
//! notify ──► SourceWatcher ──► rebuild ──┘
//! ```

mod app;
mod error;
mod security;
mod watch;

use std::path::PathBuf;

pub use app::create_router;
pub use error::ServerError;
pub use watch::{DEFAULT_DEBOUNCE, SourceWatcher};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built site to serve.
    pub root: PathBuf,
    /// URL prefix the site is mounted under.
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            root: PathBuf::from("dist"),
            base_path: "/".to_owned(),
        }
    }
}

impl ServerConfig {
    /// `host:port`, with IPv6 hosts bracketed.
    #[must_use]
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Serve `config.root` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let app = create_router(&config.root, &config.base_path);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.address(),
            source,
        })?;
    tracing::info!(address = %config.address(), root = %config.root.display(), "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

/// Wait for Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
