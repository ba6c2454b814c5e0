//! Server errors.

/// Error returned by the server and the source watcher.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Failed to watch sources: {0}")]
    Watch(#[from] notify::Error),
}
