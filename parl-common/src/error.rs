//! Common error types for the viewer

use thiserror::Error;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the loader and the presentation layer
#[derive(Error, Debug)]
pub enum Error {
    /// Non-success HTTP status, or the request never got a response
    #[error("{message}")]
    Transport { url: String, message: String },

    /// Body is neither strict JSON nor sanitizable JSON
    #[error("JSON parse error: {message}")]
    Parse { url: String, message: String },

    /// No detail document can be obtained for this entity
    #[error("Details manquants: {0}")]
    MissingDetail(String),

    /// Data root points at the local filesystem instead of an HTTP server
    #[error("Local file data root cannot be fetched: {0}")]
    LocalFile(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// URL the failing request targeted, when there is one
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Transport { url, .. } | Error::Parse { url, .. } | Error::LocalFile(url) => {
                Some(url)
            }
            _ => None,
        }
    }
}
