//! Error types for the chat panel.

use thiserror::Error;

/// Errors surfaced by the panel flows and the HTTP transport.
///
/// The controller never catches these: a failed request or an unparsable
/// reply is handed back to whoever started the flow.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, send, timeout or body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL or endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a file for upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for panel operations.
pub type Result<T> = std::result::Result<T, Error>;
