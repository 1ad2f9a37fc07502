//! Session builder error types.

use thiserror::Error;

/// Error type for session construction and signing.
#[derive(Error, Debug)]
pub enum SessionBuildError {
    /// Bundler RPC returned an error object
    #[error("Bundler error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Bundler response was missing the expected fields
    #[error("Malformed bundler response: {0}")]
    Malformed(String),

    /// Returned account address did not parse
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionBuildError {
    /// Returns true if the build can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            SessionBuildError::Transport(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            _ => false,
        }
    }
}

/// Result type alias using SessionBuildError.
pub type SessionResult<T> = Result<T, SessionBuildError>;
