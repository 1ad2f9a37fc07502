//! Gateway error types.

use thiserror::Error;

/// Error type for credential backend operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Backend rejected the API key (HTTP 401/403)
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Backend returned an RPC-level error
    #[error("Backend error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Non-success HTTP status outside the auth failures
    #[error("Backend HTTP {status}: {summary}")]
    Http { status: u16, summary: String },

    /// Response envelope had neither result nor error
    #[error("Malformed backend response: {0}")]
    Envelope(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl GatewayError {
    /// Returns true if this error is transient and the call can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Transport(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            GatewayError::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = GatewayError::Http {
            status: 503,
            summary: "len=0".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = GatewayError::Http {
            status: 404,
            summary: "len=0".to_string(),
        };
        assert!(!err.is_transient());

        assert!(!GatewayError::InvalidApiKey.is_transient());
        assert!(!GatewayError::Rpc {
            code: -32000,
            message: "nope".to_string()
        }
        .is_transient());
    }
}
