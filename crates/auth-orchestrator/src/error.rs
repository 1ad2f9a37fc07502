//! Authentication error types.

use account_session::SessionBuildError;
use gardener_storage::StorageError;
use passkey_gateway::GatewayError;
use serde::Serialize;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing required input (programmer error, not user-facing)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No stored credential exists for the username
    #[error("No passkey found for \"{0}\"")]
    AccountNotFound(String),

    /// The biometric prompt was dismissed or denied
    #[error("Authentication was cancelled")]
    Cancelled,

    /// An operation-level timeout elapsed
    #[error("Operation timed out")]
    Timeout,

    /// Platform credential API failure
    #[error("Authenticator error: {0}")]
    Authenticator(String),

    /// Credential backend failure
    #[error("Credential backend error: {0}")]
    Gateway(#[from] GatewayError),

    /// Smart-account session construction failure
    #[error("Session build failed: {0}")]
    SessionBuild(#[from] SessionBuildError),

    /// Session storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// ENS claim failure (non-fatal; does not evict the session)
    #[error("ENS claim failed: {0}")]
    EnsClaim(String),
}

/// Coarse error category driving user-visible consequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller misuse; fail fast, not retryable.
    Configuration,
    /// Backend/network trouble; retry is reasonable.
    Transient,
    /// User dismissed the biometric prompt; retry permitted, message differs.
    Cancelled,
    /// Unknown account; suggest registration instead of retry.
    AccountNotFound,
    /// Reported but does not change auth state.
    NonFatal,
}

impl AuthError {
    /// Classify this error per the engine's taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Config(_) => ErrorKind::Configuration,
            AuthError::AccountNotFound(_) => ErrorKind::AccountNotFound,
            AuthError::Cancelled => ErrorKind::Cancelled,
            AuthError::EnsClaim(_) => ErrorKind::NonFatal,
            AuthError::Timeout
            | AuthError::Authenticator(_)
            | AuthError::Gateway(_)
            | AuthError::SessionBuild(_)
            | AuthError::Storage(_) => ErrorKind::Transient,
        }
    }

    /// Returns true if the failed operation can be retried as-is.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Timeout => true,
            AuthError::Gateway(e) => e.is_transient(),
            AuthError::SessionBuild(e) => e.is_transient(),
            AuthError::Authenticator(_) | AuthError::Storage(_) => false,
            _ => false,
        }
    }

    /// Human-readable message for the UI.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::AccountNotFound => {
                "No passkey found for this account. Create an account instead.".to_string()
            }
            ErrorKind::Cancelled => "Authentication was cancelled.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

/// Cloneable view of an [`AuthError`] carried in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthFailure {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&AuthError> for AuthFailure {
    fn from(err: &AuthError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_not_retryable() {
        let err = AuthError::Config("userName is required".to_string());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_transient());
    }

    #[test]
    fn cancellation_is_distinct_from_network_failure() {
        assert_eq!(AuthError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(AuthError::Timeout.kind(), ErrorKind::Transient);
        assert_ne!(AuthError::Cancelled.kind(), AuthError::Timeout.kind());
    }

    #[test]
    fn account_not_found_suggests_registration() {
        let err = AuthError::AccountNotFound("alice".to_string());
        assert_eq!(err.kind(), ErrorKind::AccountNotFound);
        assert!(err.user_message().contains("Create an account"));
    }

    #[test]
    fn ens_failure_is_non_fatal() {
        let err = AuthError::EnsClaim("registrar reverted".to_string());
        assert_eq!(err.kind(), ErrorKind::NonFatal);
    }

    #[test]
    fn failure_view_is_cloneable() {
        let err = AuthError::Cancelled;
        let failure = AuthFailure::from(&err);
        assert_eq!(failure.kind, ErrorKind::Cancelled);
        assert_eq!(failure.clone(), failure);
    }
}
