//! Credential backend client for the GreenGoods authentication engine.
//!
//! This crate provides:
//! - Wire types for passkey credentials and registration ceremonies
//! - The `CredentialGateway` seam the auth engine calls through
//! - `PasskeyGateway`, the JSON-RPC-over-POST reference client

mod client;
mod error;
mod types;

pub use client::PasskeyGateway;
pub use error::{GatewayError, GatewayResult};
pub use types::{CreatedCredential, CreationOptions, Credential};

use futures_util::future::BoxFuture;

/// Remote credential storage and verification.
///
/// The engine only ever talks to the backend through this trait so tests can
/// swap in an in-memory fake.
pub trait CredentialGateway: Send + Sync {
    /// Request registration parameters for a new credential.
    fn start_registration<'a>(
        &'a self,
        user_name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<CreationOptions>>;

    /// Submit a freshly created credential for verification and storage.
    fn verify_registration<'a>(
        &'a self,
        credential: &'a CreatedCredential,
        user_name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Credential>>;

    /// Fetch the stored credentials for a username. An empty list means the
    /// account is unknown (or was revoked), not an error.
    fn get_credentials<'a>(
        &'a self,
        user_name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<Credential>>>;
}
