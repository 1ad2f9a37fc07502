//! Platform authenticator seam.
//!
//! WebAuthn ceremonies ultimately run on the platform (OS passkey
//! prompt, security key). The engine only needs two operations, exposed
//! here as a dyn-compatible trait so tests can swap in fakes.

use futures_util::future::BoxFuture;
use passkey_gateway::{CreatedCredential, CreationOptions};

use crate::error::AuthResult;

/// Result of a successful assertion ceremony.
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Credential id that produced the signature.
    pub credential_id: String,
    /// Raw authenticator response, forwarded to the backend untouched.
    pub response: serde_json::Value,
}

/// Drives platform passkey ceremonies.
pub trait Authenticator: Send + Sync {
    /// Runs the creation ceremony for the given options.
    fn create(&self, options: CreationOptions) -> BoxFuture<'_, AuthResult<CreatedCredential>>;

    /// Runs an assertion ceremony against a known credential.
    ///
    /// Returns `Ok(None)` when the user dismissed the prompt.
    fn assert(&self, credential_id: &str) -> BoxFuture<'_, AuthResult<Option<Assertion>>>;
}
