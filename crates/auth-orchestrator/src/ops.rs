//! Async operations invoked by machine effects.
//!
//! Each operation runs on its own task and reports back through a
//! settlement event. Operations are written to be abandonable: the
//! engine drops stale settlements, so a mid-flight sign-out simply
//! orphans the task.

use std::sync::Arc;

use alloy::primitives::Bytes;
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::{debug, info, warn};

use account_session::{SessionBuilder, SigningSession};
use gardener_storage::{AuthMode, SessionVault};
use passkey_gateway::CredentialGateway;

use crate::authenticator::Authenticator;
use crate::config::Config;
use crate::error::{AuthError, AuthResult};
use crate::event::PasskeySession;

sol! {
    /// Minimal registrar surface for subname claims.
    function register(string name, address owner);
}

/// Shared dependencies for all operations.
pub struct Ops {
    pub gateway: Arc<dyn CredentialGateway>,
    pub authenticator: Arc<dyn Authenticator>,
    pub builder: Arc<dyn SessionBuilder>,
    pub vault: Arc<SessionVault>,
    pub config: Config,
}

impl Ops {
    /// Silent session restore.
    ///
    /// Never surfaces an error: any failure reads as "no session".
    /// Transient failures are retried with exponential backoff; an
    /// empty credential list is authoritative and clears the stored
    /// username so later launches skip the network round trip.
    pub async fn restore_session(&self) -> Option<PasskeySession> {
        let user_name = match self.vault.user_name() {
            Ok(Some(name)) => name,
            Ok(None) => {
                debug!("No stored username; skipping session restore");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "Session store unreadable; skipping restore");
                return None;
            }
        };

        let attempts = 1 + self.config.restore_max_retries;
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.restore_delay_for_attempt(attempt - 1)).await;
            }
            let result = tokio::time::timeout(
                self.config.restore_attempt_timeout,
                self.try_restore(&user_name),
            )
            .await;
            match result {
                Ok(Ok(outcome)) => return outcome,
                Ok(Err(err)) => {
                    warn!(attempt, error = %err, "Session restore attempt failed");
                }
                Err(_) => {
                    warn!(attempt, "Session restore attempt timed out");
                }
            }
        }
        None
    }

    /// One restore attempt. `Ok(None)` means the backend answered and
    /// no credential exists; `Err` means the attempt should be retried.
    async fn try_restore(&self, user_name: &str) -> AuthResult<Option<PasskeySession>> {
        let credentials = self.gateway.get_credentials(user_name).await?;
        let Some(credential) = credentials.into_iter().next() else {
            info!(user_name, "No stored credential on the backend; clearing handle");
            if let Err(err) = self.vault.clear_user_name() {
                warn!(error = %err, "Failed to clear stale username handle");
            }
            return Ok(None);
        };

        let session = self.builder.build(&credential, self.config.chain_id).await?;
        self.vault.set_auth_mode(AuthMode::Passkey)?;
        info!(account = %session.address, "Session restored");
        Ok(Some(PasskeySession {
            credential,
            user_name: Some(user_name.to_string()),
            session,
        }))
    }

    /// Full passkey registration ceremony.
    pub async fn register_passkey(&self, user_name: Option<String>) -> AuthResult<PasskeySession> {
        let user_name = user_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AuthError::Config("userName is required for registration".into()))?;

        let options = self.gateway.start_registration(&user_name).await?;
        let created = self.authenticator.create(options).await?;
        let credential = self.gateway.verify_registration(&created, &user_name).await?;
        let session = self.builder.build(&credential, self.config.chain_id).await?;

        self.vault.set_user_name(&user_name)?;
        self.vault.set_auth_mode(AuthMode::Passkey)?;
        info!(user_name, account = %session.address, "Passkey account registered");

        Ok(PasskeySession {
            credential,
            user_name: Some(user_name),
            session,
        })
    }

    /// Full passkey authentication ceremony.
    pub async fn authenticate_passkey(
        &self,
        user_name: Option<String>,
    ) -> AuthResult<PasskeySession> {
        let user_name = user_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AuthError::Config("userName is required for authentication".into()))?;

        let credentials = self.gateway.get_credentials(&user_name).await?;
        let Some(credential) = credentials.into_iter().next() else {
            return Err(AuthError::AccountNotFound(user_name));
        };

        let assertion = tokio::time::timeout(
            self.config.assertion_timeout,
            self.authenticator.assert(&credential.id),
        )
        .await
        .map_err(|_| AuthError::Timeout)?;
        let Some(assertion) = assertion? else {
            return Err(AuthError::Cancelled);
        };
        debug!(credential_id = %assertion.credential_id, "Assertion ceremony completed");

        let session = self.builder.build(&credential, self.config.chain_id).await?;

        self.vault.set_user_name(&user_name)?;
        self.vault.set_auth_mode(AuthMode::Passkey)?;
        info!(user_name, account = %session.address, "Passkey authentication succeeded");

        Ok(PasskeySession {
            credential,
            user_name: Some(user_name),
            session,
        })
    }

    /// Submits the ENS subname claim through the session's sponsored
    /// call path. A missing registrar configuration is a quiet no-op.
    pub async fn claim_ens(
        &self,
        signer: Arc<dyn SigningSession>,
        name: String,
    ) -> AuthResult<()> {
        let Some(registrar) = self.config.ens_registrar else {
            debug!("No ENS registrar configured; skipping claim");
            return Ok(());
        };

        let call = registerCall {
            name: name.clone(),
            owner: signer.address(),
        };
        let data = Bytes::from(call.abi_encode());

        let hash = signer
            .send_call(registrar, data)
            .await
            .map_err(|err| AuthError::EnsClaim(err.to_string()))?;
        info!(name, hash = %hash, "ENS claim submitted");
        Ok(())
    }
}
