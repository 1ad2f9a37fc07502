//! Mutable context carried alongside the machine state.

use std::sync::Arc;

use account_session::SigningSession;
use alloy::primitives::Address;
use passkey_gateway::Credential;

use crate::error::AuthError;

/// Extended state for the auth machine.
///
/// Session fields (`credential` .. `wallet_address`) describe the live
/// session and are cleared together on sign-out. External wallet fields
/// track the wagmi-style connector independently of whether the session
/// itself is wallet-backed.
pub struct AuthContext {
    /// Chain every session is built for.
    pub chain_id: u64,
    /// Passkey credential backing the session, passkey mode only.
    pub credential: Option<Credential>,
    /// Display name chosen at registration.
    pub user_name: Option<String>,
    /// Smart account address, passkey mode only.
    pub smart_account_address: Option<Address>,
    /// Sponsored-call client, passkey mode only.
    pub signing_client: Option<Arc<dyn SigningSession>>,
    /// Session wallet address, wallet mode only.
    pub wallet_address: Option<Address>,
    /// Whether an external wallet connector is currently attached.
    pub external_wallet_connected: bool,
    /// Address of the attached external wallet, if any.
    pub external_wallet_address: Option<Address>,
    /// Last operation failure, `Error` state only.
    pub error: Option<AuthError>,
    /// Consecutive failed authentication attempts.
    pub retry_count: u32,
    /// Failed attempts after which `Retry` gives up, from the engine
    /// configuration.
    pub max_auth_retries: u32,
    /// Generation counter for in-flight operations. Settlement events
    /// carrying a stale sequence are dropped.
    pub op_seq: u64,
}

impl AuthContext {
    pub fn new(chain_id: u64, max_auth_retries: u32) -> Self {
        Self {
            chain_id,
            max_auth_retries,
            credential: None,
            user_name: None,
            smart_account_address: None,
            signing_client: None,
            wallet_address: None,
            external_wallet_connected: false,
            external_wallet_address: None,
            error: None,
            retry_count: 0,
            op_seq: 0,
        }
    }

    /// Clears all session fields. External wallet tracking and the
    /// operation sequence are left untouched.
    pub fn clear_session(&mut self) {
        self.credential = None;
        self.user_name = None;
        self.smart_account_address = None;
        self.signing_client = None;
        self.wallet_address = None;
        self.error = None;
        self.retry_count = 0;
    }

    /// Bumps and returns the operation sequence. Called once per
    /// spawned operation; any prior in-flight settlement becomes stale.
    pub fn next_seq(&mut self) -> u64 {
        self.op_seq += 1;
        self.op_seq
    }

    /// A passkey session and a wallet session must never coexist.
    pub(crate) fn assert_exclusive(&self) {
        debug_assert!(
            self.signing_client.is_none() || self.wallet_address.is_none(),
            "passkey and wallet session fields populated simultaneously"
        );
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("chain_id", &self.chain_id)
            .field("credential", &self.credential.as_ref().map(|c| &c.id))
            .field("user_name", &self.user_name)
            .field("smart_account_address", &self.smart_account_address)
            .field("has_signing_client", &self.signing_client.is_some())
            .field("wallet_address", &self.wallet_address)
            .field("external_wallet_connected", &self.external_wallet_connected)
            .field("external_wallet_address", &self.external_wallet_address)
            .field("error", &self.error)
            .field("retry_count", &self.retry_count)
            .field("op_seq", &self.op_seq)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_session_keeps_external_wallet_tracking() {
        let mut ctx = AuthContext::new(42_161, 3);
        ctx.user_name = Some("fern".into());
        ctx.wallet_address = Some(Address::ZERO);
        ctx.external_wallet_connected = true;
        ctx.external_wallet_address = Some(Address::ZERO);
        ctx.retry_count = 2;

        ctx.clear_session();

        assert!(ctx.user_name.is_none());
        assert!(ctx.wallet_address.is_none());
        assert_eq!(ctx.retry_count, 0);
        assert!(ctx.external_wallet_connected);
        assert!(ctx.external_wallet_address.is_some());
    }

    #[test]
    fn next_seq_is_monotonic() {
        let mut ctx = AuthContext::new(1, 3);
        assert_eq!(ctx.next_seq(), 1);
        assert_eq!(ctx.next_seq(), 2);
        assert_eq!(ctx.op_seq, 2);
    }
}
