//! Point-in-time view of the auth machine for consumers.

use std::sync::Arc;

use account_session::SigningSession;
use alloy::primitives::Address;
use gardener_storage::AuthMode;

use crate::context::AuthContext;
use crate::error::AuthFailure;
use crate::state::{AuthPhase, AuthState};

/// Everything a consumer needs to render auth state, published through a
/// watch channel on every transition.
#[derive(Clone)]
pub struct AuthSnapshot {
    /// Current machine state.
    pub phase: AuthPhase,
    /// Dotted state path, e.g. `authenticated.passkey`.
    pub state_name: &'static str,
    /// Which mode owns the session, if one is live.
    pub auth_mode: Option<AuthMode>,
    /// Registered display name, passkey mode only.
    pub user_name: Option<String>,
    /// Smart account address, passkey mode only.
    pub smart_account_address: Option<Address>,
    /// Sponsored-call handle, passkey mode only.
    pub signing_client: Option<Arc<dyn SigningSession>>,
    /// Session wallet address, wallet mode only.
    pub wallet_address: Option<Address>,
    /// Whether an external wallet connector is attached.
    pub external_wallet_connected: bool,
    /// Address of the attached external connector, if any.
    pub external_wallet_address: Option<Address>,
    /// Last failure, if one is being shown.
    pub error: Option<AuthFailure>,
    /// Consecutive failed authentication attempts.
    pub retry_count: u32,
    /// True while a login flow is in progress.
    pub is_authenticating: bool,
    /// True when a session is live.
    pub is_authenticated: bool,
}

impl AuthSnapshot {
    pub(crate) fn capture(state: AuthState, ctx: &AuthContext) -> Self {
        Self {
            phase: state.into(),
            state_name: state.name(),
            auth_mode: state.auth_mode(),
            user_name: ctx.user_name.clone(),
            smart_account_address: ctx.smart_account_address,
            signing_client: ctx.signing_client.clone(),
            wallet_address: ctx.wallet_address,
            external_wallet_connected: ctx.external_wallet_connected,
            external_wallet_address: ctx.external_wallet_address,
            error: ctx.error.as_ref().map(AuthFailure::from),
            retry_count: ctx.retry_count,
            is_authenticating: state.is_authenticating(),
            is_authenticated: state.is_authenticated(),
        }
    }

    /// The address downstream transaction code should treat as "the
    /// user": smart account in passkey mode, wallet in wallet mode.
    pub fn active_address(&self) -> Option<Address> {
        self.smart_account_address.or(self.wallet_address)
    }
}

impl std::fmt::Debug for AuthSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSnapshot")
            .field("state", &self.state_name)
            .field("auth_mode", &self.auth_mode)
            .field("user_name", &self.user_name)
            .field("smart_account_address", &self.smart_account_address)
            .field("has_signing_client", &self.signing_client.is_some())
            .field("wallet_address", &self.wallet_address)
            .field("external_wallet_connected", &self.external_wallet_connected)
            .field("error", &self.error)
            .field("retry_count", &self.retry_count)
            .finish()
    }
}
