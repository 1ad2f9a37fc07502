//! Authentication states.
//!
//! ## State Diagram
//!
//! ```text
//! ┌──────────────┐ restore ok          ┌──────────────────────────────┐
//! │ Initializing │────────────────────►│ Authenticated                │
//! └──────┬───────┘                     │  ┌─────────┐   ┌──────────┐  │
//!        │ restore empty/failed        │  │ Passkey │◄─►│ Claiming │  │
//!        ▼                             │  └────┬────┘   │   Ens    │  │
//! ┌─────────────────┐ LoginPasskey*    │       │switch  └──────────┘  │
//! │ Unauthenticated │────────────────┐ │  ┌────▼────┐                 │
//! └───────┬─────────┘                │ │  │ Wallet  │                 │
//!         │ LoginWallet              │ │  └─────────┘                 │
//!         ▼ (no wallet)              │ └──────▲───────────────────────┘
//! ┌──────────────────┐  connected    │        │ settle ok
//! │ WalletConnecting │───────────────┼────────┤
//! └──────────────────┘               ▼        │
//!                        ┌─────────────────────────────┐
//!                        │ Registering / Authenticating│
//!                        └──────────────┬──────────────┘
//!                                       │ settle err
//!                                       ▼
//!                                  ┌─────────┐  Retry (< cap)
//!                                  │  Error  │──► Authenticating
//!                                  └─────────┘  Retry (≥ cap) ──► Unauthenticated
//! ```
//!
//! States are a plain tagged union; transitions live in [`crate::machine`]
//! as a pure function over `(state, context, event)`.

use gardener_storage::AuthMode;
use serde::Serialize;

/// Top-level machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Silent session restore is running.
    Initializing,
    /// No session; stable resting state.
    Unauthenticated,
    /// A passkey registration ceremony is in flight.
    Registering,
    /// A passkey authentication ceremony is in flight.
    Authenticating,
    /// Waiting for the external wallet connect UI.
    WalletConnecting,
    /// A session is live; stable resting state.
    Authenticated(AuthenticatedState),
    /// A registration/authentication attempt failed.
    Error,
}

/// Nested state inside `Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatedState {
    /// Passkey-backed smart account session.
    Passkey,
    /// External wallet session.
    Wallet,
    /// Passkey session with an ENS claim in flight.
    ClaimingEns,
}

impl AuthState {
    /// Dotted state path, e.g. `authenticated.passkey`.
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Initializing => "initializing",
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Registering => "registering",
            AuthState::Authenticating => "authenticating",
            AuthState::WalletConnecting => "wallet_connecting",
            AuthState::Authenticated(AuthenticatedState::Passkey) => "authenticated.passkey",
            AuthState::Authenticated(AuthenticatedState::Wallet) => "authenticated.wallet",
            AuthState::Authenticated(AuthenticatedState::ClaimingEns) => {
                "authenticated.claiming_ens"
            }
            AuthState::Error => "error",
        }
    }

    /// True in any `authenticated.*` leaf.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// True while a login flow is in progress.
    pub fn is_authenticating(&self) -> bool {
        matches!(
            self,
            AuthState::Registering | AuthState::Authenticating | AuthState::WalletConnecting
        )
    }

    /// The auth mode this state implies, if any.
    pub fn auth_mode(&self) -> Option<AuthMode> {
        match self {
            AuthState::Authenticated(AuthenticatedState::Wallet) => Some(AuthMode::Wallet),
            AuthState::Authenticated(_) => Some(AuthMode::Passkey),
            _ => None,
        }
    }
}

/// Flattened state tag for snapshots and IPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Initializing,
    Unauthenticated,
    Registering,
    Authenticating,
    WalletConnecting,
    AuthenticatedPasskey,
    AuthenticatedWallet,
    AuthenticatedClaimingEns,
    Error,
}

impl From<AuthState> for AuthPhase {
    fn from(state: AuthState) -> Self {
        match state {
            AuthState::Initializing => AuthPhase::Initializing,
            AuthState::Unauthenticated => AuthPhase::Unauthenticated,
            AuthState::Registering => AuthPhase::Registering,
            AuthState::Authenticating => AuthPhase::Authenticating,
            AuthState::WalletConnecting => AuthPhase::WalletConnecting,
            AuthState::Authenticated(AuthenticatedState::Passkey) => {
                AuthPhase::AuthenticatedPasskey
            }
            AuthState::Authenticated(AuthenticatedState::Wallet) => AuthPhase::AuthenticatedWallet,
            AuthState::Authenticated(AuthenticatedState::ClaimingEns) => {
                AuthPhase::AuthenticatedClaimingEns
            }
            AuthState::Error => AuthPhase::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_dotted_paths() {
        assert_eq!(AuthState::Initializing.name(), "initializing");
        assert_eq!(
            AuthState::Authenticated(AuthenticatedState::ClaimingEns).name(),
            "authenticated.claiming_ens"
        );
    }

    #[test]
    fn is_authenticated_only_in_authenticated_leaves() {
        assert!(AuthState::Authenticated(AuthenticatedState::Passkey).is_authenticated());
        assert!(AuthState::Authenticated(AuthenticatedState::Wallet).is_authenticated());
        assert!(AuthState::Authenticated(AuthenticatedState::ClaimingEns).is_authenticated());
        assert!(!AuthState::Unauthenticated.is_authenticated());
        assert!(!AuthState::Error.is_authenticated());
    }

    #[test]
    fn is_authenticating_in_transient_login_states() {
        assert!(AuthState::Registering.is_authenticating());
        assert!(AuthState::Authenticating.is_authenticating());
        assert!(AuthState::WalletConnecting.is_authenticating());
        assert!(!AuthState::Initializing.is_authenticating());
        assert!(!AuthState::Authenticated(AuthenticatedState::Passkey).is_authenticating());
    }

    #[test]
    fn auth_mode_follows_session_kind() {
        assert_eq!(
            AuthState::Authenticated(AuthenticatedState::Passkey).auth_mode(),
            Some(AuthMode::Passkey)
        );
        assert_eq!(
            AuthState::Authenticated(AuthenticatedState::ClaimingEns).auth_mode(),
            Some(AuthMode::Passkey)
        );
        assert_eq!(
            AuthState::Authenticated(AuthenticatedState::Wallet).auth_mode(),
            Some(AuthMode::Wallet)
        );
        assert_eq!(AuthState::Authenticating.auth_mode(), None);
    }
}
