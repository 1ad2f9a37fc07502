//! Events consumed by the auth machine.

use account_session::SmartSession;
use alloy::primitives::Address;
use passkey_gateway::Credential;

use crate::error::AuthError;

/// A fully built passkey session, produced by the restore, register and
/// authenticate operations.
#[derive(Debug, Clone)]
pub struct PasskeySession {
    pub credential: Credential,
    pub user_name: Option<String>,
    pub session: SmartSession,
}

/// Everything the machine reacts to: user intents, wallet connector
/// notifications and settlements of spawned operations.
#[derive(Debug)]
pub enum AuthEvent {
    /// Begin passkey registration for a new account.
    LoginPasskeyNew { user_name: Option<String> },
    /// Begin passkey authentication against an existing account.
    LoginPasskeyExisting { user_name: Option<String> },
    /// Begin external wallet login.
    LoginWallet,
    /// Switch a live passkey session to wallet mode.
    SwitchToWallet,
    /// Switch a live wallet session to passkey mode.
    SwitchToPasskey { user_name: Option<String> },
    /// Claim an ENS name for the current smart account.
    ClaimEns { name: String },
    /// Tear down the current session. Idempotent.
    SignOut,
    /// Retry the failed authentication attempt.
    Retry,
    /// Dismiss the current error without retrying.
    DismissError,
    /// The wallet connect UI was closed without connecting.
    ModalClosed,

    /// An external wallet connector attached.
    ExternalWalletConnected { address: Address },
    /// The external wallet connector detached.
    ExternalWalletDisconnected,

    /// Session restore finished. `None` means no session to restore;
    /// restore failures are silent by design.
    RestoreSettled {
        seq: u64,
        outcome: Option<PasskeySession>,
    },
    /// Passkey registration finished.
    RegisterSettled {
        seq: u64,
        outcome: Result<PasskeySession, AuthError>,
    },
    /// Passkey authentication finished.
    AuthenticateSettled {
        seq: u64,
        outcome: Result<PasskeySession, AuthError>,
    },
    /// ENS claim finished.
    EnsClaimSettled {
        seq: u64,
        outcome: Result<(), AuthError>,
    },
}

impl AuthEvent {
    /// Short tag for transition logs.
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::LoginPasskeyNew { .. } => "login_passkey_new",
            AuthEvent::LoginPasskeyExisting { .. } => "login_passkey_existing",
            AuthEvent::LoginWallet => "login_wallet",
            AuthEvent::SwitchToWallet => "switch_to_wallet",
            AuthEvent::SwitchToPasskey { .. } => "switch_to_passkey",
            AuthEvent::ClaimEns { .. } => "claim_ens",
            AuthEvent::SignOut => "sign_out",
            AuthEvent::Retry => "retry",
            AuthEvent::DismissError => "dismiss_error",
            AuthEvent::ModalClosed => "modal_closed",
            AuthEvent::ExternalWalletConnected { .. } => "external_wallet_connected",
            AuthEvent::ExternalWalletDisconnected => "external_wallet_disconnected",
            AuthEvent::RestoreSettled { .. } => "restore_settled",
            AuthEvent::RegisterSettled { .. } => "register_settled",
            AuthEvent::AuthenticateSettled { .. } => "authenticate_settled",
            AuthEvent::EnsClaimSettled { .. } => "ens_claim_settled",
        }
    }
}
