//! Pure transition function for the auth machine.
//!
//! `transition` never performs IO. Side effects are returned as
//! [`Effect`] values and executed by the engine; operation results come
//! back as settlement events carrying the sequence number of the
//! operation that produced them. A settlement whose sequence does not
//! match the context's current one is dropped, so results of abandoned
//! operations can never corrupt a newer session.

use tracing::warn;

use crate::context::AuthContext;
use crate::event::{AuthEvent, PasskeySession};
use crate::state::{AuthState, AuthenticatedState};

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run silent session restore.
    InvokeRestore { seq: u64 },
    /// Run passkey registration.
    InvokeRegister { seq: u64, user_name: Option<String> },
    /// Run passkey authentication.
    InvokeAuthenticate { seq: u64, user_name: Option<String> },
    /// Run the ENS claim call.
    InvokeClaimEns { seq: u64, name: String },
    /// Persist wallet mode for the next launch.
    PersistWalletMode,
    /// Clear persisted auth mode.
    ClearPersisted,
    /// Tell the wallet connector to disconnect.
    DisconnectWallet,
}

/// Initial state plus the restore kick-off.
pub fn initial(ctx: &mut AuthContext) -> (AuthState, Vec<Effect>) {
    let seq = ctx.next_seq();
    (AuthState::Initializing, vec![Effect::InvokeRestore { seq }])
}

/// Applies one event. Unhandled events leave the state untouched.
pub fn transition(
    state: AuthState,
    ctx: &mut AuthContext,
    event: AuthEvent,
) -> (AuthState, Vec<Effect>) {
    // Drop settlements from superseded operations before anything else.
    if let Some(seq) = settlement_seq(&event) {
        if seq != ctx.op_seq {
            return (state, Vec::new());
        }
    }

    // Connector tracking updates apply in every state; some states
    // additionally transition on them below.
    match &event {
        AuthEvent::ExternalWalletConnected { address } => {
            ctx.external_wallet_connected = true;
            ctx.external_wallet_address = Some(*address);
        }
        AuthEvent::ExternalWalletDisconnected => {
            ctx.external_wallet_connected = false;
            ctx.external_wallet_address = None;
        }
        _ => {}
    }

    // Sign-out is accepted everywhere and is idempotent.
    if matches!(event, AuthEvent::SignOut) {
        return sign_out(state, ctx);
    }

    let next = match state {
        AuthState::Initializing => match event {
            AuthEvent::RestoreSettled {
                outcome: Some(session),
                ..
            } => {
                apply_passkey_session(ctx, session);
                (AuthState::Authenticated(AuthenticatedState::Passkey), vec![])
            }
            AuthEvent::RestoreSettled { outcome: None, .. } => {
                (AuthState::Unauthenticated, vec![])
            }
            _ => (state, vec![]),
        },

        AuthState::Unauthenticated => match event {
            AuthEvent::LoginPasskeyNew { user_name } => start_register(ctx, user_name),
            AuthEvent::LoginPasskeyExisting { user_name } => start_authenticate(ctx, user_name),
            AuthEvent::LoginWallet => start_wallet_login(ctx),
            _ => (state, vec![]),
        },

        AuthState::Registering => match event {
            AuthEvent::RegisterSettled { outcome, .. } => settle_passkey(ctx, outcome),
            _ => (state, vec![]),
        },

        AuthState::Authenticating => match event {
            AuthEvent::AuthenticateSettled { outcome, .. } => settle_passkey(ctx, outcome),
            _ => (state, vec![]),
        },

        AuthState::WalletConnecting => match event {
            AuthEvent::ExternalWalletConnected { address } => {
                enter_wallet_session(ctx, address)
            }
            AuthEvent::ModalClosed => (AuthState::Unauthenticated, vec![]),
            _ => (state, vec![]),
        },

        AuthState::Authenticated(AuthenticatedState::Passkey) => match event {
            AuthEvent::SwitchToWallet => {
                if let Some(address) = ctx.external_wallet_address {
                    ctx.clear_session();
                    enter_wallet_session(ctx, address)
                } else {
                    // The UI is expected to disable this action when no
                    // wallet is available.
                    warn!("Ignoring wallet switch with no connector attached");
                    (state, vec![])
                }
            }
            AuthEvent::ClaimEns { name } => {
                let seq = ctx.next_seq();
                (
                    AuthState::Authenticated(AuthenticatedState::ClaimingEns),
                    vec![Effect::InvokeClaimEns { seq, name }],
                )
            }
            AuthEvent::DismissError => {
                ctx.error = None;
                (state, vec![])
            }
            _ => (state, vec![]),
        },

        AuthState::Authenticated(AuthenticatedState::Wallet) => match event {
            AuthEvent::SwitchToPasskey { user_name }
            | AuthEvent::LoginPasskeyExisting { user_name } => {
                ctx.clear_session();
                start_authenticate(ctx, user_name)
            }
            AuthEvent::LoginPasskeyNew { user_name } => {
                ctx.clear_session();
                start_register(ctx, user_name)
            }
            // The connector going away ends a wallet-backed session.
            AuthEvent::ExternalWalletDisconnected => {
                ctx.clear_session();
                ctx.next_seq();
                (AuthState::Unauthenticated, vec![Effect::ClearPersisted])
            }
            _ => (state, vec![]),
        },

        AuthState::Authenticated(AuthenticatedState::ClaimingEns) => match event {
            AuthEvent::EnsClaimSettled { outcome, .. } => {
                // Claim failures are non-fatal; the session stays up.
                if let Err(err) = outcome {
                    ctx.error = Some(err);
                }
                (AuthState::Authenticated(AuthenticatedState::Passkey), vec![])
            }
            _ => (state, vec![]),
        },

        AuthState::Error => match event {
            AuthEvent::Retry => {
                if ctx.retry_count >= ctx.max_auth_retries {
                    ctx.error = None;
                    ctx.retry_count = 0;
                    (AuthState::Unauthenticated, vec![])
                } else {
                    ctx.error = None;
                    start_authenticate(ctx, None)
                }
            }
            AuthEvent::DismissError => {
                ctx.error = None;
                ctx.retry_count = 0;
                (AuthState::Unauthenticated, vec![])
            }
            AuthEvent::LoginPasskeyNew { user_name } => {
                ctx.error = None;
                start_register(ctx, user_name)
            }
            AuthEvent::LoginPasskeyExisting { user_name } => {
                ctx.error = None;
                start_authenticate(ctx, user_name)
            }
            AuthEvent::LoginWallet => {
                ctx.error = None;
                start_wallet_login(ctx)
            }
            _ => (state, vec![]),
        },
    };

    ctx.assert_exclusive();
    next
}

fn settlement_seq(event: &AuthEvent) -> Option<u64> {
    match event {
        AuthEvent::RestoreSettled { seq, .. }
        | AuthEvent::RegisterSettled { seq, .. }
        | AuthEvent::AuthenticateSettled { seq, .. }
        | AuthEvent::EnsClaimSettled { seq, .. } => Some(*seq),
        _ => None,
    }
}

fn sign_out(state: AuthState, ctx: &mut AuthContext) -> (AuthState, Vec<Effect>) {
    let was_wallet = matches!(
        state,
        AuthState::Authenticated(AuthenticatedState::Wallet)
    );
    ctx.clear_session();
    // Invalidate any in-flight operation.
    ctx.next_seq();
    let mut effects = vec![Effect::ClearPersisted];
    if was_wallet {
        effects.push(Effect::DisconnectWallet);
    }
    (AuthState::Unauthenticated, effects)
}

fn start_register(ctx: &mut AuthContext, user_name: Option<String>) -> (AuthState, Vec<Effect>) {
    let user_name = store_user_name(ctx, user_name);
    let seq = ctx.next_seq();
    (
        AuthState::Registering,
        vec![Effect::InvokeRegister { seq, user_name }],
    )
}

fn start_authenticate(
    ctx: &mut AuthContext,
    user_name: Option<String>,
) -> (AuthState, Vec<Effect>) {
    let user_name = store_user_name(ctx, user_name);
    let seq = ctx.next_seq();
    (
        AuthState::Authenticating,
        vec![Effect::InvokeAuthenticate { seq, user_name }],
    )
}

/// Stores the username carried by a login event so a later `Retry` can
/// re-run the attempt without the UI restating it. An event without a
/// username keeps whatever the context already holds.
fn store_user_name(ctx: &mut AuthContext, user_name: Option<String>) -> Option<String> {
    if user_name.is_some() {
        ctx.user_name = user_name;
    }
    ctx.user_name.clone()
}

fn start_wallet_login(ctx: &mut AuthContext) -> (AuthState, Vec<Effect>) {
    match ctx.external_wallet_address {
        Some(address) => enter_wallet_session(ctx, address),
        None => (AuthState::WalletConnecting, vec![]),
    }
}

fn enter_wallet_session(
    ctx: &mut AuthContext,
    address: alloy::primitives::Address,
) -> (AuthState, Vec<Effect>) {
    ctx.wallet_address = Some(address);
    ctx.retry_count = 0;
    ctx.error = None;
    (
        AuthState::Authenticated(AuthenticatedState::Wallet),
        vec![Effect::PersistWalletMode],
    )
}

fn apply_passkey_session(ctx: &mut AuthContext, session: PasskeySession) {
    ctx.wallet_address = None;
    ctx.credential = Some(session.credential);
    ctx.user_name = session.user_name;
    ctx.smart_account_address = Some(session.session.address);
    ctx.signing_client = Some(session.session.signer);
    ctx.error = None;
    ctx.retry_count = 0;
}

fn settle_passkey(
    ctx: &mut AuthContext,
    outcome: Result<PasskeySession, crate::error::AuthError>,
) -> (AuthState, Vec<Effect>) {
    match outcome {
        Ok(session) => {
            apply_passkey_session(ctx, session);
            (AuthState::Authenticated(AuthenticatedState::Passkey), vec![])
        }
        Err(err) => {
            ctx.error = Some(err);
            ctx.retry_count += 1;
            (AuthState::Error, vec![])
        }
    }
}
