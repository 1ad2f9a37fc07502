//! The auth engine actor and its public handle.
//!
//! All events funnel through one unbounded queue into a single task that
//! owns the state and context, so transitions are serialized without
//! locks. Effects that do IO are spawned onto their own tasks and feed
//! settlement events back into the same queue.

use std::sync::{Arc, OnceLock};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use account_session::{SessionBuilder, SigningSession};
use gardener_storage::SessionVault;
use passkey_gateway::CredentialGateway;
use wallet_bridge::{WalletBridge, WalletConnector, WalletEvent};

use crate::authenticator::Authenticator;
use crate::config::Config;
use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::event::AuthEvent;
use crate::machine::{self, Effect};
use crate::ops::Ops;
use crate::snapshot::AuthSnapshot;
use crate::state::AuthState;

/// Everything the engine needs to run.
pub struct EngineDeps {
    pub config: Config,
    pub gateway: Arc<dyn CredentialGateway>,
    pub authenticator: Arc<dyn Authenticator>,
    pub builder: Arc<dyn SessionBuilder>,
    pub vault: Arc<SessionVault>,
    pub connector: Arc<dyn WalletConnector>,
    pub wallet_bridge: Arc<WalletBridge>,
}

/// Handle for sending intents to the engine and observing its state.
///
/// Cheap to clone; every command is fire-and-forget, results arrive
/// through the snapshot stream.
#[derive(Clone)]
pub struct AuthHandle {
    events: mpsc::UnboundedSender<AuthEvent>,
    snapshots: watch::Receiver<AuthSnapshot>,
}

impl AuthHandle {
    /// Authenticate with an existing passkey. Without a username the
    /// stored handle from the last registration is used.
    pub fn login_with_passkey(&self, user_name: Option<&str>) {
        self.send(AuthEvent::LoginPasskeyExisting {
            user_name: user_name.map(str::to_string),
        });
    }

    /// Register a brand-new passkey account. A missing username is a
    /// configuration error surfaced through the error state.
    pub fn create_account(&self, user_name: Option<&str>) {
        self.send(AuthEvent::LoginPasskeyNew {
            user_name: user_name.map(str::to_string),
        });
    }

    /// Log in with an external wallet.
    pub fn login_with_wallet(&self) {
        self.send(AuthEvent::LoginWallet);
    }

    /// Switch a live passkey session to wallet mode.
    pub fn switch_to_wallet(&self) {
        self.send(AuthEvent::SwitchToWallet);
    }

    /// Switch a live wallet session to passkey mode.
    pub fn switch_to_passkey(&self, user_name: Option<&str>) {
        self.send(AuthEvent::SwitchToPasskey {
            user_name: user_name.map(str::to_string),
        });
    }

    /// Claim an ENS subname for the current smart account.
    pub fn claim_ens(&self, name: &str) {
        self.send(AuthEvent::ClaimEns {
            name: name.to_string(),
        });
    }

    /// Tear down the current session. Safe to call repeatedly.
    pub fn sign_out(&self) {
        self.send(AuthEvent::SignOut);
    }

    /// Retry the failed authentication attempt.
    pub fn retry(&self) {
        self.send(AuthEvent::Retry);
    }

    /// Dismiss the current error without retrying.
    pub fn dismiss_error(&self) {
        self.send(AuthEvent::DismissError);
    }

    /// Report that the wallet connect UI was closed without connecting.
    pub fn wallet_modal_closed(&self) {
        self.send(AuthEvent::ModalClosed);
    }

    /// Subscribe to state snapshots. The receiver always holds the
    /// latest snapshot; intermediate ones may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshots.clone()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.snapshots.borrow().clone()
    }

    fn send(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            error!("Auth engine task is gone; dropping event");
        }
    }
}

/// Spawns the engine and returns its handle.
pub fn spawn(deps: EngineDeps) -> AuthHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let mut ctx = AuthContext::new(deps.config.chain_id, deps.config.max_auth_retries);
    let (state, effects) = machine::initial(&mut ctx);
    let (snapshots_tx, snapshots_rx) = watch::channel(AuthSnapshot::capture(state, &ctx));

    // Forward connector notifications into the event queue.
    let mut wallet_rx = deps.wallet_bridge.subscribe();
    let wallet_tx = events_tx.clone();
    tokio::spawn(async move {
        loop {
            match wallet_rx.recv().await {
                Ok(WalletEvent::Connected(address)) => {
                    if wallet_tx
                        .send(AuthEvent::ExternalWalletConnected { address })
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(WalletEvent::Disconnected) => {
                    if wallet_tx.send(AuthEvent::ExternalWalletDisconnected).is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Wallet event stream lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let ops = Arc::new(Ops {
        gateway: deps.gateway,
        authenticator: deps.authenticator,
        builder: deps.builder,
        vault: deps.vault,
        config: deps.config,
    });

    let mut actor = EngineActor {
        state,
        ctx,
        ops,
        connector: deps.connector,
        events_tx: events_tx.clone(),
        snapshots_tx,
        events_rx,
    };
    tokio::spawn(async move {
        actor.run_effects(effects);
        actor.run().await;
    });

    AuthHandle {
        events: events_tx,
        snapshots: snapshots_rx,
    }
}

struct EngineActor {
    state: AuthState,
    ctx: AuthContext,
    ops: Arc<Ops>,
    connector: Arc<dyn WalletConnector>,
    events_tx: mpsc::UnboundedSender<AuthEvent>,
    snapshots_tx: watch::Sender<AuthSnapshot>,
    events_rx: mpsc::UnboundedReceiver<AuthEvent>,
}

impl EngineActor {
    async fn run(&mut self) {
        info!("Auth engine started");
        while let Some(event) = self.events_rx.recv().await {
            let event_name = event.name();
            let old_state = self.state;
            let (new_state, effects) = machine::transition(self.state, &mut self.ctx, event);
            if new_state != old_state {
                debug!(
                    event = event_name,
                    old_state = old_state.name(),
                    new_state = new_state.name(),
                    "Auth transition"
                );
            }
            self.state = new_state;
            // Send fails only when every handle is gone; the actor winds
            // down on queue closure anyway.
            let _ = self
                .snapshots_tx
                .send(AuthSnapshot::capture(self.state, &self.ctx));
            self.run_effects(effects);
        }
        info!("Auth engine stopped");
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::InvokeRestore { seq } => {
                let ops = self.ops.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = ops.restore_session().await;
                    let _ = tx.send(AuthEvent::RestoreSettled { seq, outcome });
                });
            }
            Effect::InvokeRegister { seq, user_name } => {
                let ops = self.ops.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = ops.register_passkey(user_name).await;
                    let _ = tx.send(AuthEvent::RegisterSettled { seq, outcome });
                });
            }
            Effect::InvokeAuthenticate { seq, user_name } => {
                // Fall back to the stored handle so retries and mode
                // switches work without the UI restating the username.
                let user_name = user_name.or_else(|| self.stored_user_name());
                let ops = self.ops.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = ops.authenticate_passkey(user_name).await;
                    let _ = tx.send(AuthEvent::AuthenticateSettled { seq, outcome });
                });
            }
            Effect::InvokeClaimEns { seq, name } => {
                let tx = self.events_tx.clone();
                match self.signer_for_claim() {
                    Ok(signer) => {
                        let ops = self.ops.clone();
                        tokio::spawn(async move {
                            let outcome = ops.claim_ens(signer, name).await;
                            let _ = tx.send(AuthEvent::EnsClaimSettled { seq, outcome });
                        });
                    }
                    Err(err) => {
                        let _ = tx.send(AuthEvent::EnsClaimSettled {
                            seq,
                            outcome: Err(err),
                        });
                    }
                }
            }
            Effect::PersistWalletMode => {
                if let Err(err) = self.ops.vault.set_auth_mode(gardener_storage::AuthMode::Wallet)
                {
                    warn!(error = %err, "Failed to persist wallet auth mode");
                }
            }
            Effect::ClearPersisted => {
                if let Err(err) = self.ops.vault.clear_all() {
                    warn!(error = %err, "Failed to clear persisted session data");
                }
            }
            Effect::DisconnectWallet => {
                if let Err(err) = self.connector.disconnect() {
                    warn!(error = %err, "Wallet disconnect on sign-out failed");
                }
            }
        }
    }

    fn stored_user_name(&self) -> Option<String> {
        self.ops.vault.user_name().ok().flatten()
    }

    fn signer_for_claim(&self) -> AuthResult<Arc<dyn SigningSession>> {
        self.ctx
            .signing_client
            .clone()
            .ok_or_else(|| AuthError::Config("ENS claim requires a passkey session".into()))
    }
}

static GLOBAL_ENGINE: OnceLock<AuthHandle> = OnceLock::new();

/// Spawns the engine and installs its handle as the process-wide
/// singleton. Fails if one was already installed.
pub fn init_global(deps: EngineDeps) -> Result<&'static AuthHandle, AuthError> {
    let handle = spawn(deps);
    GLOBAL_ENGINE
        .set(handle)
        .map_err(|_| AuthError::Config("Auth engine already initialized".into()))?;
    Ok(GLOBAL_ENGINE.get().expect("just installed"))
}

/// The process-wide engine handle, if one was installed.
pub fn global() -> Option<&'static AuthHandle> {
    GLOBAL_ENGINE.get()
}
