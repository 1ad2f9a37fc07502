//! External wallet adapter for the GreenGoods authentication engine.
//!
//! Wraps the wallet-connector library's connect/disconnect/watch primitives.
//! The library's own connection management stays outside the engine; only
//! connection notifications cross the boundary, through a broadcast channel
//! that preserves emission order.

use alloy::primitives::Address;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Capacity of the notification channel. Wallet events are rare; a lagging
/// receiver indicates a stalled consumer, not normal load.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Errors from wallet connector commands.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Unknown connector id
    #[error("Unknown wallet connector: {0}")]
    UnknownConnector(String),

    /// Connector library failure
    #[error("Wallet connector error: {0}")]
    Connector(String),
}

/// Result type alias using WalletError.
pub type WalletResult<T> = Result<T, WalletError>;

/// Connection notifications emitted by the wallet library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// An external wallet connected (or reconnected) with this address.
    Connected(Address),
    /// The external wallet disconnected.
    Disconnected,
}

/// Commands the engine may issue to the wallet library.
///
/// Connect requests originate from the UI and are reflected back only via
/// `WalletEvent`s; the engine itself calls `disconnect` exclusively, to force
/// a disconnect on sign-out.
pub trait WalletConnector: Send + Sync {
    /// Open a connection through the named connector (UI-triggered).
    fn connect(&self, connector_id: &str) -> WalletResult<()>;

    /// Tear down the current connection.
    fn disconnect(&self) -> WalletResult<()>;
}

/// Bridges wallet-library notifications into the engine's event queue.
pub struct WalletBridge {
    events: broadcast::Sender<WalletEvent>,
}

impl WalletBridge {
    /// Create a new bridge with no subscribers.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { events }
    }

    /// Subscribe to connection notifications, in emission order.
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Report a wallet connection. Called by the wallet-library glue.
    pub fn notify_connected(&self, address: Address) {
        debug!(address = %address, "External wallet connected");
        // Send fails only when no receiver is alive yet; that is fine.
        let _ = self.events.send(WalletEvent::Connected(address));
    }

    /// Report a wallet disconnection.
    pub fn notify_disconnected(&self) {
        debug!("External wallet disconnected");
        let _ = self.events.send(WalletEvent::Disconnected);
    }
}

impl Default for WalletBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Connector for passkey-only deployments and tests: accepts every command
/// and never emits events.
#[derive(Default)]
pub struct NullConnector;

impl WalletConnector for NullConnector {
    fn connect(&self, connector_id: &str) -> WalletResult<()> {
        warn!(connector_id, "NullConnector ignoring connect request");
        Ok(())
    }

    fn disconnect(&self) -> WalletResult<()> {
        Ok(())
    }
}
