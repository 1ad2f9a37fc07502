//! The signing session handle.

use crate::SessionResult;
use alloy::primitives::{Address, Bytes};
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// An authorized, gas-sponsored signing handle for a smart account.
///
/// Handed out to downstream consumers as an opaque shared reference. The
/// session never changes after creation; the auth engine swaps the whole
/// `Arc` on sign-out or mode switch.
pub trait SigningSession: Send + Sync {
    /// Smart account address this session signs for.
    fn address(&self) -> Address;

    /// Chain the session is bound to.
    fn chain_id(&self) -> u64;

    /// Submit a sponsored call through the account. Returns the submission
    /// hash reported by the bundler.
    fn send_call<'a>(&'a self, to: Address, data: Bytes) -> BoxFuture<'a, SessionResult<String>>;
}

/// The payload a successful passkey authentication produces.
#[derive(Clone)]
pub struct SmartSession {
    /// Counterfactual (or deployed) smart account address.
    pub address: Address,
    /// Signing handle for downstream transaction code.
    pub signer: Arc<dyn SigningSession>,
}

impl fmt::Debug for SmartSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartSession")
            .field("address", &self.address)
            .field("chain_id", &self.signer.chain_id())
            .finish()
    }
}
