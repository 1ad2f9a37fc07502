//! Smart-account session construction for the GreenGoods client.
//!
//! Turns a verified passkey credential into a chain-specific signing session:
//! the smart account's address plus an opaque handle downstream code (the
//! offline attestation queue) uses to submit sponsored calls. The auth engine
//! never looks inside the handle; it only replaces or drops it.

mod builder;
mod error;
mod session;

pub use builder::{BundlerSessionBuilder, SessionBuilder, StaticSessionBuilder};
pub use error::{SessionBuildError, SessionResult};
pub use session::{SigningSession, SmartSession};
