//! Authentication engine for the GreenGoods client.
//!
//! Coordinates two mutually exclusive ways of owning a session:
//!
//! - **Passkey**: a WebAuthn credential verified by the credential
//!   backend, wrapped in a gas-sponsored smart-account session.
//! - **Wallet**: an external wallet attached through the connector
//!   library; the engine only tracks it.
//!
//! The machine itself is a pure function over `(state, context, event)`
//! in [`machine`]; [`engine`] wraps it in a single actor task that
//! serializes transitions, spawns IO operations, and publishes an
//! [`AuthSnapshot`] after every transition. Consumers either watch the
//! snapshot stream or register callbacks on a [`SnapshotFeed`].
//!
//! ```ignore
//! let handle = auth_orchestrator::spawn(deps);
//! let mut snapshots = handle.subscribe();
//! handle.login_with_passkey(None);
//! while snapshots.changed().await.is_ok() {
//!     let snap = snapshots.borrow().clone();
//!     if snap.is_authenticated { break; }
//! }
//! ```

pub mod authenticator;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod feed;
pub mod logging;
pub mod machine;
pub mod ops;
pub mod snapshot;
pub mod state;

pub use authenticator::{Assertion, Authenticator};
pub use config::Config;
pub use engine::{global, init_global, spawn, AuthHandle, EngineDeps};
pub use error::{AuthError, AuthFailure, AuthResult, ErrorKind};
pub use event::{AuthEvent, PasskeySession};
pub use feed::SnapshotFeed;
pub use logging::init_logging;
pub use snapshot::AuthSnapshot;
pub use state::{AuthPhase, AuthState, AuthenticatedState};
