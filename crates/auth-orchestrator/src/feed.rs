//! Push-style snapshot delivery for callers that cannot poll a watch
//! channel (FFI layers, UI bindings).

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::debug;

use crate::snapshot::AuthSnapshot;

type SnapshotCallback = Box<dyn Fn(AuthSnapshot) + Send + Sync>;

/// Fans snapshots out to registered callbacks.
///
/// Callbacks run on the feed task in registration order and must not
/// block; heavy consumers should hand off to their own executor.
pub struct SnapshotFeed {
    callbacks: Arc<Mutex<Vec<SnapshotCallback>>>,
}

impl SnapshotFeed {
    /// Starts a feed task over the given snapshot stream.
    pub fn spawn(mut snapshots: watch::Receiver<AuthSnapshot>) -> Self {
        let callbacks: Arc<Mutex<Vec<SnapshotCallback>>> = Arc::new(Mutex::new(Vec::new()));
        let task_callbacks = callbacks.clone();
        tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                let callbacks = task_callbacks.lock().expect("feed callbacks poisoned");
                for callback in callbacks.iter() {
                    callback(snapshot.clone());
                }
            }
            debug!("Snapshot feed stopped");
        });
        Self { callbacks }
    }

    /// Registers a callback. It fires on the next transition; call
    /// `AuthHandle::snapshot` for the current state.
    pub fn on_snapshot(&self, callback: impl Fn(AuthSnapshot) + Send + Sync + 'static) {
        self.callbacks
            .lock()
            .expect("feed callbacks poisoned")
            .push(Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AuthContext;
    use crate::state::AuthState;
    use std::time::Duration;

    fn snap(state: AuthState) -> AuthSnapshot {
        AuthSnapshot::capture(state, &AuthContext::new(1, 3))
    }

    #[tokio::test]
    async fn callbacks_fire_on_every_transition() {
        let (tx, rx) = watch::channel(snap(AuthState::Initializing));
        let feed = SnapshotFeed::spawn(rx);

        let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();
        feed.on_snapshot(move |snapshot| {
            let _ = seen_tx.send(snapshot.state_name);
        });

        tx.send(snap(AuthState::Unauthenticated)).unwrap();

        let name = tokio::time::timeout(Duration::from_secs(1), seen_rx.recv())
            .await
            .expect("feed delivered nothing")
            .unwrap();
        assert_eq!(name, "unauthenticated");
    }
}
