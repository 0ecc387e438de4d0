//! Single-slot store for the foreground job's progress

use crate::types::ProgressSnapshot;
use tokio::sync::watch;

/// Holds the latest [`ProgressSnapshot`]
///
/// Every write replaces the previous snapshot wholesale; there is no history.
/// Cloning yields another handle to the same slot. Reads never block and
/// return the idle snapshot until a job has run.
#[derive(Clone, Debug)]
pub struct ProgressStore {
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressStore {
    /// Create a store holding the idle snapshot
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::idle());
        Self { tx }
    }

    /// Current snapshot
    pub fn get(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Overwrite the snapshot
    pub fn set(&self, snapshot: ProgressSnapshot) {
        tracing::trace!(
            progress = snapshot.percent,
            status = %snapshot.status,
            "progress updated"
        );
        self.tx.send_replace(snapshot);
    }

    /// Receiver that is notified on every write
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}
