use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::Repository;

/// One published result set. Never mutated after it is published.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Newest first
    pub repositories: Vec<Repository>,
    /// When this snapshot was published; `None` before the first publish
    pub last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// `false` until an ingestion cycle has been published. An empty but ready
    /// snapshot means the cycle found nothing.
    pub fn is_ready(&self) -> bool {
        self.last_updated.is_some()
    }
}

/// Holds the single current snapshot.
///
/// The lock guards only the `Arc` handle: `publish` builds the new snapshot
/// before taking the write lock and `read` clones the handle under the read
/// lock, so neither side holds the lock for longer than a pointer swap.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot, stamping the current time.
    pub fn publish(&self, repositories: Vec<Repository>) {
        let count = repositories.len();
        let snapshot = Arc::new(Snapshot {
            repositories,
            last_updated: Some(Utc::now()),
        });

        let previous = {
            let mut current = self.current.write();
            std::mem::replace(&mut *current, snapshot)
        };
        // Old snapshot is released outside the lock
        drop(previous);

        tracing::info!("Cache set with {count} repositories");
    }

    /// Current snapshot. Readers keep their handle even if a newer one is
    /// published meanwhile.
    pub fn read(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }
}
