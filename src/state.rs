use std::sync::Arc;

use crate::cache::SnapshotCache;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }
}
