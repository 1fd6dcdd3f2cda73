//! Application state shared by all handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::store::CourseStore;

/// Shared course store. The mutex serializes every store operation, which
/// gives the single writer per course the store expects.
pub type SharedStore = Arc<Mutex<CourseStore>>;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(store: CourseStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store. A poisoned lock is recovered: the store keeps no
    /// in-memory state a panicking handler could have left half-updated.
    pub fn store(&self) -> MutexGuard<'_, CourseStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
