//! In-process counter store backed by per-key async mutexes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use crate::{ScopeKey, SequenceIncrement, SequenceStore, StoreError};

const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// An in-memory [`SequenceStore`].
///
/// Each scope key owns its own async mutex, so contention on one scope never
/// delays allocation on another — the same row-level discipline a relational
/// backend provides with `SELECT ... FOR UPDATE`. Correct for any number of
/// tasks within a single process; for multi-process deployments use a shared
/// durable backend instead.
///
/// Used by tests and by the numbering server's dev mode.
pub struct MemoryStore {
    // The outer lock only guards the key -> row mapping and is held for map
    // lookups, never across an increment.
    rows: Mutex<HashMap<ScopeKey, Arc<AsyncMutex<u64>>>>,
    lock_wait: Duration,
}

impl MemoryStore {
    /// Creates a store with the default 5s lock-wait bound.
    pub fn new() -> Self {
        Self::with_lock_wait(DEFAULT_LOCK_WAIT)
    }

    /// Creates a store with a custom lock-wait bound.
    pub fn with_lock_wait(lock_wait: Duration) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            lock_wait,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SequenceStore for MemoryStore {
    async fn lock_and_increment(&self, key: &ScopeKey) -> Result<SequenceIncrement, StoreError> {
        let (row, freshly_created) = {
            let mut rows = self
                .rows
                .lock()
                .map_err(|_| StoreError::unavailable("counter map poisoned by a panicked task"))?;
            match rows.get(key) {
                Some(row) => (Arc::clone(row), false),
                None => {
                    let row = Arc::new(AsyncMutex::new(0));
                    rows.insert(key.clone(), Arc::clone(&row));
                    (row, true)
                }
            }
        };

        let mut last_number = tokio::time::timeout(self.lock_wait, row.lock())
            .await
            .map_err(|_| StoreError::LockTimeout {
                waited: self.lock_wait,
            })?;

        *last_number += 1;
        Ok(SequenceIncrement {
            value: *last_number,
            freshly_created,
        })
    }
}
