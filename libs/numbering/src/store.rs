//! The durable counter store contract.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::ScopeKey;

/// The outcome of one successful locked increment.
///
/// "Row existed, locked" and "row created fresh, locked" are the two possible
/// paths into the increment; both converge here. `value` is the counter value
/// *after* the increment, so a fresh row reports `value == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceIncrement {
    /// The counter value after incrementing by one.
    pub value: u64,

    /// True if the counter row did not exist before this call.
    pub freshly_created: bool,
}

/// Errors from the counter store.
///
/// Both variants guarantee the counter row is unchanged: any partial work was
/// rolled back before the error surfaced.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the transaction failed to commit.
    #[error("counter store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The exclusive row lock was not acquired within the configured bound.
    #[error("timed out waiting for the row lock after {waited:?}")]
    LockTimeout { waited: Duration },
}

impl StoreError {
    /// Wraps any error source as [`StoreError::Unavailable`].
    pub fn unavailable(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Unavailable(source.into())
    }
}

/// A durable store of per-scope counters.
///
/// Implementations must provide "read-or-create, increment, commit" as a
/// single atomic unit per scope key:
///
/// - An exclusive lock scoped to the key blocks concurrent callers for the
///   *same* key until the increment is durably committed, and must not block
///   callers for any other key.
/// - The counter row is created lazily with `last_number = 0` and incremented
///   to 1 within the same unit on first use.
/// - On any failure the counter must be left exactly as it was; the increment
///   and the handing of its value to the caller are one atomic step.
/// - Lock waits must be bounded; when the bound expires the call fails with
///   [`StoreError::LockTimeout`] after rolling back, even if the waiting
///   caller has already gone away.
///
/// There is deliberately no "peek current value" method: the only supported
/// operation is allocating the next number.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increments the counter for `key`, creating it if absent.
    async fn lock_and_increment(&self, key: &ScopeKey) -> Result<SequenceIncrement, StoreError>;
}
