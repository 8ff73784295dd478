//! The sequence allocator: validate, derive the period, increment once.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::debug;

use crate::{AllocateError, DocumentNumber, DocumentScope, Period, ScopeKey, SequenceStore};

/// Allocates document numbers against a shared [`SequenceStore`].
///
/// The allocator itself is stateless apart from configuration: all
/// correctness lives in the store's locked increment, so any number of
/// allocator instances — including ones in separate processes — can share a
/// store without coordinating further.
///
/// Errors are propagated as-is; the allocator never retries internally.
/// Retry and backoff policy belongs to the caller, which knows its own
/// latency budget. Every error leaves the counter untouched, so retries are
/// always safe.
#[derive(Clone)]
pub struct Allocator {
    store: Arc<dyn SequenceStore>,
    utc_offset: FixedOffset,
}

impl Allocator {
    /// Creates an allocator that derives periods in UTC.
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self::with_utc_offset(store, Utc.fix())
    }

    /// Creates an allocator that derives periods at a fixed UTC offset.
    ///
    /// Pinning the offset keeps the scope key's (year, month) stable per
    /// deployment instead of depending on whichever server happens to run
    /// the allocation.
    pub fn with_utc_offset(store: Arc<dyn SequenceStore>, utc_offset: FixedOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Allocates the next number for the given scope.
    ///
    /// The period is derived from `as_of` (or the current wall clock when
    /// `None`) at the allocator's configured UTC offset. Inputs are validated
    /// before any storage interaction; an invalid scope never creates or
    /// touches a counter row.
    pub async fn allocate(
        &self,
        tenant_code: &str,
        document_type: &str,
        sub_scope: Option<&str>,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<DocumentNumber, AllocateError> {
        let scope = DocumentScope::new(tenant_code, document_type, sub_scope)?;
        let instant = as_of.unwrap_or_else(Utc::now);
        let period = Period::from_instant(instant, self.utc_offset);
        self.increment(ScopeKey::new(scope, period)).await
    }

    /// Allocates the next number for an explicitly supplied period.
    ///
    /// Use [`Period::new`] to validate the year and month first; out-of-range
    /// values are rejected there, before any storage interaction.
    pub async fn allocate_in_period(
        &self,
        tenant_code: &str,
        document_type: &str,
        sub_scope: Option<&str>,
        period: Period,
    ) -> Result<DocumentNumber, AllocateError> {
        let scope = DocumentScope::new(tenant_code, document_type, sub_scope)?;
        self.increment(ScopeKey::new(scope, period)).await
    }

    async fn increment(&self, key: ScopeKey) -> Result<DocumentNumber, AllocateError> {
        let increment = self.store.lock_and_increment(&key).await?;
        debug!(
            scope = %key,
            sequence = increment.value,
            fresh_counter = increment.freshly_created,
            "allocated document number"
        );
        Ok(DocumentNumber::new(key, increment.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, ScopeError};
    use chrono::TimeZone;

    fn allocator() -> Allocator {
        Allocator::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn first_two_allocations_render_canonically() {
        let allocator = allocator();
        let as_of = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let first = allocator.allocate("ABC", "FV", None, Some(as_of)).await.unwrap();
        assert_eq!(first.to_string(), "ABC/FV/2025/03/0001");

        let second = allocator.allocate("ABC", "FV", None, Some(as_of)).await.unwrap();
        assert_eq!(second.to_string(), "ABC/FV/2025/03/0002");
    }

    #[tokio::test]
    async fn sub_scope_appears_in_the_number() {
        let allocator = allocator();
        let as_of = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let number = allocator
            .allocate("ABC", "WZ", Some("01"), Some(as_of))
            .await
            .unwrap();
        assert_eq!(number.to_string(), "ABC/WZ/01/2025/03/0001");
    }

    #[tokio::test]
    async fn invalid_scope_is_rejected_before_storage() {
        let allocator = allocator();
        let err = allocator.allocate("", "FV", None, None).await.unwrap_err();
        assert!(matches!(
            err,
            AllocateError::InvalidScope(ScopeError::EmptyTenantCode)
        ));
    }

    #[tokio::test]
    async fn explicit_period_is_used_verbatim() {
        let allocator = allocator();
        let period = Period::new(2024, 11).unwrap();
        let number = allocator
            .allocate_in_period("ABC", "PZ", None, period)
            .await
            .unwrap();
        assert_eq!(number.to_string(), "ABC/PZ/2024/11/0001");
    }
}
