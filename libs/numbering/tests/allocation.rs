//! Allocation properties under concurrency: uniqueness, scope isolation,
//! monotonic issue order, and clean failure behavior.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_numbering::{
    AllocateError, Allocator, MemoryStore, Period, ScopeKey, SequenceIncrement, SequenceStore,
    StoreError,
};
use chrono::{TimeZone, Utc};
use futures_util::future::join_all;

const TASKS: usize = 64;

fn allocator() -> Allocator {
    Allocator::new(Arc::new(MemoryStore::new()))
}

fn march(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
}

fn april() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_allocations_form_a_contiguous_sequence() {
    let allocator = allocator();

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let allocator = allocator.clone();
            tokio::spawn(async move {
                allocator
                    .allocate("ABC", "FV", None, Some(march(15)))
                    .await
                    .unwrap()
                    .sequence()
            })
        })
        .collect();

    let issued: BTreeSet<u64> = join_all(handles)
        .await
        .into_iter()
        .map(|res| res.unwrap())
        .collect();

    // N distinct values forming exactly {1, ..., N}.
    let expected: BTreeSet<u64> = (1..=TASKS as u64).collect();
    assert_eq!(issued, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn scopes_are_isolated_under_concurrency() {
    let allocator = allocator();

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let a = allocator.clone();
        handles.push(tokio::spawn(async move {
            ("FV", a.allocate("ABC", "FV", None, Some(march(1))).await.unwrap().sequence())
        }));
        let a = allocator.clone();
        handles.push(tokio::spawn(async move {
            ("WZ", a.allocate("ABC", "WZ", Some("01"), Some(march(1))).await.unwrap().sequence())
        }));
    }

    let mut fv = BTreeSet::new();
    let mut wz = BTreeSet::new();
    for res in join_all(handles).await {
        match res.unwrap() {
            ("FV", seq) => assert!(fv.insert(seq)),
            (_, seq) => assert!(wz.insert(seq)),
        }
    }

    // Each scope saw exactly as many allocations as requests made against it,
    // with no skips or duplicates caused by the other.
    let expected: BTreeSet<u64> = (1..=TASKS as u64).collect();
    assert_eq!(fv, expected);
    assert_eq!(wz, expected);
}

#[tokio::test]
async fn periods_are_independent_sequences() {
    let allocator = allocator();

    let in_march = allocator.allocate("ABC", "FV", None, Some(march(31))).await.unwrap();
    let in_april = allocator.allocate("ABC", "FV", None, Some(april())).await.unwrap();

    assert_eq!(in_march.to_string(), "ABC/FV/2025/03/0001");
    assert_eq!(in_april.to_string(), "ABC/FV/2025/04/0001");
}

#[tokio::test]
async fn repeated_allocations_are_strictly_increasing() {
    let allocator = allocator();

    let mut previous = 0;
    for _ in 0..100 {
        let seq = allocator
            .allocate("ABC", "MM", Some("02"), Some(march(2)))
            .await
            .unwrap()
            .sequence();
        assert!(seq > previous);
        assert_eq!(seq, previous + 1);
        previous = seq;
    }
}

/// Fails the first increment after "acquiring" the row, without committing,
/// to model a connection drop mid-transaction.
struct DropsFirstCommit {
    inner: MemoryStore,
    dropped: AtomicBool,
}

#[async_trait]
impl SequenceStore for DropsFirstCommit {
    async fn lock_and_increment(&self, key: &ScopeKey) -> Result<SequenceIncrement, StoreError> {
        if !self.dropped.swap(true, Ordering::SeqCst) {
            return Err(StoreError::unavailable("connection reset mid-transaction"));
        }
        self.inner.lock_and_increment(key).await
    }
}

#[tokio::test]
async fn failed_attempt_leaves_no_trace() {
    let store = Arc::new(DropsFirstCommit {
        inner: MemoryStore::new(),
        dropped: AtomicBool::new(false),
    });
    let allocator = Allocator::new(store);

    let err = allocator
        .allocate("ABC", "FV", None, Some(march(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocateError::StorageUnavailable(_)));
    assert!(err.is_retryable());

    // The counter is exactly as if the failed call never happened: the
    // would-be number is issued next, not skipped and not duplicated.
    let next = allocator
        .allocate("ABC", "FV", None, Some(march(10)))
        .await
        .unwrap();
    assert_eq!(next.to_string(), "ABC/FV/2025/03/0001");
}

#[tokio::test]
async fn explicit_period_validation_rejects_bad_months() {
    assert!(Period::new(2025, 0).is_err());
    assert!(Period::new(2025, 13).is_err());
    assert!(Period::new(2025, 12).is_ok());
}
