//! Error types for scope validation, number parsing, and allocation.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while validating scope components, before any storage
/// interaction takes place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The tenant code is empty.
    #[error("tenant code cannot be empty")]
    EmptyTenantCode,

    /// The document type is empty.
    #[error("document type cannot be empty")]
    EmptyDocumentType,

    /// A sub-scope was supplied but is empty. Pass `None` for "not
    /// applicable" instead.
    #[error("sub-scope cannot be empty; omit it instead")]
    EmptySubScope,

    /// A scope component exceeds its maximum length.
    #[error("{field} is too long: {len} chars (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A scope component contains the `/` separator, which would make the
    /// rendered document number ambiguous.
    #[error("{field} cannot contain '/'")]
    ContainsSeparator { field: &'static str },

    /// The month is outside 1-12.
    #[error("month out of range: {0} (expected 1-12)")]
    MonthOutOfRange(u32),

    /// The year is outside the supported range.
    #[error("year out of range: {0} (expected 1-9999)")]
    YearOutOfRange(i32),
}

/// Errors that can occur when parsing a document number string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberParseError {
    /// The input string is empty.
    #[error("document number cannot be empty")]
    Empty,

    /// The input does not have 5 or 6 `/`-separated segments.
    #[error("expected 5 or 6 '/'-separated segments, got {0}")]
    SegmentCount(usize),

    /// A scope segment failed validation.
    #[error("invalid scope segment: {0}")]
    Scope(#[from] ScopeError),

    /// The year segment is not a valid year.
    #[error("invalid year segment: {0:?}")]
    Year(String),

    /// The month segment is not a zero-padded two-digit month.
    #[error("invalid month segment: {0:?}")]
    Month(String),

    /// The sequence segment is not a zero-padded integer of at least four
    /// digits, or is zero.
    #[error("invalid sequence segment: {0:?}")]
    Sequence(String),
}

/// Errors returned by [`Allocator`](crate::Allocator) operations.
///
/// Every variant guarantees that the counter row's `last_number` is exactly
/// what it was before the call; no partial increment is ever observable.
#[derive(Debug, Error)]
pub enum AllocateError {
    /// The scope inputs were rejected before touching storage. Not worth
    /// retrying until the caller fixes its input.
    #[error("invalid scope: {0}")]
    InvalidScope(#[from] ScopeError),

    /// The counter store could not be reached or the transaction failed to
    /// commit. The increment was rolled back; a retry is safe and either
    /// allocates one new number or fails again.
    #[error("counter store unavailable: {0}")]
    StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The exclusive row lock could not be acquired within the configured
    /// bound. Safe to retry, typically with backoff; contention on one scope
    /// resolves as other requests complete.
    #[error("timed out waiting for the sequence lock after {waited:?}")]
    LockTimeout { waited: Duration },
}

impl AllocateError {
    /// Returns true if a retry of the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AllocateError::StorageUnavailable(_) | AllocateError::LockTimeout { .. }
        )
    }
}

impl From<crate::StoreError> for AllocateError {
    fn from(err: crate::StoreError) -> Self {
        match err {
            crate::StoreError::Unavailable(source) => Self::StorageUnavailable(source),
            crate::StoreError::LockTimeout { waited } => Self::LockTimeout { waited },
        }
    }
}
