//! Application state shared across request handlers.

use std::sync::Arc;

use backoffice_numbering::Allocator;

use crate::db::Database;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    allocator: Allocator,
    /// Present when counters live in Postgres; `None` in dev mode, where the
    /// in-memory store backs the allocator.
    db: Option<Database>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(allocator: Allocator, db: Option<Database>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { allocator, db }),
        }
    }

    /// Get a reference to the allocator.
    pub fn allocator(&self) -> &Allocator {
        &self.inner.allocator
    }

    /// Get a reference to the database, when one is configured.
    pub fn db(&self) -> Option<&Database> {
        self.inner.db.as_ref()
    }
}
