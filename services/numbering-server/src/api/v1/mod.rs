//! Version 1 API routes.

mod numbers;

pub use numbers::{AllocateNumberRequest, AllocateNumberResponse, PeriodBody};

use axum::Router;

use crate::state::AppState;

/// Create all v1 routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(numbers::routes())
}
