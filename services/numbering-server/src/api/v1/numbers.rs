//! Document number allocation endpoint.
//!
//! Document-creation workflows call this once per document; the response
//! carries the canonical number string plus its components. Allocation
//! failures are never retried here — the caller owns retry policy.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use backoffice_numbering::{AllocateError, DocumentNumber, Period};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::state::AppState;

/// Create document number routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/document-numbers", post(allocate_number))
}

/// Request to allocate the next document number.
///
/// All fields arrive as plain values; the allocator performs the actual
/// validation so that missing and empty fields produce the same 400.
#[derive(Debug, Deserialize, Serialize)]
pub struct AllocateNumberRequest {
    /// Owning tenant's short code.
    #[serde(default)]
    pub tenant_code: Option<String>,

    /// Document type code, e.g. "FV", "WZ", "PZ".
    #[serde(default)]
    pub document_type: Option<String>,

    /// Optional sub-scope, e.g. a warehouse number.
    #[serde(default)]
    pub sub_scope: Option<String>,

    /// Optional explicit period; when absent the period is derived from the
    /// current time at the server's configured UTC offset.
    #[serde(default)]
    pub period: Option<PeriodBody>,
}

/// An explicitly supplied period.
#[derive(Debug, Deserialize, Serialize)]
pub struct PeriodBody {
    pub year: i32,
    pub month: u32,
}

/// Response for a successful allocation.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct AllocateNumberResponse {
    /// The canonical document number string.
    pub document_number: String,

    /// Scope components echoed back for convenience.
    pub tenant_code: String,
    pub document_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_scope: Option<String>,

    /// The period the number was allocated in.
    pub period_year: i32,
    pub period_month: u32,

    /// The allocated sequence integer.
    pub sequence: u64,
}

impl AllocateNumberResponse {
    fn from_number(number: &DocumentNumber) -> Self {
        let key = number.key();
        Self {
            document_number: number.to_string(),
            tenant_code: key.tenant_code().to_string(),
            document_type: key.document_type().to_string(),
            sub_scope: key.sub_scope().map(str::to_string),
            period_year: key.period().year(),
            period_month: key.period().month(),
            sequence: number.sequence(),
        }
    }
}

/// Allocate the next document number for a scope.
///
/// POST /v1/document-numbers
async fn allocate_number(
    State(state): State<AppState>,
    Json(req): Json<AllocateNumberRequest>,
) -> Result<Response, ApiError> {
    let tenant_code = req.tenant_code.as_deref().unwrap_or_default();
    let document_type = req.document_type.as_deref().unwrap_or_default();
    let sub_scope = req.sub_scope.as_deref();

    let result = match &req.period {
        Some(body) => {
            let period = Period::new(body.year, body.month)
                .map_err(|e| ApiError::from(AllocateError::InvalidScope(e)))?;
            state
                .allocator()
                .allocate_in_period(tenant_code, document_type, sub_scope, period)
                .await
        }
        None => {
            state
                .allocator()
                .allocate(tenant_code, document_type, sub_scope, None)
                .await
        }
    };

    let number = result.map_err(|err| {
        match &err {
            AllocateError::InvalidScope(reason) => {
                debug!(%reason, "Rejected document number request");
            }
            retryable => {
                warn!(error = %retryable, "Document number allocation failed");
            }
        }
        ApiError::from(err)
    })?;

    debug!(document_number = %number, "Allocated document number");

    Ok((StatusCode::CREATED, Json(AllocateNumberResponse::from_number(&number))).into_response())
}
