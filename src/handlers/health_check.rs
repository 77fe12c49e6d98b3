//! # Health Check Handler
//!
//! Liveness probe for load balancers and deployment tooling.

use axum::http::StatusCode;
use tracing::{instrument, trace};

/// GET /health-check
///
/// Answers `200 OK` with an empty body as long as the process serves HTTP.
/// Neither the account store nor the object storage is contacted.
#[instrument]
pub async fn health_check() -> StatusCode {
    trace!("Health check endpoint accessed");
    StatusCode::OK
}
