//! # Profile Handler
//!
//! This module implements the profile endpoint that lets an authenticated
//! doctor or patient fetch their own record.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{AppState, Doctor, Patient, Role};

/// The caller's record, tagged with its role
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProfileResponse {
    Doctor(Doctor),
    Patient(Patient),
}

/// Gets the authenticated account's profile.
///
/// GET /api/profile
///
/// The role in the token decides which table is consulted, so a patient
/// token can never resolve to a doctor record with the same id.
///
/// # Returns
///
/// - `200 OK` with [`ProfileResponse`] - Profile retrieved successfully
/// - `401 Unauthorized` - Missing or invalid authentication token
/// - `404 Not Found` - Account no longer exists
/// - `500 Internal Server Error` - Store error
#[instrument(
    skip_all,
    fields(
        account_id = %user.account_id,
        role = %user.role,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    debug!("Processing profile request");

    let profile = match user.role {
        Role::Doctor => state
            .accounts
            .find_doctor_by_id(user.account_id)
            .await?
            .map(ProfileResponse::Doctor),
        Role::Patient => state
            .accounts
            .find_patient_by_id(user.account_id)
            .await?
            .map(ProfileResponse::Patient),
    };

    let Some(profile) = profile else {
        warn!("Account referenced by token not found");
        return Err(AppError::NotFound("Account not found"));
    };

    info!("Profile retrieved successfully");
    Ok(Json(profile))
}
