//! # Patient Signup Handler

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use super::auth::validation_message;
use crate::error::{AppError, AppResult};
use crate::models::{AppState, NewPatient, Patient, Role};
use crate::services::store::StoreError;
use crate::utils::validator::{normalize_email, validate_not_blank};

/// Request payload for patient signup
#[derive(Debug, Deserialize, Validate)]
pub struct PatientSignupRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response for a successful patient signup
///
/// The record is returned under `patient`, matching the login response.
/// Clients of the earlier API that read `newPatient` must switch to this key.
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientSignupResponse {
    pub message: String,
    pub token: String,
    pub patient: Patient,
}

/// Registers a new patient with an empty wallet.
///
/// POST /api/auth/patient/signup
///
/// Breaking change: the created record is under `patient`, not `newPatient`.
///
/// The email is claimed by a single atomic insert, so two concurrent signups
/// for the same address cannot both succeed.
///
/// # Returns
///
/// - `201 Created` with [`PatientSignupResponse`] - Patient created
/// - `400 Bad Request` - Invalid input or email already registered
/// - `500 Internal Server Error` - Hashing, store or token failure
#[instrument(
    skip_all,
    fields(
        email = %payload.email,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn patient_signup(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<PatientSignupRequest>,
) -> AppResult<impl IntoResponse> {
    debug!("Processing patient signup");

    payload.email = normalize_email(&payload.email);
    if let Err(e) = payload.validate() {
        warn!(errors = %e, "Invalid patient signup payload");
        return Err(AppError::BadRequest(validation_message(&e)));
    }

    let password_hash = state.passwords.hash(&payload.password).await?;

    let new_patient = NewPatient {
        name: payload.name.trim().to_string(),
        email: payload.email,
        password_hash,
    };

    let patient = match state.accounts.insert_patient(new_patient).await {
        Ok(patient) => patient,
        Err(StoreError::EmailTaken) => {
            warn!("Patient email already registered");
            return Err(AppError::BadRequest("User already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.jwt_service.issue_token(patient.id, Role::Patient)?;
    info!(patient_id = %patient.id, "Patient created");

    Ok((
        StatusCode::CREATED,
        Json(PatientSignupResponse {
            message: "User created successfully".to_string(),
            token,
            patient,
        }),
    ))
}
