//! # Login Handlers
//!
//! Email and password login for both account kinds. Every failure that could
//! tell a caller whether an email is registered produces the same
//! `400 Invalid email or password` response.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use validator::ValidationErrors;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, Doctor, Patient, Role};
use crate::utils::{constant::INVALID_CREDENTIALS, validator::normalize_email};

/// Request payload shared by both login endpoints
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful doctor login
#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorLoginResponse {
    pub token: String,
    pub doctor: Doctor,
}

/// Response for a successful patient login
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientLoginResponse {
    pub token: String,
    pub patient: Patient,
}

/// Picks the message for the first offending field of a signup payload.
pub(crate) fn validation_message(errors: &ValidationErrors) -> &'static str {
    let fields = errors.field_errors();
    if fields.contains_key("name") {
        "Name is required"
    } else if fields.contains_key("email") {
        "Invalid email address"
    } else if fields.contains_key("password") {
        "Password must be at least 6 characters"
    } else if fields.contains_key("specialization") {
        "Specialization is required"
    } else if fields.contains_key("degree") {
        "Degree is required"
    } else if fields.contains_key("rate") {
        "Rate must be a non-negative number"
    } else {
        "Invalid input"
    }
}

/// Compares a login password against the stored hash.
///
/// A mismatch becomes the generic credentials error; a broken hash is an
/// internal error.
async fn check_password(state: &AppState, password: &str, password_hash: &str) -> AppResult<()> {
    if state.passwords.verify(password, password_hash).await? {
        Ok(())
    } else {
        warn!("Password mismatch");
        Err(AppError::BadRequest(INVALID_CREDENTIALS))
    }
}

/// Logs a patient in.
///
/// POST /api/auth/patient/login
///
/// # Returns
///
/// - `200 OK` with [`PatientLoginResponse`] - Credentials accepted
/// - `400 Bad Request` - Unknown email or wrong password
/// - `500 Internal Server Error` - Store or token failure
#[instrument(
    skip_all,
    fields(
        email = %payload.email,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn patient_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    debug!("Processing patient login");

    let email = normalize_email(&payload.email);
    let Some(patient) = state.accounts.find_patient_by_email(&email).await? else {
        warn!("Login attempt for unknown patient email");
        return Err(AppError::BadRequest(INVALID_CREDENTIALS));
    };

    check_password(&state, &payload.password, &patient.password_hash).await?;

    let token = state.jwt_service.issue_token(patient.id, Role::Patient)?;
    info!(patient_id = %patient.id, "Patient logged in");

    Ok((StatusCode::OK, Json(PatientLoginResponse { token, patient })))
}

/// Logs a doctor in.
///
/// POST /api/auth/doctor/login
///
/// # Returns
///
/// - `200 OK` with [`DoctorLoginResponse`] - Credentials accepted
/// - `400 Bad Request` - Unknown email or wrong password
/// - `500 Internal Server Error` - Store or token failure
#[instrument(
    skip_all,
    fields(
        email = %payload.email,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn doctor_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    debug!("Processing doctor login");

    let email = normalize_email(&payload.email);
    let Some(doctor) = state.accounts.find_doctor_by_email(&email).await? else {
        warn!("Login attempt for unknown doctor email");
        return Err(AppError::BadRequest(INVALID_CREDENTIALS));
    };

    check_password(&state, &payload.password, &doctor.password_hash).await?;

    let token = state.jwt_service.issue_token(doctor.id, Role::Doctor)?;
    info!(doctor_id = %doctor.id, "Doctor logged in");

    Ok((StatusCode::OK, Json(DoctorLoginResponse { token, doctor })))
}
