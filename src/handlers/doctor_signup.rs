//! # Doctor Signup Handler
//!
//! Doctors sign up through a multipart form that carries their profile image.
//! The signup flow is:
//!
//! 1. Parse the form, rejecting non-image files before anything is stored
//! 2. Validate fields and reject known emails early
//! 3. Hash the password and upload the image under a timestamped, unique key
//! 4. Insert the doctor; if that fails, delete the uploaded image again
//! 5. Issue a token

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, trace, warn};
use validator::Validate;

use super::auth::validation_message;
use crate::error::{AppError, AppResult};
use crate::models::{AppState, Doctor, NewDoctor, Role};
use crate::services::store::StoreError;
use crate::utils::{
    constant::DOCTOR_IMAGE_PREFIX,
    file::{FileManager, ImageUploadValidator},
    validator::{normalize_email, validate_not_blank},
};

/// Text fields accepted by the signup form
const TEXT_FIELDS: [&str; 7] = [
    "name",
    "specialization",
    "email",
    "degree",
    "rate",
    "description",
    "password",
];

/// Validated text part of the doctor signup form
#[derive(Debug, Validate)]
pub struct DoctorSignupForm {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub specialization: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub degree: String,
    #[validate(range(min = 0.0))]
    pub rate: f64,
    pub description: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl DoctorSignupForm {
    /// Builds the form from raw multipart text values.
    ///
    /// Missing text fields become empty strings and are caught by validation.
    fn from_fields(mut fields: HashMap<String, String>) -> AppResult<Self> {
        let mut take = |name: &str| fields.remove(name).unwrap_or_default();

        let rate = take("rate")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|rate| rate.is_finite())
            .ok_or(AppError::BadRequest("Rate must be a non-negative number"))?;

        Ok(Self {
            name: take("name").trim().to_string(),
            specialization: take("specialization").trim().to_string(),
            email: normalize_email(&take("email")),
            degree: take("degree").trim().to_string(),
            rate,
            description: take("description").trim().to_string(),
            password: take("password"),
        })
    }
}

/// Image part of the doctor signup form, already through the upload filter
struct UploadedImage {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// Response for a successful doctor signup
#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorSignupResponse {
    pub message: String,
    pub doctor: Doctor,
    pub token: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %e, "Multipart body exceeds size limit");
        AppError::PayloadTooLarge
    } else {
        error!(error = %e, "Error reading multipart form");
        AppError::BadRequest("Invalid multipart data")
    }
}

/// Reads every part of the form. The image is filtered as soon as its headers arrive.
async fn read_form(
    multipart: &mut Multipart,
) -> AppResult<(HashMap<String, String>, Option<UploadedImage>)> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                if image.is_some() {
                    warn!("More than one image in multipart form");
                    return Err(AppError::BadRequest("Only one image file is allowed"));
                }

                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();

                ImageUploadValidator::validate_image_type(&file_name, &content_type).map_err(
                    |e| {
                        warn!(%file_name, %content_type, "Rejected non-image upload");
                        AppError::BadRequest(e)
                    },
                )?;

                let data = field.bytes().await.map_err(multipart_error)?;
                ImageUploadValidator::validate_file_not_empty(&data).map_err(|e| {
                    warn!("Empty file uploaded");
                    AppError::BadRequest(e)
                })?;

                trace!(%file_name, size = data.len(), "Image accepted by upload filter");
                image = Some(UploadedImage {
                    file_name,
                    content_type,
                    data,
                });
            }
            name if TEXT_FIELDS.contains(&name) => {
                let value = field.text().await.map_err(multipart_error)?;
                fields.insert(field_name, value);
            }
            _ => {
                warn!(field_name = %field_name, "Unknown field in multipart form");
            }
        }
    }

    Ok((fields, image))
}

/// Deletes an uploaded image whose doctor record could not be stored.
async fn discard_image(state: &AppState, key: &str) {
    match state.storage.delete(key).await {
        Ok(()) => info!(key, "Removed orphaned doctor image"),
        Err(e) => error!(key, error = %e, "Failed to remove orphaned doctor image"),
    }
}

/// Registers a new doctor together with their profile image.
///
/// POST /api/auth/doctor/signup MultipartForm
///
/// Fields: `name`, `specialization`, `email`, `degree`, `rate`,
/// `description`, `password` and the file field `image`.
///
/// # Returns
///
/// - `201 Created` with [`DoctorSignupResponse`] - Doctor created
/// - `400 Bad Request` - Missing, repeated or non-image file, invalid fields, or email already registered
/// - `413 Payload Too Large` - Form exceeds the upload limit
/// - `500 Internal Server Error` - Hashing, storage, store or token failure
#[instrument(
    skip_all,
    fields(
        email = tracing::field::Empty,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn doctor_signup(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    debug!("Processing doctor signup");

    let (fields, image) = read_form(&mut multipart).await?;

    let Some(image) = image else {
        warn!("No image provided in multipart form");
        return Err(AppError::BadRequest("Image file is required"));
    };

    let form = DoctorSignupForm::from_fields(fields)?;
    if let Err(e) = form.validate() {
        warn!(errors = %e, "Invalid doctor signup form");
        return Err(AppError::BadRequest(validation_message(&e)));
    }
    tracing::Span::current().record("email", form.email.as_str());

    // Saves an upload for a known duplicate; the insert below is still the real check
    if state.accounts.find_doctor_by_email(&form.email).await?.is_some() {
        warn!(email = %form.email, "Doctor email already registered");
        return Err(AppError::BadRequest("Doctor already exists"));
    }

    let password_hash = state.passwords.hash(&form.password).await?;

    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let key = FileManager::object_key(DOCTOR_IMAGE_PREFIX, millis, &image.file_name);
    debug!(%key, size = image.data.len(), "Uploading doctor image");

    state
        .storage
        .upload(&key, image.data, &image.content_type)
        .await?;

    let image_url = match state.storage.public_url(&key).await {
        Ok(url) => url,
        Err(e) => {
            discard_image(&state, &key).await;
            return Err(e.into());
        }
    };

    let new_doctor = NewDoctor {
        name: form.name,
        specialization: form.specialization,
        email: form.email,
        degree: form.degree,
        rate: form.rate,
        description: form.description,
        image_url,
        password_hash,
    };

    let doctor = match state.accounts.insert_doctor(new_doctor).await {
        Ok(doctor) => doctor,
        Err(e) => {
            discard_image(&state, &key).await;
            return Err(match e {
                StoreError::EmailTaken => {
                    warn!("Doctor email registered concurrently");
                    AppError::BadRequest("Doctor already exists")
                }
                other => other.into(),
            });
        }
    };

    let token = state.jwt_service.issue_token(doctor.id, Role::Doctor)?;
    info!(doctor_id = %doctor.id, "Doctor created");

    Ok((
        StatusCode::CREATED,
        Json(DoctorSignupResponse {
            message: "Doctor created successfully".to_string(),
            doctor,
            token,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", " Lisa Cuddy "),
            ("specialization", "Endocrinology"),
            ("email", " Cuddy@PPTH.org "),
            ("degree", "MD"),
            ("rate", "120.5"),
            ("description", "Dean of medicine"),
            ("password", "hunter22"),
        ]
    }

    #[test]
    fn form_is_trimmed_and_normalized() {
        let form = DoctorSignupForm::from_fields(fields(&complete())).unwrap();

        assert_eq!(form.name, "Lisa Cuddy");
        assert_eq!(form.email, "cuddy@ppth.org");
        assert_eq!(form.rate, 120.5);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn unparsable_rate_is_rejected() {
        for rate in ["", "cheap", "NaN", "inf"] {
            let mut pairs = complete();
            pairs.retain(|(k, _)| *k != "rate");
            pairs.push(("rate", rate));

            assert!(
                matches!(
                    DoctorSignupForm::from_fields(fields(&pairs)),
                    Err(AppError::BadRequest("Rate must be a non-negative number"))
                ),
                "{rate:?} should be rejected"
            );
        }
    }

    #[test]
    fn validation_names_the_offending_field() {
        let cases = [
            ("rate", "-1", "Rate must be a non-negative number"),
            ("email", "not-an-email", "Invalid email address"),
            ("password", "short", "Password must be at least 6 characters"),
            ("degree", "  ", "Degree is required"),
        ];

        for (field, value, expected) in cases {
            let mut pairs = complete();
            pairs.retain(|(k, _)| *k != field);
            pairs.push((field, value));

            let form = DoctorSignupForm::from_fields(fields(&pairs)).unwrap();
            let errors = form.validate().unwrap_err();
            assert_eq!(validation_message(&errors), expected, "field {field}");
        }
    }
}
