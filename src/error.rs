//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation. Internal
//! failures are logged with full detail here and reach the client only as a
//! generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::services::{
    jwt::JwtError, password::PasswordError, storage::StorageError, store::StoreError,
};

/// Central application error type that encompasses all possible error conditions.
///
/// Client errors carry the exact message to return. Every other variant is
/// logged when converted into a response and answered with a 500.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("object storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("token error: {0}")]
    Token(#[from] JwtError),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("payload too large")]
    PayloadTooLarge,
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(e) => error!(error = %e, "Account store failure"),
            AppError::Storage(e) => error!(error = %e, "Object storage failure"),
            AppError::Password(e) => error!(error = %e, "Password hashing failure"),
            AppError::Token(e) => error!(error = %e, "Token issuance failure"),
            _ => {}
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Upload exceeds size limit"),
            AppError::Store(_)
            | AppError::Storage(_)
            | AppError::Password(_)
            | AppError::Token(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(ErrorBody { message });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
