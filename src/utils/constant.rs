//! # Application Constants
//!
//! This module defines configuration constants used throughout the service.
//! These constants control token lifetimes, upload limits and storage layout.

use std::time::Duration;

/// Expiration time for issued JWT tokens
///
/// Tokens are not refreshed or revoked, they simply expire.
pub const TOKEN_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// bcrypt cost used when `BCRYPT_COST` is not set
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Maximum accepted request body for the doctor signup form (5 MiB)
///
/// Larger requests are rejected by axum with `413 Payload Too Large`.
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Object storage prefix for doctor profile images
pub const DOCTOR_IMAGE_PREFIX: &str = "doctor-images";

/// Message returned for any failed login, regardless of the cause
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
