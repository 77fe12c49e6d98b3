//! # Text Input Validation Utilities
//!
//! Patterns shared by the upload filter and the signup payload validators.

use std::sync::LazyLock;

use regex::Regex;

/// Image type allow-list, matched against both the file extension and the
/// MIME subtype of an upload.
///
/// # Examples
///
/// - `png`, `JPG`, `jpeg`, `gif` ✓ Valid
/// - `webp`, `pdf`, `txt` ✗ Invalid
pub static IMAGE_TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(jpeg|jpg|png|gif)$").expect("static regex is valid"));

/// Checks that a form value contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Normalizes an email address for lookups and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
