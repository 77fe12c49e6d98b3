//! # Upload Utilities
//!
//! Validation and naming helpers for uploaded doctor images. The filter only
//! looks at what the client declared (file name and content type), it never
//! inspects the bytes themselves.

use std::path::Path;

use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, trace};
use uuid::Uuid;

use crate::utils::validator::IMAGE_TYPE_REGEX;

/// Rejection message shared by every failed image check.
pub const IMAGE_TYPE_ERROR: &str = "Only images (jpeg, jpg, png, gif) are allowed";

/// Provides image validation utilities for upload handlers.
pub struct ImageUploadValidator;

impl ImageUploadValidator {
    /// Validates the declared file name and content type of an upload.
    ///
    /// Both the extension of `file_name` and the subtype of `content_type`
    /// must be one of jpeg, jpg, png or gif. The content type must also be an
    /// `image/*` type.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Both checks passed
    /// * `Err(&str)` - [`IMAGE_TYPE_ERROR`]
    pub fn validate_image_type(file_name: &str, content_type: &str) -> Result<(), &'static str> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        let extension_ok = IMAGE_TYPE_REGEX.is_match(extension);

        // Ignore parameters such as `; charset=binary`
        let essence = content_type.split(';').next().unwrap_or("").trim();
        let mime_ok = essence
            .split_once('/')
            .is_some_and(|(kind, subtype)| {
                kind.eq_ignore_ascii_case("image") && IMAGE_TYPE_REGEX.is_match(subtype)
            });

        trace!(extension, content_type = essence, extension_ok, mime_ok, "Image type checked");

        if extension_ok && mime_ok {
            Ok(())
        } else {
            Err(IMAGE_TYPE_ERROR)
        }
    }

    /// Validates that the file is not empty.
    pub fn validate_file_not_empty(data: &[u8]) -> Result<(), &'static str> {
        if data.is_empty() {
            return Err("Empty file not allowed");
        }
        Ok(())
    }
}

/// Provides naming and file system utilities for stored images.
pub struct FileManager;

impl FileManager {
    /// Reduces a client supplied file name to its last path component.
    ///
    /// Falls back to `image` when nothing usable remains.
    pub fn sanitize_file_name(file_name: &str) -> String {
        // Browsers on Windows may send backslash separated paths
        let last = file_name.rsplit(['/', '\\']).next().unwrap_or("");
        let trimmed = last.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
            "image".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Builds the object key for an uploaded image.
    ///
    /// # Returns
    ///
    /// A key in the format `{prefix}/{unix_millis}_{uuid}_{file_name}`. The
    /// random part keeps two uploads of the same file in the same millisecond
    /// from sharing an object.
    pub fn object_key(prefix: &str, unix_millis: i128, file_name: &str) -> String {
        format!(
            "{prefix}/{unix_millis}_{}_{}",
            Uuid::new_v4().simple(),
            Self::sanitize_file_name(file_name)
        )
    }

    /// Saves file data to the specified path, creating parent directories.
    pub async fn save_file(file_path: &Path, data: &[u8]) -> Result<(), std::io::Error> {
        debug!(file_path = %file_path.display(), size = data.len(), "Saving file");

        if let Some(parent) = file_path.parent() {
            trace!(path = %parent.display(), "Ensuring directory exists");
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(file_path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        debug!(file_path = %file_path.display(), "File saved successfully");
        Ok(())
    }

    /// Removes a file, treating an already missing file as success.
    pub async fn remove_file(file_path: &Path) -> Result<(), std::io::Error> {
        match fs::remove_file(file_path).await {
            Ok(()) => {
                debug!(file_path = %file_path.display(), "File removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file_path = %file_path.display(), "File already absent");
                Ok(())
            }
            Err(e) => {
                error!(file_path = %file_path.display(), error = %e, "Failed to remove file");
                Err(e)
            }
        }
    }
}
