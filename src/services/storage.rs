//! # Object Storage Service
//!
//! Stores doctor profile images and hands out URLs for them. The service
//! trait allows switching between a managed bucket and the local disk.
//!
//! ## Implementations
//!
//! - [`LocalObjectStorage`] - Development implementation writing under `UPLOAD_DIR`,
//!   files are served back by the router at `/uploads`
//! - [`FirebaseStorage`] - Production implementation using the Firebase Storage REST API
//!
//! ## Usage
//!
//! The storage backend is selected from the `APP_ENV` environment variable:
//! - **Production**: Uses `FirebaseStorage`
//! - **Development/Testing**: Uses `LocalObjectStorage`

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{StatusCode, Url, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::utils::file::FileManager;

/// Errors that can occur during object storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Storage API error {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `data` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Returns a URL from which the object under `key` can be downloaded.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when nothing is stored under `key`.
    async fn public_url(&self, key: &str) -> Result<String, StorageError>;

    /// Removes the object under `key`. Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Local disk storage for development and testing
///
/// Objects are written to `{root}/{key}` and addressed as
/// `{base_url}/uploads/{key}`.
pub struct LocalObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStorage {
    /// Creates a new local storage rooted at `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory objects are written under
    /// * `base_url` - Public origin of this service, e.g. `http://localhost:8090`
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let root = root.into();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(root = %root.display(), %base_url, "Initializing local object storage");
        Self { root, base_url }
    }

    /// Directory served under `/uploads`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to a path inside the root, refusing anything that could escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            warn!(key, "Rejected object key");
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        FileManager::save_file(&path, &data).await?;
        info!("Object stored on local disk");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        let path = self.object_path(key)?;
        if !tokio::fs::try_exists(&path).await? {
            warn!("Requested URL for missing object");
            return Err(StorageError::NotFound(key.to_string()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| StorageError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("uploads")
            // each key component becomes one percent-encoded segment
            .extend(key.split('/'));

        Ok(url.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        FileManager::remove_file(&path).await?;
        Ok(())
    }
}

/// Metadata subset returned by the Firebase Storage object endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    /// Comma separated list of download tokens
    download_tokens: Option<String>,
}

/// Firebase Storage service for production use
///
/// Talks to the Firebase Storage REST API (`/v0/b/{bucket}/o`). Download URLs
/// carry the object's first download token, like the ones handed out by the
/// Firebase client SDKs.
///
/// # Configuration
///
/// - `FIREBASE_BUCKET` - Bucket name, e.g. `my-app.appspot.com`
/// - `FIREBASE_TOKEN` / `FIREBASE_TOKEN_FILE` - Optional bearer token
/// - `FIREBASE_API_BASE` - Optional API origin override
pub struct FirebaseStorage {
    api_base: Url,
    bucket: String,
    token: Option<SecretString>,
    http_client: reqwest::Client,
}

impl FirebaseStorage {
    /// Public Firebase Storage API origin
    pub const DEFAULT_API_BASE: &'static str = "https://firebasestorage.googleapis.com/v0";

    /// Creates a new Firebase storage client.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidUrl`] if `api_base` is not an absolute URL.
    pub fn new(
        api_base: &str,
        bucket: String,
        token: Option<SecretString>,
    ) -> Result<Self, StorageError> {
        let api_base = Url::parse(api_base.trim_end_matches('/'))
            .map_err(|e| StorageError::InvalidUrl(format!("{api_base}: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(api_base.to_string()));
        }

        info!(api_base = %api_base, %bucket, "Initializing Firebase storage");

        Ok(Self {
            api_base,
            bucket,
            token,
            http_client: reqwest::Client::new(),
        })
    }

    /// `{api_base}/b/{bucket}/o`, optionally followed by the encoded object name.
    fn object_url(&self, key: Option<&str>) -> Url {
        let mut url = self.api_base.clone();
        // cannot_be_a_base was ruled out in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["b", self.bucket.as_str(), "o"]);
            if let Some(key) = key {
                // `push` percent-encodes '/' so the key stays one segment
                segments.push(key);
            }
        }
        url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn api_error(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response body".to_string());
        error!(%status, error_body = %body, "Storage API returned error");
        StorageError::Api { status, body }
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, size = data.len()))]
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        debug!("Uploading object to storage API");

        let request = self
            .http_client
            .post(self.object_url(None))
            .query(&[("uploadType", "media"), ("name", key)])
            .header(header::CONTENT_TYPE, content_type)
            .body(data);

        let response = self.authorized(request).send().await.map_err(|e| {
            error!(error = %e, "Network request to storage API failed");
            StorageError::Request(e)
        })?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        info!("Object uploaded");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        let object_url = self.object_url(Some(key));
        let response = self
            .authorized(self.http_client.get(object_url.clone()))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Object not found in storage");
            return Err(StorageError::NotFound(key.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let metadata: ObjectMetadata = response.json().await?;
        let mut download_url = object_url;
        {
            let mut query = download_url.query_pairs_mut();
            query.append_pair("alt", "media");
            if let Some(token) = metadata
                .download_tokens
                .as_deref()
                .and_then(|tokens| tokens.split(',').next())
                .filter(|token| !token.is_empty())
            {
                query.append_pair("token", token);
            }
        }

        debug!(url = %download_url, "Download URL resolved");
        Ok(download_url.into())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .authorized(self.http_client.delete(self.object_url(Some(key))))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                info!("Object deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!("Object already absent");
                Ok(())
            }
            _ => Err(Self::api_error(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firebase_object_urls_encode_the_key() {
        let storage = FirebaseStorage::new(
            "https://firebasestorage.googleapis.com/v0/",
            "demo.appspot.com".into(),
            None,
        )
        .unwrap();

        assert_eq!(
            storage.object_url(None).as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o"
        );
        assert_eq!(
            storage.object_url(Some("doctor-images/1_face.png")).as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/doctor-images%2F1_face.png"
        );
    }

    #[test]
    fn firebase_rejects_relative_base() {
        assert!(matches!(
            FirebaseStorage::new("not a url", "bucket".into(), None),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn local_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost:8090/");
        let key = "doctor-images/1_face.png";

        storage
            .upload(key, Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(
            storage.public_url(key).await.unwrap(),
            "http://localhost:8090/uploads/doctor-images/1_face.png"
        );
        assert_eq!(std::fs::read(dir.path().join(key)).unwrap(), b"png");

        storage.delete(key).await.unwrap();
        assert!(matches!(
            storage.public_url(key).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn local_urls_encode_reserved_characters() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost:8090");
        let key = "doctor-images/1_a?b#c 100%.png";

        storage
            .upload(key, Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        let url = storage.public_url(key).await.unwrap();

        assert_eq!(
            url,
            "http://localhost:8090/uploads/doctor-images/1_a%3Fb%23c%20100%25.png"
        );
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.query(), None);
        assert_eq!(parsed.fragment(), None);
        assert_eq!(parsed.path_segments().unwrap().count(), 3);
    }

    #[tokio::test]
    async fn local_storage_refuses_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost");

        for key in ["../outside.png", "/etc/passwd", "", "a/../../b.png"] {
            assert!(
                matches!(
                    storage.upload(key, Bytes::new(), "image/png").await,
                    Err(StorageError::InvalidKey(_))
                ),
                "{key:?} should be rejected"
            );
        }
    }
}
