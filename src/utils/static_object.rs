use std::env;
use std::sync::LazyLock;

use tracing::error;

use crate::utils::constant::DEFAULT_BCRYPT_COST;

/// Root directory used by the local object storage backend.
pub static UPLOAD_DIR: LazyLock<String> = LazyLock::new(|| {
    env::var("UPLOAD_DIR").unwrap_or_else(|_| {
        error!("Missing UPLOAD_DIR env var, using fallback './uploads'");
        "./uploads".to_string()
    })
});

/// Base URL prepended to object keys when the local backend builds download URLs.
pub static PUBLIC_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("PUBLIC_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| {
            error!("Missing PUBLIC_BASE_URL env var, using fallback 'http://localhost:8090'");
            "http://localhost:8090".to_string()
        })
});

pub static BCRYPT_COST: LazyLock<u32> = LazyLock::new(|| {
    env::var("BCRYPT_COST")
        .ok()
        .and_then(|val| val.parse().ok())
        .filter(|cost| (4..=31).contains(cost))
        .unwrap_or_else(|| {
            error!(
                fallback = DEFAULT_BCRYPT_COST,
                "Invalid or missing BCRYPT_COST env var, using fallback"
            );
            DEFAULT_BCRYPT_COST
        })
});
