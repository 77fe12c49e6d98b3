//! # Password Service
//!
//! bcrypt hashing and verification. Both operations are CPU bound and run on
//! tokio's blocking pool so they never stall the async workers.

use thiserror::Error;
use tracing::{instrument, trace};

/// Errors that can occur while hashing or verifying passwords
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hashes and verifies passwords with a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `password`, returning the modular crypt string (`$2b$...`).
    #[instrument(skip_all, fields(cost = self.cost))]
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        trace!("Password hashed");
        Ok(hashed)
    }

    /// Compares `password` against a stored bcrypt hash.
    ///
    /// A malformed stored hash is reported as an error, not as a mismatch.
    #[instrument(skip_all)]
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        trace!(matched, "Password verified");
        Ok(matched)
    }
}
