//! # JWT Service
//!
//! This module provides JSON Web Token (JWT) functionality for account
//! authentication. Tokens are HS256 signed with a shared secret, embed the
//! account id and role, and expire after [`TOKEN_EXPIRY`].
//!
//! There is no refresh, rotation or revocation: a token is valid until it
//! expires.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::models::Role;
use crate::utils::constant::TOKEN_EXPIRY;

/// Errors that can occur during JWT operations
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID as string)
    pub sub: String,
    /// Table the subject belongs to
    pub role: Role,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Service for issuing and validating account tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtService {
    /// Creates a new JWT service with the provided keys.
    ///
    /// # Arguments
    ///
    /// * `encoding_key` - Key used for signing JWT tokens
    /// * `decoding_key` - Key used for verifying JWT tokens
    pub fn new(encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        Self {
            encoding_key,
            decoding_key,
            expiry: TOKEN_EXPIRY,
        }
    }

    /// Creates a service whose signing and verification keys both derive from `secret`.
    pub fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self::new(
            EncodingKey::from_secret(bytes),
            DecodingKey::from_secret(bytes),
        )
    }

    /// Issues a signed token for the given account.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::EncodingError`] if signing fails.
    #[instrument(skip(self))]
    pub fn issue_token(&self, account_id: Uuid, role: Role) -> Result<String, JwtError> {
        trace!("Issuing token");

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let claims = Claims {
            sub: account_id.to_string(),
            role,
            exp: now + self.expiry.as_secs(),
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        debug!(exp = claims.exp, "Token issued");
        Ok(token)
    }

    /// Validates a token and returns its claims.
    ///
    /// This method verifies the token signature and checks expiration.
    ///
    /// # Errors
    ///
    /// - [`JwtError::TokenExpired`] - Token has expired
    /// - [`JwtError::InvalidToken`] - Token is malformed or has invalid signature
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        trace!("Validating token");

        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                trace!(account_id = %token_data.claims.sub, "Token validated successfully");
                Ok(token_data.claims)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Token expired");
                Err(JwtError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid token");
                Err(JwtError::InvalidToken)
            }
        }
    }

    /// Seconds until a freshly issued token expires.
    #[inline]
    pub fn expires_in(&self) -> u64 {
        self.expiry.as_secs()
    }
}
