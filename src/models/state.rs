use std::sync::Arc;

use tracing::{debug, info};

use crate::services::{
    jwt::JwtService, password::PasswordService, storage::ObjectStorage, store::AccountStore,
};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Doctor and patient persistence.
    pub accounts: Arc<dyn AccountStore>,
    /// Storage for doctor profile images.
    pub storage: Arc<dyn ObjectStorage>,
    /// JWT service for token generation and validation.
    pub jwt_service: JwtService,
    /// bcrypt hashing and verification.
    pub passwords: PasswordService,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `accounts` - Account store for both roles
    /// * `storage` - Object storage for uploaded images
    /// * `jwt_service` - Service for JWT token operations
    /// * `passwords` - Password hashing service
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        storage: Arc<dyn ObjectStorage>,
        jwt_service: JwtService,
        passwords: PasswordService,
    ) -> Self {
        info!("Initializing application state");
        debug!(
            token_expires_in = jwt_service.expires_in(),
            ?passwords,
            "Services configured"
        );

        Self {
            accounts,
            storage,
            jwt_service,
            passwords,
        }
    }
}
