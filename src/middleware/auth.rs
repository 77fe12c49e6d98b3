//! # Bearer Token Middleware
//!
//! Guards routes that need a signed-in doctor or patient. Handlers behind it
//! read the caller from the [`AuthUser`] request extension.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, instrument, trace, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{AppState, Role};
use crate::services::jwt::Claims;

/// Resolves `Authorization: Bearer <jwt>` into an [`AuthUser`].
///
/// A missing header or a non-bearer scheme answers `401 Missing bearer token`.
/// A bad signature, an expired token or a `sub` that is not a UUID answers
/// `401 Invalid or expired token`. The account itself is not loaded here.
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    trace!("Processing authentication middleware");

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        warn!("Missing Authorization header");
        return Err(AppError::Unauthorized("Missing bearer token"));
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        warn!("Invalid Authorization header format");
        return Err(AppError::Unauthorized("Missing bearer token"));
    };
    trace!("Extracted bearer token from Authorization header");

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        AppError::Unauthorized("Invalid or expired token")
    })?;

    let account_id = Uuid::try_parse(&claims.sub).map_err(|e| {
        error!(error = %e, "Failed to parse account ID from token claims");
        AppError::Unauthorized("Invalid or expired token")
    })?;

    debug!(%account_id, role = %claims.role, "Authentication successful");
    req.extensions_mut().insert(AuthUser {
        account_id,
        role: claims.role,
        claims,
    });

    Ok(next.run(req).await)
}

/// Authenticated account information available to handlers
///
/// # Usage in Handlers
///
/// ```rust
/// use axum::{extract::Extension, response::IntoResponse};
/// use medauth::middleware::AuthUser;
/// async fn protected_handler(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
///     format!("Hello {}: {}", user.role, user.account_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identifier of the authenticated doctor or patient
    pub account_id: Uuid,
    /// Which table `account_id` refers to
    pub role: Role,
    /// JWT claims containing additional token metadata
    pub claims: Claims,
}
