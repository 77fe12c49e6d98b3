//! # medauth - Doctor and Patient Authentication Backend
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for signup, login and profile
//! - [`middleware`] - Bearer token authentication
//! - [`models`] - Records, roles and shared application state
//! - [`services`] - JWT, password hashing, account store and object storage
//! - [`utils`] - Upload filter, validators, constants and configuration helpers

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::env;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::info;

use crate::handlers::{
    doctor_login, doctor_signup, get_profile, health_check, patient_login, patient_signup,
};
use crate::middleware::auth_middleware;
use crate::models::AppState;
use crate::services::{
    jwt::JwtService,
    password::PasswordService,
    storage::{FirebaseStorage, LocalObjectStorage, ObjectStorage},
    store::AccountStore,
};
use crate::utils::{
    constant::MAX_UPLOAD_SIZE,
    secret::get_secret,
    static_object::{BCRYPT_COST, PUBLIC_BASE_URL, UPLOAD_DIR},
};

/// Creates an Axum router whose object storage is picked from `APP_ENV`.
///
/// # Environment Variables
///
/// - `APP_ENV` - "production" uses [`FirebaseStorage`], otherwise [`LocalObjectStorage`]
/// - `FIREBASE_BUCKET` - Required in production
/// - `FIREBASE_TOKEN` / `FIREBASE_TOKEN_FILE` - Optional bearer token in production
/// - `FIREBASE_API_BASE` - Optional API origin override in production
/// - `UPLOAD_DIR`, `PUBLIC_BASE_URL` - Local storage settings outside production
///
/// Outside production the upload directory is also served at `/uploads`, so
/// the URLs stored on doctor records resolve against this service.
pub fn app(accounts: Arc<dyn AccountStore>) -> Router {
    let app_env = env::var("APP_ENV")
        .unwrap_or_default()
        .to_ascii_lowercase();

    if app_env == "production" {
        info!("Running in production mode with [FirebaseStorage]");
        let bucket =
            env::var("FIREBASE_BUCKET").expect("Env variable `FIREBASE_BUCKET` should be set");
        let api_base = env::var("FIREBASE_API_BASE")
            .unwrap_or_else(|_| FirebaseStorage::DEFAULT_API_BASE.to_string());
        let token = get_secret("FIREBASE_TOKEN_FILE", "FIREBASE_TOKEN");

        let storage = FirebaseStorage::new(&api_base, bucket, token)
            .expect("`FIREBASE_API_BASE` should be an absolute URL");
        app_with_services(accounts, Arc::new(storage))
    } else {
        info!("Running in development mode with [LocalObjectStorage]");
        let storage = LocalObjectStorage::new(UPLOAD_DIR.as_str(), PUBLIC_BASE_URL.as_str());
        let uploads = ServeDir::new(storage.root());

        app_with_services(accounts, Arc::new(storage)).nest_service("/uploads", uploads)
    }
}

/// Creates an Axum router with application routes and state.
///
/// # Arguments
///
/// * `accounts` - Doctor and patient persistence
/// * `storage` - Object storage for doctor images
///
/// # Environment Variables
///
/// - `JWT_SECRET` / `JWT_SECRET_FILE` - Required for token signing and validation
/// - `BCRYPT_COST` - Optional bcrypt cost (default 10)
///
/// # Returns
///
/// A configured Axum router with all application routes and middleware
pub fn app_with_services(
    accounts: Arc<dyn AccountStore>,
    storage: Arc<dyn ObjectStorage>,
) -> Router {
    let jwt_secret = get_secret("JWT_SECRET_FILE", "JWT_SECRET")
        .expect("Env variable `JWT_SECRET` should be set");

    let state = Arc::new(AppState::new(
        accounts,
        storage,
        JwtService::from_secret(&jwt_secret),
        PasswordService::new(*BCRYPT_COST),
    ));

    let protected_routes = Router::new()
        .route("/api/profile", get(get_profile))
        .route_layer(from_fn_with_state(Arc::clone(&state), auth_middleware));

    let public_routes = Router::new()
        .route("/health-check", get(health_check))
        .route(
            "/api/auth/doctor/signup",
            post(doctor_signup).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .route("/api/auth/doctor/login", post(doctor_login))
        .route("/api/auth/patient/signup", post(patient_signup))
        .route("/api/auth/patient/login", post(patient_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
