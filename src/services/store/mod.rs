//! # Account Store
//!
//! Persistence seam for doctor and patient records. Handlers only talk to the
//! [`AccountStore`] trait, which has two implementations:
//!
//! - [`PgAccountStore`] - PostgreSQL via sqlx, used whenever `DATABASE_URL` is set
//! - [`MemoryAccountStore`] - process local maps for development and tests
//!
//! ## Uniqueness
//!
//! Inserts are atomic "insert if absent" operations keyed on the email
//! address. A second insert for the same email fails with
//! [`StoreError::EmailTaken`] no matter how the two requests interleave.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Doctor, NewDoctor, NewPatient, Patient};

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Lookup and insert operations for both account kinds.
///
/// Emails passed in are expected to be normalized already
/// (see [`crate::utils::validator::normalize_email`]).
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError>;

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;

    /// Inserts a doctor unless one with the same email exists.
    ///
    /// # Errors
    ///
    /// - [`StoreError::EmailTaken`] - the email is already registered
    /// - [`StoreError::Db`] - the datastore failed
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError>;

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError>;

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;

    /// Inserts a patient with a zero wallet balance unless the email exists.
    ///
    /// # Errors
    ///
    /// Same as [`AccountStore::insert_doctor`].
    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError>;
}
