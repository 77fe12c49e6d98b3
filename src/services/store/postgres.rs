use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, instrument, trace};
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::models::{Doctor, NewDoctor, NewPatient, Patient};

/// PostgreSQL backed account store.
///
/// Relies on the unique indexes on `doctors.email` and `patients.email`
/// created by the migrations in `migrations/`.
pub struct PgAccountStore {
    db_pool: PgPool,
}

impl PgAccountStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self))]
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        trace!("Looking up doctor by email");
        let doctor = sqlx::query_as::<_, Doctor>(
            r#"
            SELECT id, name, specialization, email, degree, rate, description,
                   image_url, password_hash, created_at
            FROM doctors
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Database error during doctor lookup"))?;

        Ok(doctor)
    }

    #[instrument(skip(self))]
    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let doctor = sqlx::query_as::<_, Doctor>(
            r#"
            SELECT id, name, specialization, email, degree, rate, description,
                   image_url, password_hash, created_at
            FROM doctors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Database error during doctor lookup"))?;

        Ok(doctor)
    }

    #[instrument(skip_all, fields(email = %doctor.email))]
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        // ON CONFLICT makes the uniqueness check and the insert a single statement
        let inserted = sqlx::query_as::<_, Doctor>(
            r#"
            INSERT INTO doctors
                (name, specialization, email, degree, rate, description, image_url, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, specialization, email, degree, rate, description,
                      image_url, password_hash, created_at
            "#,
        )
        .bind(&doctor.name)
        .bind(&doctor.specialization)
        .bind(&doctor.email)
        .bind(&doctor.degree)
        .bind(doctor.rate)
        .bind(&doctor.description)
        .bind(&doctor.image_url)
        .bind(&doctor.password_hash)
        .fetch_optional(&self.db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to insert doctor"))?;

        match inserted {
            Some(doctor) => {
                debug!(doctor_id = %doctor.id, "Doctor inserted");
                Ok(doctor)
            }
            None => {
                debug!("Doctor email already registered");
                Err(StoreError::EmailTaken)
            }
        }
    }

    #[instrument(skip(self))]
    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        trace!("Looking up patient by email");
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, name, email, password_hash, wallet_balance, created_at
            FROM patients
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Database error during patient lookup"))?;

        Ok(patient)
    }

    #[instrument(skip(self))]
    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, name, email, password_hash, wallet_balance, created_at
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Database error during patient lookup"))?;

        Ok(patient)
    }

    #[instrument(skip_all, fields(email = %patient.email))]
    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        let inserted = sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (name, email, password_hash, wallet_balance)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, password_hash, wallet_balance, created_at
            "#,
        )
        .bind(&patient.name)
        .bind(&patient.email)
        .bind(&patient.password_hash)
        .fetch_optional(&self.db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to insert patient"))?;

        inserted
            .inspect(|patient| debug!(patient_id = %patient.id, "Patient inserted"))
            .ok_or(StoreError::EmailTaken)
    }
}
