use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A persisted patient record, one row of the `patients` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Starts at zero on signup
    pub wallet_balance: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields required to insert a new patient.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewPatient {
    pub fn into_patient(self, id: Uuid, created_at: OffsetDateTime) -> Patient {
        Patient {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            wallet_balance: 0.0,
            created_at,
        }
    }
}
