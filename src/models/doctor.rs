use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A persisted doctor record.
///
/// Maps one-to-one onto a row of the `doctors` table. The password hash is
/// never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub degree: String,
    /// Consultation rate, never negative
    pub rate: f64,
    pub description: String,
    /// Public download URL returned by the object storage
    pub image_url: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields required to insert a new doctor. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub degree: String,
    pub rate: f64,
    pub description: String,
    pub image_url: String,
    pub password_hash: String,
}

impl NewDoctor {
    /// Materializes the record the way the datastore would.
    pub fn into_doctor(self, id: Uuid, created_at: OffsetDateTime) -> Doctor {
        Doctor {
            id,
            name: self.name,
            specialization: self.specialization,
            email: self.email,
            degree: self.degree,
            rate: self.rate,
            description: self.description,
            image_url: self.image_url,
            password_hash: self.password_hash,
            created_at,
        }
    }
}
