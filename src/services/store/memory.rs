use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::models::{Doctor, NewDoctor, NewPatient, Patient};

/// In-process account store keyed by email.
///
/// `DashMap::entry` holds the shard lock for the email while the record is
/// created, which gives the same insert-if-absent guarantee as the unique
/// index in PostgreSQL. Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryAccountStore {
    doctors: DashMap<String, Doctor>,
    patients: DashMap<String, Patient>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        info!("Initializing in-memory account store");
        Self::default()
    }

    /// Number of stored doctors.
    pub fn doctor_count(&self) -> usize {
        self.doctors.len()
    }

    /// Number of stored patients.
    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        Ok(self.doctors.get(email).map(|entry| entry.value().clone()))
    }

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        Ok(self
            .doctors
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value().clone()))
    }

    #[instrument(skip_all, fields(email = %doctor.email))]
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        match self.doctors.entry(doctor.email.clone()) {
            Entry::Occupied(_) => {
                debug!("Doctor email already registered");
                Err(StoreError::EmailTaken)
            }
            Entry::Vacant(slot) => {
                let doctor = doctor.into_doctor(Uuid::new_v4(), OffsetDateTime::now_utc());
                debug!(doctor_id = %doctor.id, "Doctor inserted");
                Ok(slot.insert(doctor).value().clone())
            }
        }
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        Ok(self.patients.get(email).map(|entry| entry.value().clone()))
    }

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        Ok(self
            .patients
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value().clone()))
    }

    #[instrument(skip_all, fields(email = %patient.email))]
    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        match self.patients.entry(patient.email.clone()) {
            Entry::Occupied(_) => {
                debug!("Patient email already registered");
                Err(StoreError::EmailTaken)
            }
            Entry::Vacant(slot) => {
                let patient = patient.into_patient(Uuid::new_v4(), OffsetDateTime::now_utc());
                debug!(patient_id = %patient.id, "Patient inserted");
                Ok(slot.insert(patient).value().clone())
            }
        }
    }
}
