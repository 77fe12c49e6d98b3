#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::body::Bytes;
use medauth::models::{Doctor, NewDoctor, NewPatient, Patient};
use medauth::services::storage::{ObjectStorage, StorageError};
use medauth::services::store::{AccountStore, MemoryAccountStore, StoreError};
use reqwest::multipart;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const MOCK_STORAGE_BASE: &str = "https://storage.test";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("medauth=debug")
            .with_test_writer()
            .init();
    });
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// An in-memory object storage that records every call for inspection.
#[derive(Debug, Default)]
pub struct MockStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    uploaded_keys: Mutex<Vec<String>>,
    deleted_keys: Mutex<Vec<String>>,
    fail_public_url: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `public_url` call fail
    pub fn fail_public_url(&self) {
        self.fail_public_url.store(true, Ordering::SeqCst);
    }

    /// Keys of all uploads, including ones deleted later
    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploaded_keys.lock().unwrap().clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted_keys.lock().unwrap().clone()
    }

    /// Objects currently stored
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.uploaded_keys.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        if self.fail_public_url.load(Ordering::SeqCst) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("{MOCK_STORAGE_BASE}/{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.deleted_keys.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Account store whose doctor inserts always fail with a database error.
/// Everything else is delegated to an in-memory store.
#[derive(Default)]
pub struct BrokenDoctorInserts {
    inner: MemoryAccountStore,
}

#[async_trait]
impl AccountStore for BrokenDoctorInserts {
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>, StoreError> {
        self.inner.find_doctor_by_email(email).await
    }

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        self.inner.find_doctor_by_id(id).await
    }

    async fn insert_doctor(&self, _doctor: NewDoctor) -> Result<Doctor, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        self.inner.find_patient_by_email(email).await
    }

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        self.inner.find_patient_by_id(id).await
    }

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        self.inner.insert_patient(patient).await
    }
}

/// Account store that behaves as if another request registered the same
/// doctor email between the lookup and the insert.
#[derive(Default)]
pub struct LateDoctorConflict {
    inner: MemoryAccountStore,
}

#[async_trait]
impl AccountStore for LateDoctorConflict {
    async fn find_doctor_by_email(&self, _email: &str) -> Result<Option<Doctor>, StoreError> {
        Ok(None)
    }

    async fn find_doctor_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        self.inner.find_doctor_by_id(id).await
    }

    async fn insert_doctor(&self, _doctor: NewDoctor) -> Result<Doctor, StoreError> {
        Err(StoreError::EmailTaken)
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, StoreError> {
        self.inner.find_patient_by_email(email).await
    }

    async fn find_patient_by_id(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        self.inner.find_patient_by_id(id).await
    }

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        self.inner.insert_patient(patient).await
    }
}

pub struct TestApp {
    pub address: String,
    pub accounts: Arc<MemoryAccountStore>,
    pub storage: Arc<MockStorage>,
}

/// Spawns the application on an in-memory store and a mock storage.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app() -> TestApp {
    let accounts = Arc::new(MemoryAccountStore::new());
    let storage = Arc::new(MockStorage::new());
    let address = spawn_app_with(accounts.clone(), storage.clone()).await;

    TestApp {
        address,
        accounts,
        storage,
    }
}

/// Spawns the application with the given services and returns its address.
pub async fn spawn_app_with(
    accounts: Arc<dyn AccountStore>,
    storage: Arc<dyn ObjectStorage>,
) -> String {
    dotenvy::from_filename_override("tests/data/.test.env").unwrap();
    init_tracing_once();

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    let app = medauth::app_with_services(accounts, storage);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    address
}

/// Creates a simple 1x1 PNG image and returns its byte representation.
pub fn create_test_image() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, // IHDR chunk length
        0x49, 0x48, 0x44, 0x52, // IHDR
        0x00, 0x00, 0x00, 0x01, // Width: 1
        0x00, 0x00, 0x00, 0x01, // Height: 1
        0x08, 0x02, 0x00, 0x00, 0x00, // 8-bit RGB
        0x90, 0x77, 0x53, 0xDE, // CRC
        0x00, 0x00, 0x00, 0x0C, // IDAT chunk length
        0x49, 0x44, 0x41, 0x54, // IDAT
        0x08, 0x99, 0x01, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, // Image data
        0x02, 0x00, 0x01, 0xE5, // CRC
        0x00, 0x00, 0x00, 0x00, // IEND chunk length
        0x49, 0x45, 0x4E, 0x44, // IEND
        0xAE, 0x42, 0x60, 0x82, // CRC
    ]
}

/// Text fields of a valid doctor signup form
pub fn doctor_fields(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Gregory House".to_string()),
        ("specialization", "Diagnostic Medicine".to_string()),
        ("email", email.to_string()),
        ("degree", "MD".to_string()),
        ("rate", "250".to_string()),
        ("description", "Head of diagnostics".to_string()),
        ("password", "vicodin1".to_string()),
    ]
}

/// Builds a doctor signup form from text fields and an optional image part.
pub fn doctor_form(
    fields: Vec<(&'static str, String)>,
    image: Option<(&str, &str, Vec<u8>)>,
) -> multipart::Form {
    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    if let Some((file_name, mime, data)) = image {
        form = form.part(
            "image",
            multipart::Part::bytes(data)
                .file_name(file_name.to_string())
                .mime_str(mime)
                .unwrap(),
        );
    }
    form
}

pub fn png_image() -> Option<(&'static str, &'static str, Vec<u8>)> {
    Some(("face.png", "image/png", create_test_image()))
}

/// Signs up a doctor and returns the parsed response body.
pub async fn signup_doctor(client: &reqwest::Client, address: &str, email: &str) -> Value {
    let response = client
        .post(format!("{address}/api/auth/doctor/signup"))
        .multipart(doctor_form(doctor_fields(email), png_image()))
        .send()
        .await
        .expect("Failed to sign up doctor");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

/// Signs up a patient and returns the parsed response body.
pub async fn signup_patient(
    client: &reqwest::Client,
    address: &str,
    email: &str,
    password: &str,
) -> Value {
    let response = client
        .post(format!("{address}/api/auth/patient/signup"))
        .json(&json!({"name": "Rachel Green", "email": email, "password": password}))
        .send()
        .await
        .expect("Failed to sign up patient");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}
