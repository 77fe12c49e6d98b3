//! Runs against a real PostgreSQL database named by `DATABASE_URL`:
//! `cargo test --test pg_store -- --ignored`

use medauth::models::{NewDoctor, NewPatient};
use medauth::services::store::{AccountStore, PgAccountStore, StoreError};
use sqlx::PgPool;

fn new_doctor(email: &str) -> NewDoctor {
    NewDoctor {
        name: "Gregory House".to_string(),
        specialization: "Diagnostic Medicine".to_string(),
        email: email.to_string(),
        degree: "MD".to_string(),
        rate: 250.0,
        description: "Head of diagnostics".to_string(),
        image_url: "https://storage.test/doctor-images/1_face.png".to_string(),
        password_hash: "$2b$04$placeholderplaceholderplacehol".to_string(),
    }
}

fn new_patient(email: &str) -> NewPatient {
    NewPatient {
        name: "Rachel Green".to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$placeholderplaceholderplacehol".to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn pg_doctor_insert_and_lookup(pool: PgPool) {
    let store = PgAccountStore::new(pool);

    let doctor = store.insert_doctor(new_doctor("house@ppth.org")).await.unwrap();
    assert_eq!(doctor.rate, 250.0);

    let by_email = store
        .find_doctor_by_email("house@ppth.org")
        .await
        .unwrap()
        .expect("Doctor should be found by email");
    assert_eq!(by_email.id, doctor.id);

    let by_id = store.find_doctor_by_id(doctor.id).await.unwrap();
    assert!(by_id.is_some());

    let duplicate = store.insert_doctor(new_doctor("house@ppth.org")).await;
    assert!(matches!(duplicate, Err(StoreError::EmailTaken)));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn pg_patient_starts_with_empty_wallet(pool: PgPool) {
    let store = PgAccountStore::new(pool);

    let patient = store
        .insert_patient(new_patient("rachel@example.com"))
        .await
        .unwrap();
    assert_eq!(patient.wallet_balance, 0.0);

    let duplicate = store.insert_patient(new_patient("rachel@example.com")).await;
    assert!(matches!(duplicate, Err(StoreError::EmailTaken)));

    assert!(
        store
            .find_patient_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none()
    );
}
