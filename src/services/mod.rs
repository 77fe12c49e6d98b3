//! # Business Logic Services
//!
//! Services encapsulate domain-specific functionality and provide clean
//! interfaces for use by HTTP handlers.
//!
//! ## Available Services
//!
//! - **JWT** (`jwt`) - Token issuance and validation
//! - **Password** (`password`) - bcrypt hashing and verification
//! - **Storage** (`storage`) - Object storage for doctor images
//! - **Store** (`store`) - Doctor and patient persistence

pub mod jwt;
pub mod password;
pub mod storage;
pub mod store;
