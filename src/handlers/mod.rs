//! # HTTP Request Handlers
//!
//! Each handler is responsible for processing specific HTTP requests and
//! returning appropriate responses.
//!
//! ## Available Handlers
//!
//! - **Authentication** (`auth`) - Doctor and patient login
//! - **Doctor signup** (`doctor_signup`) - Multipart signup with profile image
//! - **Patient signup** (`patient_signup`) - JSON signup
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Profile** (`profile`) - Current account retrieval

mod auth;
mod doctor_signup;
mod health_check;
mod patient_signup;
mod profile;

pub use auth::*;
pub use doctor_signup::*;
pub use health_check::*;
pub use patient_signup::*;
pub use profile::*;
