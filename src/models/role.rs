//! # Account Roles
//!
//! The two kinds of accounts the service authenticates. The role travels in
//! every issued token so a doctor id is never mistaken for a patient id.

use serde::{Deserialize, Serialize};

/// Represents which table an account lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A doctor registered through the multipart signup form
    Doctor,
    /// A patient registered through the JSON signup endpoint
    Patient,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role_str = match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        };
        write!(f, "{role_str}")
    }
}
