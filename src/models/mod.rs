mod doctor;
mod patient;
mod role;
mod state;

pub use doctor::{Doctor, NewDoctor};
pub use patient::{NewPatient, Patient};
pub use role::Role;
pub use state::AppState;
