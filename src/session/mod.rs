//! Session state: patient profile plus everything observed while the
//! session is open.

pub mod context;
pub mod patient;

pub use context::{RiskAssessment, RiskRecord, SessionContext};
pub use patient::{Caregiver, PatientProfile, Sex};
