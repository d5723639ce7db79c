//! aftercare - post-discharge monitoring demo
//!
//! Single-user, in-memory monitoring of a patient after hospital discharge:
//!
//! - **risk**: readmission estimator trained on a synthetic cohort, with
//!   additive per-feature explanations and Low/Medium/High banding
//! - **document**: keyword parser for discharge summaries
//! - **schedule**: daily medication reminders and adherence
//! - **monitor**: simulated wearable stream with threshold alerts
//! - **session**: the per-session state every workflow step operates on
//! - **report**: daily JSON report
//!
//! Nothing here is clinically validated.

pub mod errors;

pub mod document;
pub mod monitor;
pub mod risk;
pub mod schedule;

pub mod report;
pub mod session;

pub mod cli;
pub mod config;
pub mod repl;
pub mod telemetry;

pub use errors::{CareError, Result};
