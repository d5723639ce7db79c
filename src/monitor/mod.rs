//! Simulated wearable monitoring and alerting

pub mod alerts;
pub mod stream;
pub mod vitals;

pub use alerts::{Alert, AlertLog, AlertRules, Severity};
pub use stream::{run_stream, StreamConfig, StreamOutcome};
pub use vitals::{Activity, VitalSample, VitalsSimulator, VitalsSummary, VitalsTable};
