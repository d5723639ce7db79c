//! Readmission risk modelling
//!
//! Synthetic cohort generation, a regularised logistic classifier, and a
//! linear feature-attribution explainer, composed by
//! [`ReadmissionEstimator`].

pub mod band;
pub mod cohort;
pub mod estimator;
pub mod explain;
pub mod features;
pub mod logistic;
pub mod matrix;
pub mod metrics;

pub use band::RiskBand;
pub use estimator::{ReadmissionEstimator, TrainingConfig, TrainingSummary};
pub use explain::{Explanation, ExplanationRow};
pub use features::{FeatureMap, FeatureVector, FEATURE_NAMES, N_FEATURES};
