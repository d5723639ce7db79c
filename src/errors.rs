//! Error types for aftercare
//!
//! Three domain failures matter to callers: malformed uploads (degraded
//! locally), incomplete feature vectors, and predicting before training.
//! The rest wrap plumbing errors from config and report files.

use thiserror::Error;

/// Main error type for the monitoring library
#[derive(Error, Debug)]
pub enum CareError {
    /// Upload could not be decoded into text
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Feature vector is missing a required field
    #[error("Missing required feature: {feature}")]
    MissingFeature { feature: String },

    /// Feature value is present but not usable (non-finite, or overflows the score)
    #[error("Invalid value {value} for feature {feature}")]
    InvalidFeature { feature: String, value: f64 },

    /// Predict called before train
    #[error("Risk model has not been trained")]
    ModelNotTrained,

    /// Training parameters rejected before fitting
    #[error("Invalid training configuration: {0}")]
    InvalidTrainingConfig(String),

    /// Timezone identifier not in the IANA database
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Session idled past its time-to-live
    #[error("Session {id} expired after {idle_minutes} idle minutes")]
    SessionExpired { id: String, idle_minutes: i64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, CareError>;

/// Convert anyhow errors to CareError
impl From<anyhow::Error> for CareError {
    fn from(err: anyhow::Error) -> Self {
        CareError::Generic(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_feature_names_field() {
        let err = CareError::MissingFeature {
            feature: "spo2_min".to_string(),
        };
        assert!(err.to_string().contains("spo2_min"));
    }

    #[test]
    fn test_session_expired_display() {
        let err = CareError::SessionExpired {
            id: "abc".to_string(),
            idle_minutes: 130,
        };
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("130"));
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err: CareError = anyhow::anyhow!("root cause").context("outer").into();
        let msg = err.to_string();
        assert!(msg.contains("outer"));
        assert!(msg.contains("root cause"));
    }
}
