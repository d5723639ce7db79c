//! Configuration for aftercare
//!
//! TOML file at `~/.aftercare/config.toml`, created with defaults the first
//! time it is loaded. Every section falls back to its defaults when absent.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::CareError;
use crate::monitor::{Activity, AlertRules, StreamConfig};
use crate::risk::TrainingConfig;
use crate::schedule::parse_timezone;
use crate::session::{PatientProfile, Sex};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub patient: PatientConfig,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Synthetic cohort and solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub seed: u64,
    pub samples: usize,
    pub test_fraction: f64,
    /// Inverse L2 regularisation strength
    pub c: f64,
    pub max_iter: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientConfig {
    pub name: String,
    pub dob: NaiveDate,
    pub sex: Sex,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub samples: usize,
    pub interval_ms: u64,
    pub baseline_hr: f64,
    pub baseline_spo2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub spo2_critical: f64,
    pub resting_hr_critical: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output_dir: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            seed: training.seed,
            samples: training.samples,
            test_fraction: training.test_fraction,
            c: training.logistic.c,
            max_iter: training.logistic.max_iter,
        }
    }
}

impl Default for PatientConfig {
    fn default() -> Self {
        let profile = PatientProfile::default();
        Self {
            name: profile.name,
            dob: profile.dob,
            sex: profile.sex,
            timezone: profile.timezone,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            samples: 30,
            interval_ms: 1000,
            baseline_hr: 78.0,
            baseline_spo2: 95.0,
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        let rules = AlertRules::default();
        Self {
            spo2_critical: rules.spo2_critical,
            resting_hr_critical: rules.resting_hr_critical,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { ttl_minutes: 120 }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/.aftercare/reports".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` if given, else from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `~/.aftercare/config.toml`, writing defaults there if missing
    pub fn load_default() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save(&config_path)?;
            return Ok(config);
        }

        Self::load_from_file(&config_path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".aftercare").join("config.toml"))
    }

    pub fn validate(&self) -> crate::errors::Result<()> {
        if self.model.samples == 0 {
            return Err(CareError::ConfigError(
                "model.samples must be greater than 0".to_string(),
            ));
        }

        if !(self.model.test_fraction > 0.0 && self.model.test_fraction < 1.0) {
            return Err(CareError::ConfigError(format!(
                "model.test_fraction must be between 0 and 1, got {}",
                self.model.test_fraction
            )));
        }

        if !self.model.c.is_finite() || self.model.c <= 0.0 {
            return Err(CareError::ConfigError(format!(
                "model.c must be a positive number, got {}",
                self.model.c
            )));
        }

        if self.model.max_iter == 0 {
            return Err(CareError::ConfigError(
                "model.max_iter must be greater than 0".to_string(),
            ));
        }

        parse_timezone(&self.patient.timezone)
            .map_err(|e| CareError::ConfigError(format!("patient.timezone: {}", e)))?;

        if self.session.ttl_minutes <= 0 {
            return Err(CareError::ConfigError(
                "session.ttl_minutes must be greater than 0".to_string(),
            ));
        }

        if self.stream.samples == 0 {
            return Err(CareError::ConfigError(
                "stream.samples must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn training(&self) -> TrainingConfig {
        let mut training = TrainingConfig {
            seed: self.model.seed,
            samples: self.model.samples,
            test_fraction: self.model.test_fraction,
            ..TrainingConfig::default()
        };
        training.logistic.c = self.model.c;
        training.logistic.max_iter = self.model.max_iter;
        training
    }

    pub fn stream_config(&self, activity: Activity) -> StreamConfig {
        StreamConfig {
            samples: self.stream.samples,
            interval: Duration::from_millis(self.stream.interval_ms),
            baseline_hr: self.stream.baseline_hr,
            baseline_spo2: self.stream.baseline_spo2,
            activity,
            seed: None,
        }
    }

    pub fn alert_rules(&self) -> AlertRules {
        AlertRules {
            spo2_critical: self.alerts.spo2_critical,
            resting_hr_critical: self.alerts.resting_hr_critical,
        }
    }

    pub fn patient_profile(&self) -> PatientProfile {
        PatientProfile {
            name: self.patient.name.clone(),
            dob: self.patient.dob,
            sex: self.patient.sex,
            timezone: self.patient.timezone.clone(),
            ..PatientProfile::default()
        }
    }

    pub fn session_ttl(&self) -> ChronoDuration {
        ChronoDuration::minutes(self.session.ttl_minutes)
    }

    pub fn report_dir(&self) -> PathBuf {
        Self::expand_path(&self.report.output_dir)
    }

    /// Expand a leading `~/` to the home directory
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.model.samples, 1500);
        assert_eq!(config.patient.timezone, "America/Chicago");
        assert_eq!(config.stream.interval_ms, 1000);
        assert_eq!(config.alerts.spo2_critical, 88.0);
        assert_eq!(config.session.ttl_minutes, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_samples() {
        let mut config = Config::default();
        config.model.samples = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_test_fraction() {
        let mut config = Config::default();
        config.model.test_fraction = 1.0;
        assert!(config.validate().is_err());
        config.model.test_fraction = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_timezone() {
        let mut config = Config::default();
        config.patient.timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(CareError::ConfigError(_))));
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let mut config = Config::default();
        config.session.ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [model]
            seed = 7

            [patient]
            name = "Jordan"
            sex = "F"
            "#,
        )
        .unwrap();
        assert_eq!(config.model.seed, 7);
        assert_eq!(config.model.samples, 1500);
        assert_eq!(config.patient.name, "Jordan");
        assert_eq!(config.patient.sex, Sex::Female);
        assert_eq!(config.patient.timezone, "America/Chicago");
        assert_eq!(config.stream.samples, 30);
    }

    #[test]
    fn test_training_conversion() {
        let mut config = Config::default();
        config.model.c = 0.5;
        config.model.max_iter = 50;
        let training = config.training();
        assert_eq!(training.seed, 42);
        assert_eq!(training.logistic.c, 0.5);
        assert_eq!(training.logistic.max_iter, 50);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.patient.name = "Sam".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[session]\nttl_minutes = -5\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(Config::expand_path("/abs/path"), PathBuf::from("/abs/path"));
        assert!(!Config::expand_path("~/reports").to_string_lossy().contains('~'));
    }
}
