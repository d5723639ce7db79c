//! Threshold alert rules and the session alert log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::vitals::{Activity, VitalSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => f.write_str("critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub ts: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// Thresholds evaluated after every wearable sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRules {
    /// SpO2 strictly below this is critical.
    pub spo2_critical: f64,
    /// Heart rate strictly above this while resting is critical.
    pub resting_hr_critical: f64,
}

impl Default for AlertRules {
    fn default() -> Self {
        Self {
            spo2_critical: 88.0,
            resting_hr_critical: 130.0,
        }
    }
}

impl AlertRules {
    pub fn evaluate(&self, sample: &VitalSample, activity: Activity) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if sample.spo2 < self.spo2_critical {
            alerts.push(Alert {
                ts: sample.ts,
                severity: Severity::Critical,
                message: format!("Low SpO₂: {:.1}%", sample.spo2),
            });
        }
        if sample.hr > self.resting_hr_critical && activity == Activity::Rest {
            alerts.push(Alert {
                ts: sample.ts,
                severity: Severity::Critical,
                message: format!("High resting HR: {:.0} bpm", sample.hr),
            });
        }
        alerts
    }
}

/// Append-only alert history for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertLog {
    alerts: Vec<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, alerts: impl IntoIterator<Item = Alert>) {
        self.alerts.extend(alerts);
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Last `n` alerts in insertion order
    pub fn recent(&self, n: usize) -> &[Alert] {
        let start = self.alerts.len().saturating_sub(n);
        &self.alerts[start..]
    }

    /// All alerts, newest timestamp first
    pub fn newest_first(&self) -> Vec<&Alert> {
        let mut sorted: Vec<&Alert> = self.alerts.iter().collect();
        sorted.sort_by(|a, b| b.ts.cmp(&a.ts));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reading(hr: f64, spo2: f64) -> VitalSample {
        VitalSample {
            ts: Utc::now(),
            hr,
            spo2,
            steps: 0,
        }
    }

    #[test]
    fn test_low_spo2_is_critical() {
        let alerts = AlertRules::default().evaluate(&reading(80.0, 86.44), Activity::Walk);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].message, "Low SpO₂: 86.4%");
    }

    #[test]
    fn test_spo2_threshold_is_strict() {
        assert!(AlertRules::default()
            .evaluate(&reading(80.0, 88.0), Activity::Rest)
            .is_empty());
    }

    #[test]
    fn test_high_hr_only_at_rest() {
        let rules = AlertRules::default();
        let fast = reading(135.2, 95.0);
        let at_rest = rules.evaluate(&fast, Activity::Rest);
        assert_eq!(at_rest.len(), 1);
        assert_eq!(at_rest[0].message, "High resting HR: 135 bpm");
        assert!(rules.evaluate(&fast, Activity::Walk).is_empty());
    }

    #[test]
    fn test_both_rules_fire() {
        let alerts = AlertRules::default().evaluate(&reading(140.0, 85.0), Activity::Rest);
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn test_log_recent_and_ordering() {
        let now = Utc::now();
        let mut log = AlertLog::new();
        for i in 0..12 {
            log.extend([Alert {
                ts: now + Duration::seconds(i),
                severity: Severity::Critical,
                message: format!("alert {}", i),
            }]);
        }
        let recent = log.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].message, "alert 2");
        assert_eq!(log.newest_first()[0].message, "alert 11");
    }
}
