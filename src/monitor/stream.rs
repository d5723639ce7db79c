//! Blocking wearable stream
//!
//! Runs in the caller's thread: one sample per interval, appended to the
//! vitals table, with alert rules checked after each sample. The call
//! returns only when every sample has been produced.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::alerts::{Alert, AlertLog, AlertRules};
use super::vitals::{Activity, VitalSample, VitalsSimulator, VitalsTable};

/// Stream parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub samples: usize,
    pub interval: Duration,
    pub baseline_hr: f64,
    pub baseline_spo2: f64,
    pub activity: Activity,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            samples: 30,
            interval: Duration::from_secs(1),
            baseline_hr: 78.0,
            baseline_spo2: 95.0,
            activity: Activity::Rest,
            seed: None,
        }
    }
}

/// What a finished stream produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOutcome {
    pub samples: usize,
    pub alerts_raised: usize,
}

/// Run the stream to completion.
///
/// `on_sample` sees every sample together with the alerts it raised, for
/// progress display.
pub fn run_stream<F>(
    config: &StreamConfig,
    rules: &AlertRules,
    vitals: &mut VitalsTable,
    alert_log: &mut AlertLog,
    mut on_sample: F,
) -> StreamOutcome
where
    F: FnMut(&VitalSample, &[Alert]),
{
    let mut simulator = VitalsSimulator::new(config.baseline_hr, config.baseline_spo2, config.seed);
    let mut alerts_raised = 0;

    for i in 0..config.samples {
        let sample = simulator.sample(config.activity, Utc::now());
        let alerts = rules.evaluate(&sample, config.activity);
        for alert in &alerts {
            warn!(severity = %alert.severity, message = %alert.message, "vitals alert");
        }

        on_sample(&sample, &alerts);
        alerts_raised += alerts.len();
        vitals.push(sample);
        alert_log.extend(alerts);

        if i + 1 < config.samples && !config.interval.is_zero() {
            thread::sleep(config.interval);
        }
    }

    info!(
        samples = config.samples,
        alerts_raised,
        activity = %config.activity,
        "wearable stream complete"
    );

    StreamOutcome {
        samples: config.samples,
        alerts_raised,
    }
}
