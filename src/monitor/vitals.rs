//! Simulated wearable vitals
//!
//! Samples are synthetic; there is no device integration. The table only
//! lives as long as the session that owns it.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::risk::cohort::normal;

/// Patient activity while the stream runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Rest,
    Light,
    Walk,
}

impl Activity {
    /// Heart rate added on top of the baseline
    pub fn hr_offset(&self) -> f64 {
        match self {
            Activity::Rest => 0.0,
            Activity::Light => 5.0,
            Activity::Walk => 15.0,
        }
    }

    /// Mean steps per sample interval
    pub fn mean_steps(&self) -> f64 {
        match self {
            Activity::Rest => 2.0,
            Activity::Light | Activity::Walk => 30.0,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Activity::Rest => "rest",
            Activity::Light => "light",
            Activity::Walk => "walk",
        };
        f.write_str(s)
    }
}

impl FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(Activity::Rest),
            "light" => Ok(Activity::Light),
            "walk" => Ok(Activity::Walk),
            other => Err(format!("unknown activity '{}': use rest, light or walk", other)),
        }
    }
}

/// One wearable reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSample {
    pub ts: DateTime<Utc>,
    pub hr: f64,
    pub spo2: f64,
    pub steps: u32,
}

/// Summary of the most recent readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsSummary {
    /// Median heart rate; `None` with no readings.
    pub hr_rest: Option<f64>,
    pub spo2_min: Option<f64>,
    pub steps_sum: u64,
}

/// Append-only session vitals table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalsTable {
    samples: Vec<VitalSample>,
}

impl VitalsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: VitalSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[VitalSample] {
        &self.samples
    }

    /// Last `n` samples, oldest first
    pub fn tail(&self, n: usize) -> &[VitalSample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// Summarise the last `window` samples, ignoring non-finite readings.
    pub fn summary(&self, window: usize) -> VitalsSummary {
        let recent = self.tail(window);

        let mut hrs: Vec<f64> = recent.iter().map(|s| s.hr).filter(|v| v.is_finite()).collect();
        hrs.sort_by(f64::total_cmp);
        let hr_rest = median_sorted(&hrs);

        let spo2_min = recent
            .iter()
            .map(|s| s.spo2)
            .filter(|v| v.is_finite())
            .reduce(f64::min);

        let steps_sum = recent.iter().map(|s| u64::from(s.steps)).sum();

        VitalsSummary {
            hr_rest,
            spo2_min,
            steps_sum,
        }
    }
}

fn median_sorted(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(values[n / 2])
    } else {
        Some((values[n / 2 - 1] + values[n / 2]) / 2.0)
    }
}

/// Synthetic reading generator around a baseline
#[derive(Debug, Clone)]
pub struct VitalsSimulator {
    rng: StdRng,
    baseline_hr: f64,
    baseline_spo2: f64,
}

impl VitalsSimulator {
    /// Seeded simulators repeat; unseeded ones draw from OS entropy.
    pub fn new(baseline_hr: f64, baseline_spo2: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            baseline_hr,
            baseline_spo2,
        }
    }

    pub fn sample(&mut self, activity: Activity, ts: DateTime<Utc>) -> VitalSample {
        let hr = self.baseline_hr + activity.hr_offset() + normal(&mut self.rng, 0.0, 2.0);
        let spo2 = self.baseline_spo2 + normal(&mut self.rng, 0.0, 0.4);
        // Truncate toward zero, floor at zero
        let steps = normal(&mut self.rng, activity.mean_steps(), 5.0).max(0.0) as u32;
        VitalSample { ts, hr, spo2, steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(hr: f64, spo2: f64, steps: u32) -> VitalSample {
        VitalSample {
            ts: Utc::now(),
            hr,
            spo2,
            steps,
        }
    }

    #[test]
    fn test_summary_empty() {
        let table = VitalsTable::new();
        let summary = table.summary(120);
        assert_eq!(summary.hr_rest, None);
        assert_eq!(summary.spo2_min, None);
        assert_eq!(summary.steps_sum, 0);
    }

    #[test]
    fn test_summary_median_min_sum() {
        let mut table = VitalsTable::new();
        table.push(sample(70.0, 96.0, 10));
        table.push(sample(90.0, 93.5, 5));
        table.push(sample(80.0, f64::NAN, 1));
        table.push(sample(100.0, 95.0, 4));
        let summary = table.summary(200);
        assert_eq!(summary.hr_rest, Some(85.0));
        assert_eq!(summary.spo2_min, Some(93.5));
        assert_eq!(summary.steps_sum, 20);
    }

    #[test]
    fn test_summary_uses_window() {
        let mut table = VitalsTable::new();
        table.push(sample(200.0, 70.0, 100));
        table.push(sample(80.0, 95.0, 3));
        let summary = table.summary(1);
        assert_eq!(summary.hr_rest, Some(80.0));
        assert_eq!(summary.spo2_min, Some(95.0));
        assert_eq!(summary.steps_sum, 3);
    }

    #[test]
    fn test_tail_longer_than_table() {
        let mut table = VitalsTable::new();
        table.push(sample(80.0, 95.0, 3));
        assert_eq!(table.tail(50).len(), 1);
    }

    #[test]
    fn test_simulator_seeded_repeats() {
        let ts = Utc::now();
        let mut a = VitalsSimulator::new(78.0, 95.0, Some(9));
        let mut b = VitalsSimulator::new(78.0, 95.0, Some(9));
        for _ in 0..5 {
            assert_eq!(a.sample(Activity::Walk, ts), b.sample(Activity::Walk, ts));
        }
    }

    #[test]
    fn test_activity_shifts_heart_rate() {
        let ts = Utc::now();
        let mut sim = VitalsSimulator::new(78.0, 95.0, Some(1));
        let n = 500;
        let rest: f64 = (0..n).map(|_| sim.sample(Activity::Rest, ts).hr).sum::<f64>() / n as f64;
        let walk: f64 = (0..n).map(|_| sim.sample(Activity::Walk, ts).hr).sum::<f64>() / n as f64;
        assert!((walk - rest - 15.0).abs() < 1.0, "rest {} walk {}", rest, walk);
    }

    #[test]
    fn test_activity_from_str() {
        assert_eq!("Walk".parse::<Activity>(), Ok(Activity::Walk));
        assert!("run".parse::<Activity>().is_err());
    }
}
