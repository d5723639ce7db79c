//! Synthetic discharge cohort
//!
//! Produces a self-labelled feature table used only to bootstrap the
//! estimator. Every feature is drawn independently; the label comes from a
//! fixed linear score pushed through the logistic function and thresholded
//! at 0.5.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::features::N_FEATURES;
use super::logistic::sigmoid;

/// Labelled synthetic table, one row per simulated discharge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cohort {
    pub rows: Vec<[f64; N_FEATURES]>,
    pub labels: Vec<u8>,
}

impl Cohort {
    /// Generate `n` rows from `seed`. Same inputs, same table.
    pub fn generate(seed: u64, n: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);

        for _ in 0..n {
            let row = [
                rng.gen_range(40..90) as f64,
                rng.gen_range(0..2) as f64,
                rng.gen_range(0..2) as f64,
                rng.gen_range(1..11) as f64,
                rng.gen_range(0..5) as f64,
                rng.gen_range(1..12) as f64,
                normal(&mut rng, 78.0, 10.0),
                normal(&mut rng, 94.0, 2.5),
                rng.gen_range(0..8000) as f64,
                normal(&mut rng, 0.85, 0.07).clamp(0.5, 0.98),
            ];
            labels.push(u8::from(sigmoid(ground_truth_score(&row)) > 0.5));
            rows.push(row);
        }

        Self { rows, labels }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fraction of positive labels
    pub fn positive_rate(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().map(|&y| y as f64).sum::<f64>() / self.labels.len() as f64
    }
}

/// Hidden score that decides the synthetic label.
///
/// Risk rises with age, CHF, long stays, prior admissions, polypharmacy and
/// resting heart rate; it falls with oxygen saturation, activity and sleep.
pub fn ground_truth_score(x: &[f64; N_FEATURES]) -> f64 {
    0.02 * (x[0] - 65.0)
        + 0.7 * x[2]
        + 0.1 * (x[3] - 4.0)
        + 0.4 * x[4]
        + 0.03 * x[5]
        + 0.03 * (x[6] - 78.0)
        - 0.2 * (x[7] - 94.0)
        - 0.00008 * (x[8] - 3000.0)
        - 0.8 * (x[9] - 0.85)
}

/// Gaussian sample via Box-Muller
pub(crate) fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // 1 - u keeps the log argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}
