//! L2-regularised logistic regression
//!
//! Fitted with Newton's method (IRLS) on standardised columns, then mapped
//! back to raw-scale coefficients so callers never see the scaling. The
//! penalty keeps the fit finite on linearly separable data, which the
//! synthetic cohort always is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matrix::DataMatrix;
use crate::errors::{CareError, Result};

/// Logistic function
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Solver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Inverse regularisation strength (larger = weaker penalty).
    pub c: f64,
    /// Newton iteration cap.
    pub max_iter: usize,
    /// Convergence threshold on the largest parameter update.
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 200,
            tol: 1e-8,
        }
    }
}

/// Fitted binary classifier on raw feature scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticRegression {
    /// Fit on `x` with 0/1 labels `y`.
    pub fn fit(x: &DataMatrix, y: &[u8], config: &LogisticConfig) -> Result<Self> {
        if x.n_samples == 0 {
            return Err(CareError::InvalidTrainingConfig(
                "cannot fit on an empty training set".to_string(),
            ));
        }
        if x.n_samples != y.len() {
            return Err(CareError::InvalidTrainingConfig(format!(
                "{} samples but {} labels",
                x.n_samples,
                y.len()
            )));
        }
        if config.c.is_nan() || config.c <= 0.0 {
            return Err(CareError::InvalidTrainingConfig(format!(
                "regularisation C must be positive, got {}",
                config.c
            )));
        }

        let n = x.n_samples;
        let d = x.n_features;
        let means = x.column_means();
        let scales: Vec<f64> = x
            .column_std_devs(&means)
            .into_iter()
            .map(|s| if s > 1e-12 { s } else { 1.0 })
            .collect();

        // Design matrix with a leading intercept column
        let mut z = Vec::with_capacity(n * (d + 1));
        for i in 0..n {
            z.push(1.0);
            for j in 0..d {
                z.push((x.get(i, j) - means[j]) / scales[j]);
            }
        }
        let design = DataMatrix {
            data: z,
            n_samples: n,
            n_features: d + 1,
        };
        let labels: Vec<f64> = y.iter().map(|&v| v as f64).collect();

        let mut theta = vec![0.0; d + 1];
        let mut loss = objective(&design, &labels, &theta, config.c);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iter {
            iterations += 1;
            let (grad, hess) = gradient_and_hessian(&design, &labels, &theta, config.c);
            let step = solve_linear_system(&hess, &grad);

            // Backtrack if the full Newton step overshoots
            let mut scale = 1.0;
            let mut candidate = theta.clone();
            let mut candidate_loss = loss;
            for _ in 0..30 {
                for (c, (t, s)) in candidate.iter_mut().zip(theta.iter().zip(&step)) {
                    *c = t - scale * s;
                }
                candidate_loss = objective(&design, &labels, &candidate, config.c);
                if candidate_loss <= loss {
                    break;
                }
                scale *= 0.5;
            }

            let max_update = step.iter().map(|s| (scale * s).abs()).fold(0.0f64, f64::max);
            theta = candidate;
            loss = candidate_loss;

            if max_update < config.tol {
                converged = true;
                break;
            }
        }

        debug!(iterations, converged, loss, "logistic fit finished");

        // Undo the standardisation
        let coefficients: Vec<f64> = (0..d).map(|j| theta[j + 1] / scales[j]).collect();
        let intercept = theta[0]
            - coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(Self {
            coefficients,
            intercept,
            iterations,
            converged,
        })
    }

    /// Pre-sigmoid linear score
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }

    /// Positive-class probability
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision_function(x))
    }
}

/// Penalised negative log-likelihood; the intercept is not penalised.
fn objective(design: &DataMatrix, y: &[f64], theta: &[f64], c: f64) -> f64 {
    let mut nll = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let z = dot(design.row(i), theta);
        // log(1 + e^z) - y z, computed without overflow
        nll += z.max(0.0) + (-z.abs()).exp().ln_1p() - yi * z;
    }
    let penalty: f64 = theta[1..].iter().map(|w| w * w).sum::<f64>() * 0.5;
    c * nll + penalty
}

fn gradient_and_hessian(
    design: &DataMatrix,
    y: &[f64],
    theta: &[f64],
    c: f64,
) -> (Vec<f64>, Vec<Vec<f64>>) {
    let k = theta.len();
    let mut grad = vec![0.0; k];
    let mut hess = vec![vec![0.0; k]; k];

    for (i, &yi) in y.iter().enumerate() {
        let row = design.row(i);
        let p = sigmoid(dot(row, theta));
        let residual = p - yi;
        let weight = p * (1.0 - p);
        for a in 0..k {
            grad[a] += c * residual * row[a];
            for b in a..k {
                hess[a][b] += c * weight * row[a] * row[b];
            }
        }
    }

    for a in 0..k {
        for b in 0..a {
            hess[a][b] = hess[b][a];
        }
    }
    for j in 1..k {
        grad[j] += theta[j];
        hess[j][j] += 1.0;
    }

    (grad, hess)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Gaussian elimination with partial pivoting.
fn solve_linear_system(a: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    if n == 0 {
        return Vec::new();
    }

    let mut aug: Vec<Vec<f64>> = a
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut new_row = row.clone();
            new_row.push(b[i]);
            new_row
        })
        .collect();

    for i in 0..n {
        let mut max_idx = i;
        let mut max_val = aug[i][i].abs();
        for k in (i + 1)..n {
            if aug[k][i].abs() > max_val {
                max_val = aug[k][i].abs();
                max_idx = k;
            }
        }
        aug.swap(i, max_idx);

        if aug[i][i].abs() < 1e-12 {
            continue;
        }

        for k in (i + 1)..n {
            let factor = aug[k][i] / aug[i][i];
            for j in i..=n {
                aug[k][j] -= factor * aug[i][j];
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        if aug[i][i].abs() < 1e-12 {
            continue;
        }
        x[i] = aug[i][n];
        for j in (i + 1)..n {
            x[i] -= aug[i][j] * x[j];
        }
        x[i] /= aug[i][i];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_basics() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
    }

    #[test]
    fn test_solve_linear_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![3.0, 5.0];
        let x = solve_linear_system(&a, &b);
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_fit_separates_one_dimension() {
        let rows: Vec<[f64; 1]> = (0..40).map(|i| [i as f64]).collect();
        let y: Vec<u8> = (0..40).map(|i| u8::from(i >= 20)).collect();
        let x = DataMatrix::from_rows(&rows);
        let model = LogisticRegression::fit(&x, &y, &LogisticConfig::default()).unwrap();

        assert!(model.converged);
        assert!(model.coefficients[0] > 0.0);
        assert!(model.predict_proba(&[2.0]) < 0.2);
        assert!(model.predict_proba(&[37.0]) > 0.8);
    }

    #[test]
    fn test_stronger_penalty_shrinks_coefficients() {
        let rows: Vec<[f64; 1]> = (0..40).map(|i| [i as f64]).collect();
        let y: Vec<u8> = (0..40).map(|i| u8::from(i >= 20)).collect();
        let x = DataMatrix::from_rows(&rows);
        let weak = LogisticRegression::fit(&x, &y, &LogisticConfig::default()).unwrap();
        let strong = LogisticRegression::fit(
            &x,
            &y,
            &LogisticConfig {
                c: 0.01,
                ..LogisticConfig::default()
            },
        )
        .unwrap();
        assert!(strong.coefficients[0].abs() < weak.coefficients[0].abs());
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let rows: Vec<[f64; 2]> = (0..30).map(|i| [i as f64, 5.0]).collect();
        let y: Vec<u8> = (0..30).map(|i| u8::from(i % 3 == 0 || i > 20)).collect();
        let x = DataMatrix::from_rows(&rows);
        let model = LogisticRegression::fit(&x, &y, &LogisticConfig::default()).unwrap();
        assert!(model.coefficients[1].abs() < 1e-9);
        assert!(model.intercept.is_finite());
    }

    #[test]
    fn test_rejects_empty_and_mismatched_input() {
        let empty = DataMatrix::from_rows::<2>(&[]);
        assert!(LogisticRegression::fit(&empty, &[], &LogisticConfig::default()).is_err());

        let x = DataMatrix::from_rows(&[[1.0], [2.0]]);
        assert!(LogisticRegression::fit(&x, &[1], &LogisticConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_non_positive_c() {
        let x = DataMatrix::from_rows(&[[1.0], [2.0]]);
        let config = LogisticConfig {
            c: 0.0,
            ..LogisticConfig::default()
        };
        assert!(LogisticRegression::fit(&x, &[0, 1], &config).is_err());
    }
}
