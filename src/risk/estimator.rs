//! Readmission risk estimator
//!
//! Trains a logistic classifier on a synthetic cohort once, then answers
//! predict-with-explanation queries against the frozen fit.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cohort::Cohort;
use super::explain::{Explanation, LinearExplainer};
use super::features::{FeatureMap, FeatureVector, N_FEATURES};
use super::logistic::{LogisticConfig, LogisticRegression};
use super::matrix::DataMatrix;
use super::metrics::{roc_auc, train_test_split};
use crate::errors::{CareError, Result};

/// Smallest cohort that still leaves both splits populated
pub const MIN_SAMPLES: usize = 10;

/// Everything that determines a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub seed: u64,
    pub samples: usize,
    pub test_fraction: f64,
    pub logistic: LogisticConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            samples: 1500,
            test_fraction: 0.2,
            logistic: LogisticConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.samples < MIN_SAMPLES {
            return Err(CareError::InvalidTrainingConfig(format!(
                "need at least {} samples, got {}",
                MIN_SAMPLES, self.samples
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(CareError::InvalidTrainingConfig(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Informational record of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub seed: u64,
    pub samples: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub positive_rate: f64,
    /// Held-out ROC AUC; `None` if the test split held a single class.
    pub auc: Option<f64>,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone)]
struct FittedModel {
    model: LogisticRegression,
    explainer: LinearExplainer,
    summary: TrainingSummary,
}

/// Readmission risk estimator.
///
/// Starts untrained; [`predict`](Self::predict) fails with
/// [`CareError::ModelNotTrained`] until [`train`](Self::train) succeeds.
#[derive(Debug, Clone, Default)]
pub struct ReadmissionEstimator {
    fitted: Option<FittedModel>,
}

impl ReadmissionEstimator {
    pub fn new() -> Self {
        Self { fitted: None }
    }

    /// Construct and train in one step
    pub fn trained(seed: u64, samples: usize) -> Result<Self> {
        let mut estimator = Self::new();
        estimator.train(seed, samples)?;
        Ok(estimator)
    }

    /// Train on `samples` synthetic rows drawn from `seed`.
    pub fn train(&mut self, seed: u64, samples: usize) -> Result<TrainingSummary> {
        self.train_with(&TrainingConfig {
            seed,
            samples,
            ..TrainingConfig::default()
        })
    }

    pub fn train_with(&mut self, config: &TrainingConfig) -> Result<TrainingSummary> {
        config.validate()?;

        let cohort = Cohort::generate(config.seed, config.samples);
        let (train_idx, test_idx) =
            train_test_split(cohort.len(), config.test_fraction, config.seed);

        let train_rows: Vec<[f64; N_FEATURES]> =
            train_idx.iter().map(|&i| cohort.rows[i]).collect();
        let train_labels: Vec<u8> = train_idx.iter().map(|&i| cohort.labels[i]).collect();
        let x_train = DataMatrix::from_rows(&train_rows);

        let model = LogisticRegression::fit(&x_train, &train_labels, &config.logistic)?;

        let test_labels: Vec<u8> = test_idx.iter().map(|&i| cohort.labels[i]).collect();
        let test_scores: Vec<f64> = test_idx
            .iter()
            .map(|&i| model.predict_proba(&cohort.rows[i]))
            .collect();
        let auc = roc_auc(&test_labels, &test_scores);

        let coefficients = to_feature_array(&model.coefficients)?;
        let baseline = to_feature_array(&x_train.column_means())?;
        let explainer = LinearExplainer::new(coefficients, model.intercept, baseline);

        let summary = TrainingSummary {
            seed: config.seed,
            samples: config.samples,
            train_size: train_idx.len(),
            test_size: test_idx.len(),
            positive_rate: cohort.positive_rate(),
            auc,
            iterations: model.iterations,
            converged: model.converged,
        };

        info!(
            seed = config.seed,
            samples = config.samples,
            auc = ?summary.auc,
            converged = summary.converged,
            "readmission model trained"
        );

        self.fitted = Some(FittedModel {
            model,
            explainer,
            summary: summary.clone(),
        });
        Ok(summary)
    }

    pub fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn summary(&self) -> Option<&TrainingSummary> {
        self.fitted.as_ref().map(|f| &f.summary)
    }

    /// Raw-scale coefficients and intercept of the fitted model
    pub fn coefficients(&self) -> Result<(&[f64], f64)> {
        let fitted = self.fitted.as_ref().ok_or(CareError::ModelNotTrained)?;
        Ok((&fitted.model.coefficients, fitted.model.intercept))
    }

    /// Predict from a loose name -> value map.
    ///
    /// Every feature is mandatory; no defaults are substituted here.
    pub fn predict(&self, features: &FeatureMap) -> Result<(f64, Explanation)> {
        let fitted = self.fitted.as_ref().ok_or(CareError::ModelNotTrained)?;
        let vector = FeatureVector::from_map(features)?;
        Self::predict_fitted(fitted, &vector)
    }

    pub fn predict_vector(&self, features: &FeatureVector) -> Result<(f64, Explanation)> {
        let fitted = self.fitted.as_ref().ok_or(CareError::ModelNotTrained)?;
        Self::predict_fitted(fitted, features)
    }

    /// Finite inputs far outside any clinical range can still overflow the
    /// linear score; those are rejected rather than scored as NaN.
    fn predict_fitted(
        fitted: &FittedModel,
        features: &FeatureVector,
    ) -> Result<(f64, Explanation)> {
        let explanation = fitted.explainer.explain(features);
        if let Some(row) = explanation
            .rows
            .iter()
            .find(|row| !row.contribution.is_finite())
        {
            return Err(CareError::InvalidFeature {
                feature: row.feature.clone(),
                value: row.value,
            });
        }
        if !explanation.score.is_finite() {
            return Err(CareError::MalformedInput(format!(
                "risk score overflowed ({})",
                explanation.score
            )));
        }

        let probability = fitted.model.predict_proba(&features.to_array());
        if !probability.is_finite() {
            return Err(CareError::MalformedInput(format!(
                "risk probability is not finite ({})",
                probability
            )));
        }
        debug!(probability, score = explanation.score, "risk predicted");
        Ok((probability, explanation))
    }
}

fn to_feature_array(values: &[f64]) -> Result<[f64; N_FEATURES]> {
    values.try_into().map_err(|_| {
        CareError::Generic(format!(
            "expected {} model weights, got {}",
            N_FEATURES,
            values.len()
        ))
    })
}
