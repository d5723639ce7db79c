//! Linear feature attribution
//!
//! For a linear model the exact Shapley value of feature `i`, with features
//! assumed independent, is `coef_i * (x_i - mean_i)` where the mean is
//! taken over the training data. Attributions satisfy local accuracy:
//! `base_value + sum(contributions) == score`.

use serde::{Deserialize, Serialize};

use super::features::{FeatureVector, FEATURE_NAMES, N_FEATURES};
use super::logistic::sigmoid;

/// One explanation row per feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRow {
    pub feature: String,
    pub value: f64,
    pub contribution: f64,
    pub abs_contribution: f64,
}

/// Attribution of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Score of the training-mean patient (intercept + coef . mean).
    pub base_value: f64,
    /// Pre-sigmoid score being explained.
    pub score: f64,
    /// Rows in feature column order.
    pub rows: Vec<ExplanationRow>,
}

impl Explanation {
    /// Sum of all signed contributions
    pub fn contribution_sum(&self) -> f64 {
        self.rows.iter().map(|r| r.contribution).sum()
    }

    /// Probability implied by the explained score
    pub fn probability(&self) -> f64 {
        sigmoid(self.score)
    }

    /// Rows sorted by absolute contribution, largest first, truncated to `k`
    pub fn top(&self, k: usize) -> Vec<&ExplanationRow> {
        let mut rows: Vec<&ExplanationRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.abs_contribution.total_cmp(&a.abs_contribution));
        rows.truncate(k);
        rows
    }
}

/// Attribution engine bound to one fitted linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearExplainer {
    coefficients: [f64; N_FEATURES],
    intercept: f64,
    baseline: [f64; N_FEATURES],
}

impl LinearExplainer {
    pub fn new(
        coefficients: [f64; N_FEATURES],
        intercept: f64,
        baseline: [f64; N_FEATURES],
    ) -> Self {
        Self {
            coefficients,
            intercept,
            baseline,
        }
    }

    /// Expected score at the baseline
    pub fn base_value(&self) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(&self.baseline)
                .map(|(c, m)| c * m)
                .sum::<f64>()
    }

    pub fn baseline(&self) -> &[f64; N_FEATURES] {
        &self.baseline
    }

    pub fn explain(&self, features: &FeatureVector) -> Explanation {
        let values = features.to_array();
        let rows: Vec<ExplanationRow> = FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let contribution = self.coefficients[i] * (values[i] - self.baseline[i]);
                ExplanationRow {
                    feature: name.to_string(),
                    value: values[i],
                    contribution,
                    abs_contribution: contribution.abs(),
                }
            })
            .collect();

        let score = self.intercept
            + self
                .coefficients
                .iter()
                .zip(&values)
                .map(|(c, v)| c * v)
                .sum::<f64>();

        Explanation {
            base_value: self.base_value(),
            score,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explainer() -> LinearExplainer {
        let mut coef = [0.0; N_FEATURES];
        coef[0] = 0.05;
        coef[7] = -0.3;
        coef[8] = -0.0001;
        let mut baseline = [0.0; N_FEATURES];
        baseline[0] = 65.0;
        baseline[7] = 94.0;
        baseline[8] = 4000.0;
        LinearExplainer::new(coef, -1.0, baseline)
    }

    fn patient() -> FeatureVector {
        let mut v = [0.0; N_FEATURES];
        v[0] = 80.0;
        v[7] = 88.0;
        v[8] = 500.0;
        FeatureVector::from_array(v)
    }

    #[test]
    fn test_contributions_reconstruct_score() {
        let exp = explainer().explain(&patient());
        assert!((exp.base_value + exp.contribution_sum() - exp.score).abs() < 1e-9);
    }

    #[test]
    fn test_contribution_signs() {
        let exp = explainer().explain(&patient());
        let age = &exp.rows[0];
        assert_eq!(age.feature, "age");
        assert!((age.contribution - 0.75).abs() < 1e-12);
        let spo2 = &exp.rows[7];
        assert!((spo2.contribution - 1.8).abs() < 1e-12);
        assert_eq!(spo2.abs_contribution, spo2.contribution.abs());
    }

    #[test]
    fn test_top_sorts_by_magnitude() {
        let exp = explainer().explain(&patient());
        let top = exp.top(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].feature, "spo2_min");
        assert_eq!(top[1].feature, "age");
        assert_eq!(top[2].feature, "steps_sum");
    }

    #[test]
    fn test_rows_keep_column_order() {
        let exp = explainer().explain(&patient());
        let names: Vec<&str> = exp.rows.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
    }

    #[test]
    fn test_baseline_patient_scores_base_value() {
        let e = explainer();
        let exp = e.explain(&FeatureVector::from_array(*e.baseline()));
        assert!(exp.contribution_sum().abs() < 1e-12);
        assert!((exp.score - exp.base_value).abs() < 1e-12);
    }
}
