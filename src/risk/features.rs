//! Readmission feature vector
//!
//! Column order is part of the model contract: training, prediction and
//! explanation all index features through [`FEATURE_NAMES`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{CareError, Result};

/// Number of model inputs
pub const N_FEATURES: usize = 10;

/// Feature names in training column order
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age",
    "sex_male",
    "dx_chf",
    "los_days",
    "prior_admits",
    "meds_count",
    "hr_rest",
    "spo2_min",
    "steps_sum",
    "sleep_eff",
];

/// Loose name -> value mapping as supplied by callers
pub type FeatureMap = BTreeMap<String, f64>;

/// A complete, ordered feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: f64,
    pub sex_male: f64,
    pub dx_chf: f64,
    pub los_days: f64,
    pub prior_admits: f64,
    pub meds_count: f64,
    pub hr_rest: f64,
    pub spo2_min: f64,
    pub steps_sum: f64,
    pub sleep_eff: f64,
}

impl FeatureVector {
    /// Build from a name -> value map.
    ///
    /// Every field is mandatory; the first absent name (in column order)
    /// is reported. Extra keys are ignored.
    pub fn from_map(map: &FeatureMap) -> Result<Self> {
        let mut values = [0.0; N_FEATURES];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
            let value = map.get(*name).copied().ok_or_else(|| CareError::MissingFeature {
                feature: name.to_string(),
            })?;
            if !value.is_finite() {
                return Err(CareError::InvalidFeature {
                    feature: name.to_string(),
                    value,
                });
            }
            *slot = value;
        }
        Ok(Self::from_array(values))
    }

    /// Build from values in column order
    pub fn from_array(v: [f64; N_FEATURES]) -> Self {
        Self {
            age: v[0],
            sex_male: v[1],
            dx_chf: v[2],
            los_days: v[3],
            prior_admits: v[4],
            meds_count: v[5],
            hr_rest: v[6],
            spo2_min: v[7],
            steps_sum: v[8],
            sleep_eff: v[9],
        }
    }

    /// Values in column order
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.age,
            self.sex_male,
            self.dx_chf,
            self.los_days,
            self.prior_admits,
            self.meds_count,
            self.hr_rest,
            self.spo2_min,
            self.steps_sum,
            self.sleep_eff,
        ]
    }

    pub fn to_map(&self) -> FeatureMap {
        FEATURE_NAMES
            .iter()
            .zip(self.to_array())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> FeatureMap {
        FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i as f64))
            .collect()
    }

    #[test]
    fn test_from_map_preserves_column_order() {
        let fv = FeatureVector::from_map(&full_map()).unwrap();
        let expected: Vec<f64> = (0..N_FEATURES).map(|i| i as f64).collect();
        assert_eq!(fv.to_array().to_vec(), expected);
        assert_eq!(fv.hr_rest, 6.0);
    }

    #[test]
    fn test_missing_field_is_reported() {
        let mut map = full_map();
        map.remove("spo2_min");
        match FeatureVector::from_map(&map) {
            Err(CareError::MissingFeature { feature }) => assert_eq!(feature, "spo2_min"),
            other => panic!("expected MissingFeature, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut map = full_map();
        map.insert("age".to_string(), f64::NAN);
        assert!(matches!(
            FeatureVector::from_map(&map),
            Err(CareError::InvalidFeature { .. })
        ));
    }

    #[test]
    fn test_extra_keys_ignored() {
        let mut map = full_map();
        map.insert("bmi".to_string(), 31.0);
        assert!(FeatureVector::from_map(&map).is_ok());
    }

    #[test]
    fn test_map_round_trip() {
        let fv = FeatureVector::from_map(&full_map()).unwrap();
        assert_eq!(fv.to_map(), full_map());
    }
}
