//! Dense row-major sample matrix

use serde::{Deserialize, Serialize};

/// A dense matrix for tabular data (row-major storage).
///
/// Each row is a sample, each column a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataMatrix {
    /// Flat storage of all values (row-major).
    pub data: Vec<f64>,
    /// Number of samples (rows).
    pub n_samples: usize,
    /// Number of features (columns).
    pub n_features: usize,
}

impl DataMatrix {
    /// Create a data matrix from fixed-width rows.
    #[must_use]
    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        let mut data = Vec::with_capacity(rows.len() * N);
        for row in rows {
            data.extend_from_slice(row);
        }
        Self {
            data,
            n_samples: rows.len(),
            n_features: N,
        }
    }

    /// Get a row (sample) as a slice.
    #[must_use]
    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.n_features;
        &self.data[start..start + self.n_features]
    }

    /// Get element at (row, col).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_features + col]
    }

    /// Per-column arithmetic mean. Zeros for an empty matrix.
    #[must_use]
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.n_features];
        if self.n_samples == 0 {
            return means;
        }
        for i in 0..self.n_samples {
            for (m, v) in means.iter_mut().zip(self.row(i)) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= self.n_samples as f64;
        }
        means
    }

    /// Per-column population standard deviation.
    #[must_use]
    pub fn column_std_devs(&self, means: &[f64]) -> Vec<f64> {
        let mut vars = vec![0.0; self.n_features];
        if self.n_samples == 0 {
            return vars;
        }
        for i in 0..self.n_samples {
            for ((v, x), m) in vars.iter_mut().zip(self.row(i)).zip(means) {
                *v += (x - m).powi(2);
            }
        }
        vars.iter()
            .map(|v| (v / self.n_samples as f64).sqrt())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_get() {
        let m = DataMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(m.n_samples, 3);
        assert_eq!(m.n_features, 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.get(2, 0), 5.0);
    }

    #[test]
    fn test_column_stats() {
        let m = DataMatrix::from_rows(&[[1.0, 10.0], [3.0, 10.0]]);
        let means = m.column_means();
        assert_eq!(means, vec![2.0, 10.0]);
        let stds = m.column_std_devs(&means);
        assert_eq!(stds, vec![1.0, 0.0]);
    }

    #[test]
    fn test_empty_matrix_stats() {
        let m = DataMatrix::from_rows::<3>(&[]);
        assert_eq!(m.column_means(), vec![0.0; 3]);
    }
}
