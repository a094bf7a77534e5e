//! Z-score standardization.
//!
//! Columns in industrial data live on wildly different scales (temperatures,
//! pressures, counts). Distance-based stages (k-means, kNN outlier scoring)
//! would otherwise be dominated by whichever column has the largest unit, so
//! every matrix entering those stages is scaled to zero mean and unit
//! variance first.
//!
//! Parameters are always fit on the **full, unfiltered** population. Outlier
//! exclusion happens after scaling, so dropping rows never shifts the scale
//! the retained rows are compared on.

use crate::error::{Error, Result};

/// Per-column scaling parameters fit from a reference matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParams {
    /// Per-column mean.
    pub means: Vec<f64>,
    /// Per-column sample standard deviation; `1.0` substituted for
    /// zero-variance columns so scaling stays well-defined.
    pub stds: Vec<f64>,
}

impl ScalingParams {
    /// Fit per-column mean and sample standard deviation from `matrix`.
    ///
    /// A column with zero variance gets a standard deviation of `1.0`; its
    /// scaled values come out as a constant `0.0`.
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self> {
        if matrix.is_empty() {
            return Err(Error::EmptyInput);
        }
        let d = matrix[0].len();
        for row in matrix {
            if row.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: row.len(),
                });
            }
        }

        let n = matrix.len() as f64;
        let mut means = vec![0.0; d];
        for row in matrix {
            for (j, &x) in row.iter().enumerate() {
                means[j] += x;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = vec![0.0; d];
        if matrix.len() > 1 {
            for row in matrix {
                for (j, &x) in row.iter().enumerate() {
                    let diff = x - means[j];
                    stds[j] += diff * diff;
                }
            }
            for s in &mut stds {
                *s = (*s / (n - 1.0)).sqrt();
            }
        }
        for s in &mut stds {
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { means, stds })
    }

    /// Apply `(x - mean) / std` elementwise using these parameters.
    pub fn apply(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let d = self.means.len();
        matrix
            .iter()
            .map(|row| {
                if row.len() != d {
                    return Err(Error::DimensionMismatch {
                        expected: d,
                        found: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .enumerate()
                    .map(|(j, &x)| (x - self.means[j]) / self.stds[j])
                    .collect())
            })
            .collect()
    }
}
