//! Pairwise Pearson correlation over selected columns.
//!
//! Columns are numeric-coerced with the same permissive rule as the feature
//! matrix builder. Zero-variance columns make the coefficient undefined;
//! instead of propagating NaN the engine substitutes the identity fallback:
//! 1.0 on the diagonal, 0.0 off it. The result is dense, symmetric by
//! construction, and has exactly 1.0 on every diagonal entry.

use crate::error::{Error, Result};
use crate::matrix::{numeric_column, Row};

/// A dense pairwise correlation matrix over named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    /// Row-major |cols| × |cols| coefficients, in `columns` order.
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// The column names, in matrix order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The coefficient grid, indexed by column position.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Look up the coefficient for a pair of column names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Compute the Pearson correlation matrix for `columns` over `rows`.
///
/// Requires at least 2 columns and a non-empty row set. Never fails on
/// degenerate numerics: undefined coefficients fall back to the identity
/// pattern (see module docs).
pub fn correlation_matrix(rows: &[Row], columns: &[String]) -> Result<CorrelationMatrix> {
    if rows.is_empty() {
        return Err(Error::EmptyInput);
    }
    if columns.len() < 2 {
        return Err(Error::TooFewColumns {
            required: 2,
            found: columns.len(),
        });
    }

    let series: Vec<Vec<f64>> = columns.iter().map(|c| numeric_column(rows, c)).collect();
    let d = columns.len();

    let mut values = vec![vec![0.0; d]; d];
    for i in 0..d {
        values[i][i] = 1.0;
        for j in (i + 1)..d {
            let r = pearson(&series[i], &series[j]).unwrap_or(0.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

/// Pearson's r for two equal-length series; `None` when undefined
/// (zero variance in either series).
fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return None;
    }
    let r = cov / denom;
    if r.is_nan() {
        None
    } else {
        Some(r)
    }
}
