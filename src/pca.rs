//! Principal component analysis, fixed at 2 output components.
//!
//! Used strictly for visualization and as the input space for outlier
//! scoring. The projection is fit on the **full** standardized matrix and
//! never on an outlier-filtered one, so flagged rows stay visually
//! comparable to the retained population.
//!
//! # Method
//!
//! Classic covariance-based PCA: center the data, form the d×d sample
//! covariance matrix, extract the top two eigenvectors by **power iteration
//! with deflation**. The column counts here are small (a handful of selected
//! sensor channels), so iterating on the d×d covariance is cheap and avoids
//! pulling a full LAPACK dependency into the crate.
//!
//! Power iteration is deterministic: the start vector is fixed, so repeated
//! fits on the same matrix produce identical projections (up to the usual
//! sign ambiguity of eigenvectors, which is harmless for visualization and
//! for Euclidean distances).

use crate::error::{Error, Result};
use ndarray::{Array1, Array2};

const POWER_MAX_ITER: usize = 200;
const POWER_TOL: f64 = 1e-10;

/// A fitted 2-component PCA projection.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Per-column mean of the fit matrix.
    mean: Vec<f64>,
    /// The two principal axes, each of length d.
    components: [Vec<f64>; 2],
    /// Eigenvalues (explained variance) of the two axes.
    explained: [f64; 2],
}

impl Pca {
    /// Fit a 2-component projection from `matrix`.
    ///
    /// Requires at least 2 rows and at least 2 columns.
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self> {
        let n = matrix.len();
        if n < 2 {
            return Err(Error::TooFewRows {
                required: 2,
                found: n,
            });
        }
        let d = matrix[0].len();
        if d < 2 {
            return Err(Error::TooFewColumns {
                required: 2,
                found: d,
            });
        }
        for row in matrix {
            if row.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: row.len(),
                });
            }
        }

        let mut mean = vec![0.0; d];
        for row in matrix {
            for (j, &x) in row.iter().enumerate() {
                mean[j] += x;
            }
        }
        for m in &mut mean {
            *m /= n as f64;
        }

        // Sample covariance of the centered data.
        let mut cov = Array2::<f64>::zeros((d, d));
        for row in matrix {
            for i in 0..d {
                let ci = row[i] - mean[i];
                for j in i..d {
                    cov[[i, j]] += ci * (row[j] - mean[j]);
                }
            }
        }
        let denom = (n - 1) as f64;
        for i in 0..d {
            for j in i..d {
                cov[[i, j]] /= denom;
                cov[[j, i]] = cov[[i, j]];
            }
        }

        let (first, lambda1) = dominant_eigenvector(&cov, 0);
        deflate(&mut cov, &first, lambda1);
        let (second, lambda2) = dominant_eigenvector(&cov, 1);

        Ok(Self {
            mean,
            components: [first.to_vec(), second.to_vec()],
            explained: [lambda1, lambda2],
        })
    }

    /// Project rows onto the two fitted axes.
    ///
    /// Index-aligned with the input: row i maps to `output[i] = [x, y]`.
    pub fn project(&self, matrix: &[Vec<f64>]) -> Result<Vec<[f64; 2]>> {
        let d = self.mean.len();
        matrix
            .iter()
            .map(|row| {
                if row.len() != d {
                    return Err(Error::DimensionMismatch {
                        expected: d,
                        found: row.len(),
                    });
                }
                let mut out = [0.0; 2];
                for (c, axis) in self.components.iter().enumerate() {
                    out[c] = row
                        .iter()
                        .zip(self.mean.iter())
                        .zip(axis.iter())
                        .map(|((&x, &m), &a)| (x - m) * a)
                        .sum();
                }
                Ok(out)
            })
            .collect()
    }

    /// Explained variance (eigenvalue) per component.
    pub fn explained_variance(&self) -> [f64; 2] {
        self.explained
    }
}

/// Dominant eigenvector of a symmetric matrix via power iteration.
///
/// `fallback_axis` selects the unit basis vector returned when the matrix is
/// (numerically) zero, which happens when every input column is constant;
/// the projection then collapses to the origin, which is the right picture.
fn dominant_eigenvector(m: &Array2<f64>, fallback_axis: usize) -> (Array1<f64>, f64) {
    let d = m.nrows();

    // Deterministic start: biased toward the highest-variance column so the
    // start vector is never orthogonal to the dominant eigenvector in
    // practice, plus a mild ramp to break symmetric ties.
    let mut v = Array1::<f64>::from_shape_fn(d, |j| 1.0 + j as f64 * 1e-3);
    let top = (0..d)
        .max_by(|&a, &b| m[[a, a]].total_cmp(&m[[b, b]]))
        .unwrap_or(0);
    v[top] += 1.0;
    let norm = v.dot(&v).sqrt();
    v.mapv_inplace(|x| x / norm);

    for _ in 0..POWER_MAX_ITER {
        let w = m.dot(&v);
        let norm = w.dot(&w).sqrt();
        if norm < POWER_TOL {
            // Zero (sub)matrix: no variance left along any direction.
            let mut e = Array1::<f64>::zeros(d);
            e[fallback_axis.min(d - 1)] = 1.0;
            return (e, 0.0);
        }
        let next = w / norm;
        // Sign-insensitive iterate delta: the alignment |next·v| is
        // quadratic in the angle error and saturates near 1 long before
        // the axis itself is accurate, so convergence is measured on the
        // iterate difference instead, which is linear in the error.
        let diff = &next - &v;
        let sum = &next + &v;
        let delta = diff.dot(&diff).sqrt().min(sum.dot(&sum).sqrt());
        v = next;
        if delta < POWER_TOL {
            break;
        }
    }

    let lambda = v.dot(&m.dot(&v));
    (v, lambda)
}

/// Remove the component along `v` from symmetric matrix `m` (Hotelling
/// deflation), so the next power iteration converges to the runner-up.
fn deflate(m: &mut Array2<f64>, v: &Array1<f64>, lambda: f64) {
    let d = m.nrows();
    for i in 0..d {
        for j in 0..d {
            m[[i, j]] -= lambda * v[i] * v[j];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projects_onto_max_variance_axis() {
        // Points along the x axis with tiny y jitter: first component is
        // (close to) the x axis, so projected x spread dominates y spread.
        let m = vec![
            vec![-2.0, 0.01],
            vec![-1.0, -0.01],
            vec![0.0, 0.01],
            vec![1.0, -0.01],
            vec![2.0, 0.01],
        ];
        let pca = Pca::fit(&m).unwrap();
        let proj = pca.project(&m).unwrap();

        let spread_x: f64 = proj.iter().map(|p| p[0] * p[0]).sum();
        let spread_y: f64 = proj.iter().map(|p| p[1] * p[1]).sum();
        assert!(spread_x > 100.0 * spread_y, "{spread_x} vs {spread_y}");

        let [l1, l2] = pca.explained_variance();
        assert!(l1 > l2);
    }

    #[test]
    fn test_preserves_pairwise_distances_in_2d() {
        // For 2D input, a 2-component projection is a rigid rotation (up to
        // sign): pairwise distances must survive exactly.
        let m = vec![
            vec![0.0, 0.0],
            vec![3.0, 1.0],
            vec![-1.0, 2.0],
            vec![2.0, -2.0],
        ];
        let pca = Pca::fit(&m).unwrap();
        let proj = pca.project(&m).unwrap();

        for i in 0..m.len() {
            for j in (i + 1)..m.len() {
                let orig = ((m[i][0] - m[j][0]).powi(2) + (m[i][1] - m[j][1]).powi(2)).sqrt();
                let proj_d = ((proj[i][0] - proj[j][0]).powi(2)
                    + (proj[i][1] - proj[j][1]).powi(2))
                .sqrt();
                assert!((orig - proj_d).abs() < 1e-8, "{orig} vs {proj_d}");
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let m = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 7.0], vec![0.0, -1.0, 2.0]];
        let a = Pca::fit(&m).unwrap().project(&m).unwrap();
        let b = Pca::fit(&m).unwrap().project(&m).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_matrix_projects_to_origin() {
        let m = vec![vec![5.0, 5.0], vec![5.0, 5.0], vec![5.0, 5.0]];
        let pca = Pca::fit(&m).unwrap();
        for p in pca.project(&m).unwrap() {
            assert_eq!(p, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_preconditions() {
        assert!(matches!(
            Pca::fit(&[vec![1.0, 2.0]]),
            Err(Error::TooFewRows { .. })
        ));
        assert!(matches!(
            Pca::fit(&[vec![1.0], vec![2.0]]),
            Err(Error::TooFewColumns { .. })
        ));
    }
}
