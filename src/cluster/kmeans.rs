//! K-means clustering (Lloyd's algorithm with k-means++ seeding).
//!
//! Partitions data into k clusters by minimizing inertia, the sum of squared
//! distances from each point to its assigned centroid:
//!
//! ```text
//! J = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! 1. Seed k centroids with k-means++ (each new centroid sampled with
//!    probability proportional to squared distance from the existing ones)
//! 2. **Assign**: each point → nearest centroid (Euclidean)
//! 3. **Update**: each centroid → mean of its assigned points
//! 4. Repeat until the centroid shift drops below tolerance or the
//!    iteration cap is reached
//!
//! Seeding is randomized; pass a seed via [`Kmeans::with_seed`] for
//! reproducible runs (tests rely on this — unseeded production fits are not
//! bit-identical across invocations). Hitting the iteration cap is not an
//! error: the last assignment is returned with `converged = false`.

use super::traits::{ClusterFit, Clustering};
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence tolerance on total squared centroid shift.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-8,
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initialize centroids using the k-means++ strategy.
    fn init_centroids(&self, data: &Array2<f64>, rng: &mut impl Rng) -> Array2<f64> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        // First centroid: random point.
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        for i in 1..self.k {
            let mut distances: Vec<f64> = Vec::with_capacity(n);

            for j in 0..n {
                let point = data.row(j);
                let min_dist = (0..i)
                    .map(|c| {
                        let centroid = centroids.row(c);
                        point
                            .iter()
                            .zip(centroid.iter())
                            .map(|(a, b)| (a - b).powi(2))
                            .sum::<f64>()
                    })
                    .fold(f64::MAX, f64::min);
                distances.push(min_dist);
            }

            // Sample proportional to squared distance. If every point
            // coincides with an existing centroid, fall back to uniform.
            let total: f64 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;

            for (j, &d) in distances.iter().enumerate() {
                cumsum += d;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }

            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }

    /// Compute squared Euclidean distance.
    fn squared_distance(a: &ndarray::ArrayView1<'_, f64>, b: &ndarray::ArrayView1<'_, f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
    }

    fn nearest_centroid(
        point: &ndarray::ArrayView1<'_, f64>,
        centroids: &Array2<f64>,
        k: usize,
    ) -> (usize, f64) {
        let mut best_cluster = 0;
        let mut best_dist = f64::MAX;
        for c in 0..k {
            let dist = Self::squared_distance(point, &centroids.row(c));
            if dist < best_dist {
                best_dist = dist;
                best_cluster = c;
            }
        }
        (best_cluster, best_dist)
    }
}

impl Clustering for Kmeans {
    fn fit(&self, data: &[Vec<f64>]) -> Result<ClusterFit> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let n = data.len();
        let d = data[0].len();

        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        // Convert to ndarray.
        let mut flat: Vec<f64> = Vec::with_capacity(n * d);
        for point in data {
            if point.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
            flat.extend(point);
        }
        let data_arr =
            Array2::from_shape_vec((n, d), flat).map_err(|e| Error::Other(e.to_string()))?;

        // Initialize RNG.
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut centroids = self.init_centroids(&data_arr, &mut rng);
        let mut labels = vec![0usize; n];
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;

            // Assignment step - parallel when feature enabled.
            #[cfg(feature = "parallel")]
            {
                let centroids_ref = &centroids;
                labels.par_iter_mut().enumerate().for_each(|(i, label)| {
                    let point = data_arr.row(i);
                    *label = Self::nearest_centroid(&point, centroids_ref, self.k).0;
                });
            }

            #[cfg(not(feature = "parallel"))]
            for (i, label) in labels.iter_mut().enumerate() {
                let point = data_arr.row(i);
                *label = Self::nearest_centroid(&point, &centroids, self.k).0;
            }

            // Update step.
            let mut new_centroids = Array2::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];

            for i in 0..n {
                let c = labels[i];
                for j in 0..d {
                    new_centroids[[c, j]] += data_arr[[i, j]];
                }
                counts[c] += 1;
            }

            for c in 0..self.k {
                if counts[c] > 0 {
                    for j in 0..d {
                        new_centroids[[c, j]] /= counts[c] as f64;
                    }
                } else {
                    // Empty cluster: reseed from a random point.
                    let idx = rng.random_range(0..n);
                    new_centroids.row_mut(c).assign(&data_arr.row(idx));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            centroids = new_centroids;

            if shift < self.tol {
                converged = true;
                break;
            }
        }

        // Final assignment against the final centroids, accumulating inertia.
        let mut inertia = 0.0;
        for (i, label) in labels.iter_mut().enumerate() {
            let point = data_arr.row(i);
            let (best, dist) = Self::nearest_centroid(&point, &centroids, self.k);
            *label = best;
            inertia += dist;
        }

        let centroids = (0..self.k)
            .map(|c| centroids.row(c).to_vec())
            .collect();

        Ok(ClusterFit {
            labels,
            centroids,
            inertia,
            converged,
            iterations,
        })
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
