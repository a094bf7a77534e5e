//! Clustering traits and the shared fit result.

use crate::error::Result;

/// Outcome of a single clustering fit.
#[derive(Debug, Clone)]
pub struct ClusterFit {
    /// Cluster label per input point, in `[0, k)`.
    pub labels: Vec<usize>,
    /// Final centroid per cluster, in input-space coordinates.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from each point to its assigned centroid.
    pub inertia: f64,
    /// Whether the algorithm stabilized before the iteration cap.
    ///
    /// Non-convergence is not fatal: the last iteration's assignment is
    /// still returned, and callers record the fact in their run log.
    pub converged: bool,
    /// Iterations actually executed.
    pub iterations: usize,
}

/// Trait for hard clustering algorithms.
pub trait Clustering {
    /// Fit the model to data and return labels, centroids and inertia.
    fn fit(&self, data: &[Vec<f64>]) -> Result<ClusterFit>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
