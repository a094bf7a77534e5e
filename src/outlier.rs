//! Local-sparsity outlier scoring over the 2D projection.
//!
//! A row's score is the mean Euclidean distance to its 5 nearest neighbors
//! in the PCA projection; rows whose score exceeds
//! `mean(scores) + 2 * std(scores)` are flagged. Isolated points sit far
//! from their nearest neighbors and score high; points inside any dense
//! region score low regardless of which cluster they belong to.
//!
//! Scoring runs on the 2D projection rather than the full standardized
//! space: with a handful of correlated sensor channels the projection keeps
//! the geometry that matters while making scores stable and comparable
//! across runs.
//!
//! The all-pairs distance pass is O(n²) and embarrassingly parallel; the
//! `parallel` feature splits it across rows with rayon.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Neighbors used for the local-sparsity score.
const N_NEIGHBORS: usize = 5;

/// Threshold multiplier on the score standard deviation.
const THRESHOLD_SIGMA: f64 = 2.0;

/// Flag anomalous rows in a 2D projection.
///
/// Returns the set of flagged row indices (into `projection`). Populations
/// smaller than [`N_NEIGHBORS`] rows skip detection entirely and return the
/// empty set: with that few points there are not enough neighbors for a
/// stable density estimate.
pub fn detect_outliers(projection: &[[f64; 2]]) -> BTreeSet<usize> {
    let n = projection.len();
    if n < N_NEIGHBORS {
        return BTreeSet::new();
    }

    let scores = knn_scores(projection);

    let mean = scores.iter().sum::<f64>() / n as f64;
    let var = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n as f64;
    let threshold = mean + THRESHOLD_SIGMA * var.sqrt();

    scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Mean distance to the `N_NEIGHBORS` nearest non-self points, per row.
fn knn_scores(projection: &[[f64; 2]]) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        (0..projection.len())
            .into_par_iter()
            .map(|i| knn_score(projection, i))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..projection.len())
            .map(|i| knn_score(projection, i))
            .collect()
    }
}

fn knn_score(projection: &[[f64; 2]], i: usize) -> f64 {
    let p = projection[i];
    let mut dists: Vec<f64> = projection
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .map(|(_, q)| {
            let dx = p[0] - q[0];
            let dy = p[1] - q[1];
            (dx * dx + dy * dy).sqrt()
        })
        .collect();
    dists.sort_by(f64::total_cmp);

    let k = N_NEIGHBORS.min(dists.len());
    dists[..k].iter().sum::<f64>() / k as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_single_far_point() {
        // A tight blob plus one point far away.
        let mut pts: Vec<[f64; 2]> = (0..12)
            .map(|i| [(i % 4) as f64 * 0.1, (i / 4) as f64 * 0.1])
            .collect();
        pts.push([50.0, 50.0]);

        let flagged = detect_outliers(&pts);
        assert_eq!(flagged, BTreeSet::from([12]));
    }

    #[test]
    fn test_uniform_blob_has_no_outliers() {
        let pts: Vec<[f64; 2]> = (0..16)
            .map(|i| [(i % 4) as f64, (i / 4) as f64])
            .collect();
        assert!(detect_outliers(&pts).is_empty());
    }

    #[test]
    fn test_small_population_skips_detection() {
        let pts = vec![[0.0, 0.0], [0.1, 0.1], [100.0, 100.0], [0.2, 0.0]];
        assert!(detect_outliers(&pts).is_empty());
    }

    #[test]
    fn test_two_clusters_do_not_flag_each_other() {
        // Two well-separated dense groups: neither is sparse locally.
        let mut pts: Vec<[f64; 2]> = (0..8).map(|i| [i as f64 * 0.1, 0.0]).collect();
        pts.extend((0..8).map(|i| [20.0 + i as f64 * 0.1, 0.0]));
        assert!(detect_outliers(&pts).is_empty());
    }
}
