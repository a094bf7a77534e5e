//! Silhouette coefficients for hard cluster assignments.
//!
//! For point i in cluster c:
//!
//! ```text
//! a(i) = mean distance to the other members of c   (0 if c is a singleton)
//! b(i) = min over other clusters c' of the mean distance to members of c'
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! `s(i)` lives in [-1, 1]; higher means the point sits comfortably inside
//! its own cluster. Whenever the denominator is 0 (or the ratio comes out
//! NaN) the coefficient is defined as 0 rather than propagated — degenerate
//! geometry must not poison the mean.
//!
//! Only meaningful for k ≥ 2; a single cluster has no alternative to be
//! compared against and must not be requested.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-point silhouette coefficients.
///
/// `data` and `labels` must be index-aligned; labels must lie in `[0, k)`.
/// The per-point loop is O(n²) and runs across rows in parallel when the
/// `parallel` feature is enabled.
///
/// # Panics
///
/// Panics if `data` and `labels` differ in length, or if any label is
/// outside `[0, k)`.
pub fn silhouette_samples(data: &[Vec<f64>], labels: &[usize], k: usize) -> Vec<f64> {
    assert_eq!(data.len(), labels.len(), "data/labels length mismatch");
    if let Some(&bad) = labels.iter().find(|&&l| l >= k) {
        panic!("label {bad} out of range for k={k}");
    }

    #[cfg(feature = "parallel")]
    {
        (0..data.len())
            .into_par_iter()
            .map(|i| silhouette_one(data, labels, k, i))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..data.len())
            .map(|i| silhouette_one(data, labels, k, i))
            .collect()
    }
}

/// Mean silhouette over all points; 0.0 for empty input.
///
/// Panics under the same conditions as [`silhouette_samples`].
pub fn silhouette_score(data: &[Vec<f64>], labels: &[usize], k: usize) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let samples = silhouette_samples(data, labels, k);
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn silhouette_one(data: &[Vec<f64>], labels: &[usize], k: usize, i: usize) -> f64 {
    let own = labels[i];

    // Sum of distances and member count per cluster, one pass.
    let mut dist_sum = vec![0.0; k];
    let mut count = vec![0usize; k];
    for (j, point) in data.iter().enumerate() {
        if j == i {
            continue;
        }
        let c = labels[j];
        dist_sum[c] += euclidean(&data[i], point);
        count[c] += 1;
    }

    // a(i): 0 for a singleton cluster.
    let a = if count[own] == 0 {
        0.0
    } else {
        dist_sum[own] / count[own] as f64
    };

    // b(i): nearest other cluster by mean distance. Empty clusters are
    // skipped (they have no members to measure against).
    let b = (0..k)
        .filter(|&c| c != own && count[c] > 0)
        .map(|c| dist_sum[c] / count[c] as f64)
        .fold(f64::INFINITY, f64::min);
    if b.is_infinite() {
        return 0.0;
    }

    let denom = a.max(b);
    if denom == 0.0 {
        return 0.0;
    }
    let s = (b - a) / denom;
    if s.is_nan() {
        0.0
    } else {
        s
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
