//! Automatic cluster-count selection by silhouette sweep.
//!
//! Runs k-means for every candidate k in `[2, min(10, n-1)]` and keeps the k
//! with the highest mean silhouette. Ties break toward the smallest k
//! (first seen). The full sweep is returned alongside the winner so callers
//! can plot inertia (elbow) and silhouette curves.

use super::kmeans::Kmeans;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::silhouette::silhouette_score;

/// Largest candidate k ever tried.
pub const MAX_K: usize = 10;

/// One candidate evaluated during the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct KMetric {
    /// Candidate cluster count.
    pub k: usize,
    /// Inertia of the fit at this k.
    pub inertia: f64,
    /// Mean silhouette of the fit at this k.
    pub mean_silhouette: f64,
}

/// Outcome of a k sweep.
#[derive(Debug, Clone)]
pub struct KSelection {
    /// The winning k (argmax mean silhouette, smallest-k tie-break).
    pub k: usize,
    /// All candidates evaluated, in ascending k order.
    pub sweep: Vec<KMetric>,
}

/// Sweep candidate cluster counts and pick the silhouette-maximizing k.
///
/// Requires at least 3 rows (so that `[2, n-1]` contains a candidate and
/// the silhouette is defined). Each per-k trial gets its own seed derived
/// from `seed`, so a seeded sweep is fully deterministic; the derivation is
/// shared with the pipeline's final fit, which therefore reproduces the
/// winning trial exactly.
pub fn select_k(data: &[Vec<f64>], seed: Option<u64>) -> Result<KSelection> {
    let n = data.len();
    if n < 3 {
        return Err(Error::TooFewRows {
            required: 3,
            found: n,
        });
    }

    let k_max = MAX_K.min(n - 1);
    let mut sweep = Vec::with_capacity(k_max - 1);
    let mut best: Option<(usize, f64)> = None;

    for k in 2..=k_max {
        let fit = kmeans_for_k(k, seed).fit(data)?;
        let mean_silhouette = silhouette_score(data, &fit.labels, k);

        // Strictly-greater comparison keeps the first-seen (smallest) k on ties.
        if best.map_or(true, |(_, s)| mean_silhouette > s) {
            best = Some((k, mean_silhouette));
        }
        sweep.push(KMetric {
            k,
            inertia: fit.inertia,
            mean_silhouette,
        });
    }

    let (k, _) = best.expect("k_max >= 2 guarantees at least one candidate");
    Ok(KSelection { k, sweep })
}

/// The k-means configuration used for the trial at `k`.
///
/// Also used by the pipeline for its final fit at the chosen k, so the
/// canonical labels match the sweep's winning trial when seeded.
pub fn kmeans_for_k(k: usize, seed: Option<u64>) -> Kmeans {
    let km = Kmeans::new(k);
    match seed {
        Some(s) => km.with_seed(s.wrapping_add(k as u64)),
        None => km,
    }
}
