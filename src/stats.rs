//! Per-cluster descriptive statistics.
//!
//! Two views of every cluster, per feature:
//!
//! - **raw scale**: mean over the original-unit values of member rows, for
//!   human-readable reporting ("cluster 2 runs ~40 °C hotter")
//! - **standardized scale**: mean and sample variance over the scaled rows,
//!   for comparing features against each other
//!
//! When outliers were excluded before clustering, the raw-scale lookup goes
//! through the index mapping back to the original rows. A cluster that
//! received zero members reports mean 0 / variance 0 rather than failing.

use std::collections::BTreeMap;

/// Standardized-scale summary of one feature within one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStats {
    /// Mean of the scaled values.
    pub mean: f64,
    /// Sample (n−1) variance of the scaled values; 0 for singleton or
    /// empty clusters.
    pub variance: f64,
}

/// Raw-scale means: cluster id → feature name → mean of original values.
pub type RawClusterStats = BTreeMap<usize, BTreeMap<String, f64>>;

/// Standardized-scale stats: cluster id → feature name → mean/variance.
pub type ScaledClusterStats = BTreeMap<usize, BTreeMap<String, FeatureStats>>;

/// Aggregate per-cluster statistics.
///
/// `scaled` is the matrix that was actually clustered (possibly
/// outlier-filtered) and is index-aligned with `labels`. `raw` is the full
/// original-unit matrix; `mapping[i]` gives the original row index for
/// clustered position i. `columns` names the features in matrix order.
pub fn cluster_stats(
    raw: &[Vec<f64>],
    scaled: &[Vec<f64>],
    labels: &[usize],
    mapping: &[usize],
    columns: &[String],
    k: usize,
) -> (RawClusterStats, ScaledClusterStats) {
    debug_assert_eq!(scaled.len(), labels.len());
    debug_assert_eq!(scaled.len(), mapping.len());

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (pos, &label) in labels.iter().enumerate() {
        members[label].push(pos);
    }

    let mut raw_stats = RawClusterStats::new();
    let mut scaled_stats = ScaledClusterStats::new();

    for (cluster, positions) in members.iter().enumerate() {
        let n = positions.len();

        let mut raw_means = BTreeMap::new();
        let mut feature_stats = BTreeMap::new();

        for (j, col) in columns.iter().enumerate() {
            if n == 0 {
                raw_means.insert(col.clone(), 0.0);
                feature_stats.insert(
                    col.clone(),
                    FeatureStats {
                        mean: 0.0,
                        variance: 0.0,
                    },
                );
                continue;
            }

            let raw_mean = positions
                .iter()
                .map(|&pos| raw[mapping[pos]][j])
                .sum::<f64>()
                / n as f64;

            let scaled_mean = positions.iter().map(|&pos| scaled[pos][j]).sum::<f64>() / n as f64;
            let variance = if n > 1 {
                positions
                    .iter()
                    .map(|&pos| {
                        let diff = scaled[pos][j] - scaled_mean;
                        diff * diff
                    })
                    .sum::<f64>()
                    / (n - 1) as f64
            } else {
                0.0
            };

            raw_means.insert(col.clone(), raw_mean);
            feature_stats.insert(
                col.clone(),
                FeatureStats {
                    mean: scaled_mean,
                    variance,
                },
            );
        }

        raw_stats.insert(cluster, raw_means);
        scaled_stats.insert(cluster, feature_stats);
    }

    (raw_stats, scaled_stats)
}
