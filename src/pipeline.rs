//! The analytics pipeline: rows in, reports out.
//!
//! [`Pipeline`] composes the stage modules into the two operations callers
//! actually invoke:
//!
//! - [`Pipeline::compute_correlation`] — pairwise Pearson matrix
//! - [`Pipeline::compute_clustering`] — standardize, project, score
//!   outliers, pick k, partition, and describe each cluster
//!
//! Every invocation is a pure batch computation over a snapshot of rows: no
//! caching, no shared mutable state, safe to call concurrently for
//! independent inputs. The returned [`ClusteringResult`] is fully
//! re-derivable from `(rows, columns, k, exclude_outliers)` and is never
//! mutated after construction.
//!
//! Clustering data flow:
//!
//! ```text
//! rows → feature matrix → standardize (fit on full set)
//!      → PCA fit/project (full set) → outlier scoring
//!      → [optional row filtering] → k sweep → final k-means fit
//!      → silhouette → per-cluster stats → result assembly
//! ```
//!
//! The O(n²) stages (outlier scoring, silhouette) are the scaling ceiling:
//! keep row counts in the low tens of thousands.

use std::collections::BTreeSet;

use log::debug;

use crate::cluster::{kmeans_for_k, select_k, Clustering, KMetric, KSelection};
use crate::correlation::{correlation_matrix, CorrelationMatrix};
use crate::error::{Error, Result};
use crate::matrix::{feature_matrix, Row};
use crate::outlier::detect_outliers;
use crate::pca::Pca;
use crate::scale::ScalingParams;
use crate::silhouette::silhouette_score;
use crate::stats::{cluster_stats, RawClusterStats, ScaledClusterStats};

/// Label used in the full-population view for rows excluded from clustering.
pub const EXCLUDED: i32 = -1;

/// One row in the full-population projection view.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    /// Original row index.
    pub row: usize,
    /// First principal component.
    pub x: f64,
    /// Second principal component.
    pub y: f64,
    /// Cluster label, or [`EXCLUDED`] when the row was dropped before
    /// clustering.
    pub label: i32,
    /// Whether the outlier detector flagged this row.
    pub outlier: bool,
}

/// Result of a clustering run. Immutable once assembled.
#[derive(Debug, Clone)]
pub struct ClusteringResult {
    /// The cluster count actually used.
    pub k: usize,
    /// Labels in `[0, k)`, index-aligned with the clustered (possibly
    /// filtered) matrix.
    pub labels: Vec<usize>,
    /// Final centroids in standardized coordinates.
    pub centroids: Vec<Vec<f64>>,
    /// Clustered position → original row index. Identity when outliers
    /// were not excluded.
    pub mapping: Vec<usize>,
    /// Full-population 2D view: every original row, annotated with label
    /// and outlier flag.
    pub projection: Vec<ProjectedPoint>,
    /// Original row indices flagged by the outlier detector. Computed from
    /// the full population regardless of the exclusion mode.
    pub outliers: BTreeSet<usize>,
    /// Raw-scale per-cluster feature means.
    pub raw_stats: RawClusterStats,
    /// Standardized-scale per-cluster feature mean/variance.
    pub scaled_stats: ScaledClusterStats,
    /// The full k sweep (single entry when k was supplied by the caller).
    pub k_metrics: Vec<KMetric>,
    /// Mean silhouette of the final fit.
    pub mean_silhouette: f64,
    /// Structured textual log of each stage.
    pub log: Vec<String>,
    /// Feature columns used, in matrix order.
    pub columns: Vec<String>,
    /// Whether flagged rows were excluded before clustering.
    pub outliers_excluded: bool,
}

impl ClusteringResult {
    /// The run log as one newline-joined string.
    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }
}

/// Result of a correlation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationReport {
    /// The pairwise coefficient matrix (carries the column names).
    pub matrix: CorrelationMatrix,
    /// Caller-supplied label identifying the dataset.
    pub dataset_label: String,
}

/// Entry point for the two analytics operations.
///
/// Stateless apart from configuration; construct once and reuse, or build
/// fresh per call. The seed drives k-means++ initialization: a seeded
/// pipeline is fully deterministic, an unseeded one is not bit-identical
/// across invocations.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    seed: Option<u64>,
}

impl Pipeline {
    /// Create a pipeline with OS-sourced randomness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed for all randomized stages.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Compute the pairwise Pearson correlation matrix for the selected
    /// columns.
    ///
    /// Requires ≥ 2 columns and ≥ 1 row. Zero-variance columns degrade to
    /// the identity fallback instead of failing.
    pub fn compute_correlation(
        &self,
        rows: &[Row],
        columns: &[String],
        dataset_label: &str,
    ) -> Result<CorrelationReport> {
        let matrix = correlation_matrix(rows, columns)?;
        debug!(
            "correlation: {} columns over {} rows ({dataset_label})",
            columns.len(),
            rows.len()
        );
        Ok(CorrelationReport {
            matrix,
            dataset_label: dataset_label.to_string(),
        })
    }

    /// Cluster the rows, choosing k automatically by silhouette sweep.
    pub fn compute_clustering(
        &self,
        rows: &[Row],
        columns: &[String],
        exclude_outliers: bool,
    ) -> Result<ClusteringResult> {
        self.run_clustering(rows, columns, None, exclude_outliers)
    }

    /// Cluster the rows at a caller-chosen k, bypassing the selector.
    ///
    /// `k` must lie in `[2, n-1]` where n is the number of rows actually
    /// clustered (after any outlier exclusion).
    pub fn compute_clustering_at_k(
        &self,
        rows: &[Row],
        columns: &[String],
        k: usize,
        exclude_outliers: bool,
    ) -> Result<ClusteringResult> {
        self.run_clustering(rows, columns, Some(k), exclude_outliers)
    }

    fn run_clustering(
        &self,
        rows: &[Row],
        columns: &[String],
        forced_k: Option<usize>,
        exclude_outliers: bool,
    ) -> Result<ClusteringResult> {
        if rows.is_empty() {
            return Err(Error::EmptyInput);
        }
        if columns.len() < 2 {
            return Err(Error::TooFewColumns {
                required: 2,
                found: columns.len(),
            });
        }
        if rows.len() < 3 {
            return Err(Error::TooFewRows {
                required: 3,
                found: rows.len(),
            });
        }

        let n = rows.len();
        let mut run_log = Vec::new();

        let raw = feature_matrix(rows, columns);
        run_log.push(format!(
            "feature matrix: {n} rows x {} columns",
            columns.len()
        ));

        // Scale and project on the full population, so that exclusion never
        // shifts the frame the retained rows are compared in.
        let params = ScalingParams::fit(&raw)?;
        let scaled = params.apply(&raw)?;

        let pca = Pca::fit(&scaled)?;
        let projection = pca.project(&scaled)?;
        debug!("pca: explained variance {:?}", pca.explained_variance());

        let outliers = detect_outliers(&projection);
        run_log.push(format!(
            "outlier detection: flagged {} of {n} rows",
            outliers.len()
        ));

        // Branch on the exclusion mode: build the matrix that actually gets
        // clustered, plus the mapping back to original row indices.
        let (clustered, mapping): (Vec<Vec<f64>>, Vec<usize>) = if exclude_outliers {
            let mut m = Vec::with_capacity(n - outliers.len());
            let mut map = Vec::with_capacity(n - outliers.len());
            for (i, row) in scaled.iter().enumerate() {
                if !outliers.contains(&i) {
                    m.push(row.clone());
                    map.push(i);
                }
            }
            run_log.push(format!("clustering {} of {n} rows (outliers excluded)", m.len()));
            (m, map)
        } else {
            run_log.push(format!("clustering all {n} rows (outliers retained)"));
            (scaled, (0..n).collect())
        };

        let n_clustered = clustered.len();
        if n_clustered < 3 {
            return Err(Error::TooFewRows {
                required: 3,
                found: n_clustered,
            });
        }

        // Choose k, either by silhouette sweep or from the caller.
        let (k, k_metrics) = match forced_k {
            None => {
                let KSelection { k, sweep } = select_k(&clustered, self.seed)?;
                run_log.push(format!(
                    "k sweep: evaluated k in [2, {}], selected k={k}",
                    sweep.last().map(|m| m.k).unwrap_or(2)
                ));
                (k, sweep)
            }
            Some(k) => {
                if k < 2 || k > n_clustered - 1 {
                    return Err(Error::InvalidClusterCount {
                        requested: k,
                        n_items: n_clustered,
                    });
                }
                run_log.push(format!("k={k} supplied by caller"));
                (k, Vec::new())
            }
        };

        // Canonical fit at the chosen k. Seed derivation matches the
        // sweep's, so a seeded run reproduces the winning trial.
        let fit = kmeans_for_k(k, self.seed).fit(&clustered)?;
        if fit.converged {
            run_log.push(format!("k-means: converged after {} iterations", fit.iterations));
        } else {
            run_log.push(format!(
                "k-means: iteration cap reached after {} iterations without convergence",
                fit.iterations
            ));
        }

        let mean_silhouette = silhouette_score(&clustered, &fit.labels, k);
        run_log.push(format!("mean silhouette: {mean_silhouette:.4}"));

        // When the caller forced k, the sweep holds just that one point.
        let k_metrics = if k_metrics.is_empty() {
            vec![KMetric {
                k,
                inertia: fit.inertia,
                mean_silhouette,
            }]
        } else {
            k_metrics
        };

        // Full-population view: excluded rows get the sentinel label.
        let mut full_labels = vec![EXCLUDED; n];
        for (pos, &orig) in mapping.iter().enumerate() {
            full_labels[orig] = fit.labels[pos] as i32;
        }
        let view = projection
            .iter()
            .enumerate()
            .map(|(i, p)| ProjectedPoint {
                row: i,
                x: p[0],
                y: p[1],
                label: full_labels[i],
                outlier: outliers.contains(&i),
            })
            .collect();

        let (raw_stats, scaled_stats) =
            cluster_stats(&raw, &clustered, &fit.labels, &mapping, columns, k);

        debug!("clustering: k={k} silhouette={mean_silhouette:.4} outliers={}", outliers.len());

        Ok(ClusteringResult {
            k,
            labels: fit.labels,
            centroids: fit.centroids,
            mapping,
            projection: view,
            outliers,
            raw_stats,
            scaled_stats,
            k_metrics,
            mean_silhouette,
            log: run_log,
            columns: columns.to_vec(),
            outliers_excluded: exclude_outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CellValue;
    use std::collections::HashMap;

    fn point(a: f64, b: f64) -> Row {
        HashMap::from([
            ("a".to_string(), CellValue::Number(a)),
            ("b".to_string(), CellValue::Number(b)),
        ])
    }

    fn ab() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    /// 20 points in two well-separated blobs, plus one far outlier at the end.
    fn blobs_with_outlier() -> Vec<Row> {
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(point((i % 3) as f64 * 0.2, (i / 3) as f64 * 0.2));
        }
        for i in 0..10 {
            rows.push(point(10.0 + (i % 3) as f64 * 0.2, 10.0 + (i / 3) as f64 * 0.2));
        }
        rows.push(point(200.0, -200.0));
        rows
    }

    #[test]
    fn test_two_blobs_with_injected_outlier() {
        let rows = blobs_with_outlier();
        let result = Pipeline::new()
            .with_seed(42)
            .compute_clustering(&rows, &ab(), true)
            .unwrap();

        // Exactly the injected point is flagged.
        assert_eq!(result.outliers, BTreeSet::from([20]));
        assert_eq!(result.k, 2);
        assert!(result.mean_silhouette > 0.5, "{}", result.mean_silhouette);

        // Excluded row: sentinel label and outlier flag in the view.
        let excluded = &result.projection[20];
        assert_eq!(excluded.label, EXCLUDED);
        assert!(excluded.outlier);

        // Every other row carries a label in [0, k).
        for p in &result.projection[..20] {
            assert!(p.label >= 0 && (p.label as usize) < result.k);
            assert!(!p.outlier);
        }

        // Index mapping skips the outlier.
        assert_eq!(result.mapping.len(), 20);
        assert!(!result.mapping.contains(&20));
    }

    #[test]
    fn test_retained_outliers_all_assigned() {
        let rows = blobs_with_outlier();
        let result = Pipeline::new()
            .with_seed(42)
            .compute_clustering(&rows, &ab(), false)
            .unwrap();

        // No row is excluded; per-label counts sum to the population.
        let mut counts = vec![0usize; result.k];
        for p in &result.projection {
            assert!(p.label >= 0, "row {} unexpectedly excluded", p.row);
            counts[p.label as usize] += 1;
        }
        assert_eq!(counts.iter().sum::<usize>(), rows.len());

        // The outlier set is still reported (it is mode-independent).
        assert_eq!(result.outliers, BTreeSet::from([20]));
        assert!(result.projection[20].outlier);
    }

    #[test]
    fn test_mean_silhouette_matches_recomputation() {
        let rows = blobs_with_outlier();
        let result = Pipeline::new()
            .with_seed(7)
            .compute_clustering(&rows, &ab(), true)
            .unwrap();

        // Rebuild the matrix the labels were computed on and recompute.
        let raw = feature_matrix(&rows, &ab());
        let scaled = ScalingParams::fit(&raw).unwrap().apply(&raw).unwrap();
        let clustered: Vec<Vec<f64>> = result
            .mapping
            .iter()
            .map(|&i| scaled[i].clone())
            .collect();

        let recomputed = silhouette_score(&clustered, &result.labels, result.k);
        assert!((result.mean_silhouette - recomputed).abs() < 1e-12);
    }

    #[test]
    fn test_k_within_sweep_bounds() {
        let rows = blobs_with_outlier();
        let result = Pipeline::new()
            .with_seed(3)
            .compute_clustering(&rows, &ab(), false)
            .unwrap();

        let n = rows.len();
        assert!(result.k >= 2 && result.k <= 10.min(n - 1));
        for m in &result.k_metrics {
            assert!(m.k >= 2 && m.k <= 10.min(n - 1));
        }
    }

    #[test]
    fn test_forced_k() {
        let rows = blobs_with_outlier();
        let result = Pipeline::new()
            .with_seed(11)
            .compute_clustering_at_k(&rows, &ab(), 3, false)
            .unwrap();

        assert_eq!(result.k, 3);
        assert_eq!(result.k_metrics.len(), 1);
        assert_eq!(result.k_metrics[0].k, 3);
        for &label in &result.labels {
            assert!(label < 3);
        }
    }

    #[test]
    fn test_forced_k_out_of_range() {
        let rows = blobs_with_outlier();
        let pipeline = Pipeline::new().with_seed(1);

        assert!(matches!(
            pipeline.compute_clustering_at_k(&rows, &ab(), 1, false),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            pipeline.compute_clustering_at_k(&rows, &ab(), rows.len(), false),
            Err(Error::InvalidClusterCount { .. })
        ));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let rows = blobs_with_outlier();
        let a = Pipeline::new()
            .with_seed(99)
            .compute_clustering(&rows, &ab(), true)
            .unwrap();
        let b = Pipeline::new()
            .with_seed(99)
            .compute_clustering(&rows, &ab(), true)
            .unwrap();

        assert_eq!(a.k, b.k);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.mean_silhouette, b.mean_silhouette);
    }

    #[test]
    fn test_run_log_mentions_each_stage() {
        let rows = blobs_with_outlier();
        let result = Pipeline::new()
            .with_seed(5)
            .compute_clustering(&rows, &ab(), true)
            .unwrap();

        let log = result.log_text();
        assert!(log.contains("feature matrix"), "{log}");
        assert!(log.contains("outlier detection"), "{log}");
        assert!(log.contains("k sweep"), "{log}");
        assert!(log.contains("k-means"), "{log}");
        assert!(log.contains("mean silhouette"), "{log}");
    }

    #[test]
    fn test_correlation_report() {
        let rows = vec![point(1.0, 2.0), point(2.0, 4.0), point(3.0, 6.0)];
        let report = Pipeline::new()
            .compute_correlation(&rows, &ab(), "line-a")
            .unwrap();

        assert_eq!(report.dataset_label, "line-a");
        assert!((report.matrix.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_two_identical_rows() {
        // Correlation still works (identity fallback); clustering is below
        // the minimum population and must be rejected.
        let row = HashMap::from([
            ("a".to_string(), CellValue::Number(1.0)),
            ("b".to_string(), CellValue::Number(2.0)),
            ("c".to_string(), CellValue::Number(3.0)),
        ]);
        let rows = vec![row.clone(), row];
        let cols = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let pipeline = Pipeline::new();

        let report = pipeline.compute_correlation(&rows, &cols, "dup").unwrap();
        assert_eq!(report.matrix.get("a", "b"), Some(0.0));
        assert_eq!(report.matrix.get("c", "c"), Some(1.0));

        assert!(matches!(
            pipeline.compute_clustering(&rows, &cols, false),
            Err(Error::TooFewRows { required: 3, .. })
        ));
    }

    #[test]
    fn test_input_validation() {
        let pipeline = Pipeline::new();
        let rows = vec![point(0.0, 0.0), point(1.0, 1.0), point(2.0, 2.0)];

        assert!(matches!(
            pipeline.compute_clustering(&[], &ab(), false),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            pipeline.compute_clustering(&rows, &["a".to_string()], false),
            Err(Error::TooFewColumns { required: 2, .. })
        ));
    }
}
