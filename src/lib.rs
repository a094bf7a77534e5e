//! # assay
//!
//! Correlation and clustering analytics for tabular industrial measurement
//! data. Feed it loosely-typed rows and a set of feature columns; get back a
//! pairwise Pearson correlation report, or a full clustering report with
//! standardization, kNN outlier scoring, silhouette-driven k selection,
//! k-means partitioning, a 2D PCA view, and per-cluster statistics.
//!
//! Everything is a pure, synchronous batch computation over in-memory rows:
//! no I/O, no persistence, no state between calls. Spreadsheet parsing,
//! chart rendering, and UI concerns live with the caller.
//!
//! ```rust
//! use assay::{CellValue, Pipeline, Row};
//! use std::collections::HashMap;
//!
//! let rows: Vec<Row> = (0..20)
//!     .map(|i| {
//!         let offset = if i < 10 { 0.0 } else { 50.0 };
//!         HashMap::from([
//!             ("temp".to_string(), CellValue::Number(offset + (i % 5) as f64)),
//!             ("flow".to_string(), CellValue::Number(offset + (i % 3) as f64)),
//!         ])
//!     })
//!     .collect();
//! let columns = vec!["temp".to_string(), "flow".to_string()];
//!
//! let pipeline = Pipeline::new().with_seed(42);
//!
//! let correlation = pipeline.compute_correlation(&rows, &columns, "demo").unwrap();
//! assert!(correlation.matrix.get("temp", "flow").unwrap() > 0.9);
//!
//! let clustering = pipeline.compute_clustering(&rows, &columns, true).unwrap();
//! assert_eq!(clustering.k, 2);
//! ```

pub mod cluster;
pub mod correlation;
/// Error types used across `assay`.
pub mod error;
pub mod matrix;
pub mod outlier;
pub mod pca;
pub mod pipeline;
pub mod scale;
pub mod silhouette;
pub mod stats;

pub use cluster::{ClusterFit, Clustering, KMetric, KSelection, Kmeans};
pub use correlation::CorrelationMatrix;
pub use error::{Error, Result};
pub use matrix::{feature_matrix, CellValue, Row};
pub use outlier::detect_outliers;
pub use pca::Pca;
pub use pipeline::{ClusteringResult, CorrelationReport, Pipeline, ProjectedPoint, EXCLUDED};
pub use scale::ScalingParams;
pub use silhouette::{silhouette_samples, silhouette_score};
pub use stats::FeatureStats;
