//! Clustering: the k-means engine and the silhouette-driven k selector.
//!
//! K-means is the only algorithm here. It assumes roughly spherical,
//! similar-sized clusters, which fits the standardized sensor data this
//! crate targets; the cluster count is chosen automatically by
//! [`select_k`], which sweeps candidates and keeps the silhouette winner.
//!
//! ```rust
//! use assay::cluster::{select_k, Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![0.2, 0.0],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//!     vec![10.0, 10.2],
//! ];
//!
//! // Pick k automatically...
//! let selection = select_k(&data, Some(42)).unwrap();
//! assert_eq!(selection.k, 2);
//!
//! // ...or fit at an explicit k.
//! let fit = Kmeans::new(2).with_seed(42).fit(&data).unwrap();
//! assert_eq!(fit.labels[0], fit.labels[1]);
//! assert_ne!(fit.labels[0], fit.labels[5]);
//! ```

mod kmeans;
mod select;
mod traits;

pub use kmeans::Kmeans;
pub use select::{kmeans_for_k, select_k, KMetric, KSelection, MAX_K};
pub use traits::{ClusterFit, Clustering};
