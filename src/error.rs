use core::fmt;

/// Result alias for `assay`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the analytics pipeline.
///
/// Only structural precondition violations surface as errors. Numeric edge
/// cases (zero-variance columns, singleton clusters, undefined silhouette
/// denominators) are absorbed with documented fallback values so that the
/// pipeline always completes for well-formed inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input row set was empty.
    EmptyInput,

    /// Fewer rows than the operation requires.
    TooFewRows {
        /// Minimum row count required.
        required: usize,
        /// Rows actually available.
        found: usize,
    },

    /// Fewer selected columns than the operation requires.
    TooFewColumns {
        /// Minimum column count required.
        required: usize,
        /// Columns actually selected.
        found: usize,
    },

    /// Row vector length did not match the selected column count.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items being clustered.
        n_items: usize,
    },

    /// Generic error with message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::TooFewRows { required, found } => {
                write!(f, "too few rows: need at least {required}, found {found}")
            }
            Error::TooFewColumns { required, found } => {
                write!(
                    f,
                    "too few columns: need at least {required}, found {found}"
                )
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
