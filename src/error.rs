use core::fmt;

/// Result alias for `papermap`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run.
///
/// Record-level data problems (a missing abstract, a malformed author entry)
/// never show up here: the loader skips those records and logs them.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// No papers left after filtering.
    EmptyCorpus,

    /// The embedding provider failed, or returned a vector of the wrong length.
    EmbeddingFailure {
        /// Index of the offending paper in corpus order.
        index: usize,
        /// Provider-reported cause.
        cause: String,
    },

    /// Matrix dimension mismatch.
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
        /// Number of items.
        n_items: usize,
    },

    /// The keyword extractor failed for a cluster.
    KeywordFailure {
        /// Cluster whose concatenated abstracts were being summarized.
        cluster: usize,
        /// Extractor-reported cause.
        cause: String,
    },

    /// Corpus source could not be read or is not a JSON array.
    Load(String),

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyCorpus => write!(f, "corpus is empty after filtering"),
            Error::EmbeddingFailure { index, cause } => {
                write!(f, "embedding failed for paper {index}: {cause}")
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::KeywordFailure { cluster, cause } => {
                write!(f, "keyword extraction failed for cluster {cluster}: {cause}")
            }
            Error::Load(msg) => write!(f, "failed to load corpus: {msg}"),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
