use thiserror::Error;

/// Errors that can occur in graphval-core.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A record could be read but not interpreted.
    #[error("Parse error in record {record}: {reason}")]
    Parse {
        /// 1-based record number.
        record: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// A split or sampling parameter is out of its valid range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as the caller spells it.
        name: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// Fold index outside `0..k`.
    #[error("k_index {index} is out of range for k = {k}; expected 0 <= k_index < {k}")]
    InvalidHoldoutIndex {
        /// Requested fold index.
        index: usize,
        /// Number of folds.
        k: usize,
    },
    /// The graph has nothing to split on for the requested target.
    #[error("The graph `{graph}` has no {what}")]
    MissingLabels {
        /// Graph name.
        graph: String,
        /// "known node types", "known edge types" or "edges".
        what: &'static str,
    },
}

/// Result type alias for graphval-core.
pub type Result<T> = std::result::Result<T, Error>;
