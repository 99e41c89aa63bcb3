use crate::record::EvaluationMode;
use thiserror::Error;

/// Errors that can occur in graphval-eval.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema name is not one of the supported literals.
    #[error(
        "The requested evaluation schema `{requested}` is not available; expected one of: {}",
        .available.join(", ")
    )]
    UnsupportedSchema {
        /// Name as given by the caller.
        requested: String,
        /// Valid schema names.
        available: Vec<&'static str>,
    },
    /// Holdout index outside `0..number_of_holdouts`.
    #[error(
        "The holdout number {holdout_number} is out of range; expected 0 <= holdout_number < {number_of_holdouts}"
    )]
    InvalidHoldoutIndex {
        /// Requested holdout index.
        holdout_number: usize,
        /// Number of holdouts (fold count for k-fold schemas).
        number_of_holdouts: usize,
    },
    /// The task cannot consume the given feature kind.
    #[error("{0}")]
    UnsupportedFeature(String),
    /// The classifier returned NaN probabilities.
    #[error("There are NaN values in the predicted probabilities! (holdout {holdout_number}, {mode} graph)")]
    NaNInPredictions {
        /// Holdout during which the NaN was produced.
        holdout_number: usize,
        /// Graph that was being scored.
        mode: EvaluationMode,
    },
    /// A configuration value is out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// A feature matrix does not fit the graph.
    #[error("Invalid features: {0}")]
    InvalidFeatures(String),
    /// Graph engine error, propagated unchanged.
    #[error(transparent)]
    Graph(#[from] graphval_core::Error),
    /// Classifier error, propagated unchanged.
    #[error(transparent)]
    Model(#[from] graphval_models::Error),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for graphval-eval.
pub type Result<T> = std::result::Result<T, Error>;
