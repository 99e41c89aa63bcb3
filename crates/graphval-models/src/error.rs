use thiserror::Error;

/// Errors that can occur in graphval-models.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// `predict` or `predict_proba` called before `fit`.
    #[error("The model `{0}` has not been fitted yet")]
    NotFitted(String),
    /// Feature and label shapes disagree, or features differ from the fitted width.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// Fit called with zero examples.
    #[error("Cannot fit `{0}` on an empty training set")]
    EmptyTrainingSet(String),
    /// A hyperparameter is out of its valid range.
    #[error("Invalid configuration `{name}`: {reason}")]
    InvalidConfig {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

/// Result type alias for graphval-models.
pub type Result<T> = std::result::Result<T, Error>;
