// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]

//! Classifiers for graph evaluation.
//!
//! - [`Classifier`] - The `fit` / `predict` / `predict_proba` contract
//! - [`Labels`] and [`LabelEncoding`] - Binary, multiclass and multilabel targets
//! - [`LogisticRegression`] - Gradient-descent logistic regression
//! - [`NearestCentroid`] - Distance-to-centroid classifier
//! - [`ClassifierConfig`] - Serializable model selection
//!
//! Feature matrices are `ndarray` views with one row per example.

mod centroid;
mod classifier;
mod config;
mod error;
pub mod labels;
mod logistic;

pub use centroid::NearestCentroid;
pub use classifier::Classifier;
pub use config::ClassifierConfig;
pub use error::{Error, Result};
pub use labels::{LabelEncoding, Labels};
pub use logistic::{LogisticRegression, LogisticRegressionConfig};

// Re-export ndarray so callers build features with the same version
pub use ndarray;
