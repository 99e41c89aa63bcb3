// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

//! Holdout evaluation of graph prediction models.
//!
//! Given a graph, a prediction task, features and a classifier factory, an
//! [`Evaluator`] repeatedly splits the graph, fits a fresh model on the train
//! side and scores it on both sides, producing one [`PerformanceRecord`] per
//! holdout and mode.
//!
//! # Tasks
//!
//! | Task | Predicts | Accepted features |
//! |------|----------|-------------------|
//! | [`NodeLabelPrediction`] | node types | node |
//! | [`EdgeLabelPrediction`] | edge types | node, edge |
//! | [`EdgePrediction`] | edge existence | node, node type |
//!
//! # Schemas
//!
//! | Schema | Split | Seed of holdout `h` |
//! |--------|-------|---------------------|
//! | `Monte Carlo` | random holdout | `random_state + h` |
//! | `Stratified Monte Carlo` | stratified random holdout | `random_state + h` |
//! | `Kfold` | fold `h` of `number_of_holdouts` | `random_state` |
//! | `Stratified Kfold` | stratified fold `h` | `random_state` |
//!
//! # Example
//!
//! ```rust
//! use graphval_core::Graph;
//! use graphval_eval::{EvaluationConfig, EvaluationMode, EvaluationSchema, Evaluator, FeatureSources, NodeLabelPrediction};
//! use graphval_models::NearestCentroid;
//! use ndarray::Array2;
//!
//! let mut g = Graph::new("toy", false);
//! for i in 0..30 {
//!     g.add_node(&format!("n{i}"), [if i < 15 { "a" } else { "b" }]);
//! }
//! let x = Array2::from_shape_fn((30, 2), |(i, j)| if i < 15 { j as f64 } else { 5.0 + j as f64 });
//!
//! let evaluator = Evaluator::new(
//!     EvaluationConfig::default()
//!         .with_schema(EvaluationSchema::StratifiedKfold)
//!         .with_number_of_holdouts(3),
//! )
//! .unwrap();
//! let result = evaluator
//!     .run(
//!         &NodeLabelPrediction,
//!         &g,
//!         &FeatureSources::new().with_node_features(x),
//!         || Ok(NearestCentroid::new()),
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.len(), 6);
//! assert!(result.by_mode(EvaluationMode::Test).all(|r| r.metrics["accuracy"] == 1.0));
//! ```

mod cycle;
mod error;
mod evaluator;
mod features;
pub mod metrics;
mod record;
pub mod schema;
pub mod splitter;
pub mod task;

pub use cycle::{evaluate_holdout, FittedModel, HoldoutRun};
pub use error::{Error, Result};
pub use evaluator::{evaluate, EvaluationConfig, Evaluator};
pub use features::{
    node_type_features_per_node, EdgeEmbeddingMethod, FeatureKind, FeatureSource, FeatureSources,
    NodeDegree, NodeFeatureExtractor,
};
pub use metrics::Metrics;
pub use record::{EvaluationMode, EvaluationResult, MetricSummary, PerformanceRecord};
pub use schema::{EvaluationSchema, SplitPrimitive, SplitStrategy};
pub use task::{
    EdgeLabelPrediction, EdgePrediction, EdgePredictionConfig, Examples, NodeLabelPrediction,
    PredictionTask, TaskContext,
};
