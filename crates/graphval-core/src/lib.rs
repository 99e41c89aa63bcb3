// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::uninlined_format_args)]

//! Graph substrate for holdout evaluation.
//!
//! This crate provides the graph side of an evaluation pipeline:
//!
//! - [`Graph`] - A typed graph with known/unknown node and edge labels
//! - [`split`] - Random holdouts, k-fold splits and negative edge sampling
//! - [`SplitEngine`] - The interface the evaluation orchestrator drives
//! - [`formats`] - CSV loaders
//!
//! # Split targets
//!
//! | Task | Target | Examples |
//! |------|--------|----------|
//! | Node-label prediction | [`SplitTarget::NodeLabels`] | nodes with known type |
//! | Edge-label prediction | [`SplitTarget::EdgeLabels`] | edges with known type |
//! | Edge prediction | [`SplitTarget::Edges`] | all edges |
//!
//! # Example
//!
//! ```rust
//! use graphval_core::{Graph, HoldoutParams, InMemoryEngine, SplitEngine, SplitTarget};
//!
//! let mut g = Graph::new("chain", false);
//! for i in 0..10 {
//!     g.add_edge(&format!("n{i}"), &format!("n{}", i + 1), None, 1.0);
//! }
//!
//! let split = InMemoryEngine
//!     .random_holdout(&g, SplitTarget::Edges, &HoldoutParams::default(), false, 42)
//!     .unwrap();
//! assert_eq!(split.train.edge_count(), 8);
//! assert_eq!(split.test.edge_count(), 2);
//! ```

mod engine;
mod error;
pub mod formats;
mod graph;
pub mod split;

pub use engine::{HoldoutSplit, InMemoryEngine, SplitEngine};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeId, Graph, GraphStats, Node, NodeId, TypeId};
pub use split::holdout::random_holdout;
pub use split::kfold::kfold;
pub use split::negative::sample_negative_edges;
pub use split::{HoldoutParams, SplitTarget};

// Re-export petgraph for callers that need the underlying graph types
pub use petgraph;
