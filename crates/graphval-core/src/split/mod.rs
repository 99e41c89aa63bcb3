//! Holdout and k-fold split primitives.
//!
//! Every primitive works on a set of *examples* chosen by a [`SplitTarget`]:
//!
//! | Target | Examples | Stratum | Train graph | Test graph |
//! |--------|----------|---------|-------------|------------|
//! | `NodeLabels` | nodes with known type | node type set | all edges, test node types masked | all edges, train node types masked |
//! | `EdgeLabels` | edges with known type | edge type | train edges + untyped edges | test edges |
//! | `Edges` | all edges | edge type | train edges | test edges |
//!
//! All randomness comes from `XorShiftRng::seed_from_u64(seed)`, so a seed
//! fully determines a split.

pub mod holdout;
pub mod kfold;
pub mod negative;

use crate::{Error, Graph, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a split partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitTarget {
    /// Nodes with known node types (node-label prediction).
    NodeLabels,
    /// Edges with known edge types (edge-label prediction).
    EdgeLabels,
    /// All edges (edge prediction).
    Edges,
}

/// Parameters forwarded to the random holdout primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldoutParams {
    /// Fraction of examples assigned to the train side, in (0, 1).
    pub train_size: f64,
}

impl Default for HoldoutParams {
    fn default() -> Self {
        Self { train_size: 0.8 }
    }
}

impl HoldoutParams {
    /// Set the train fraction.
    pub fn with_train_size(mut self, train_size: f64) -> Self {
        self.train_size = train_size;
        self
    }

    /// Check that `train_size` is strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        if !(self.train_size > 0.0 && self.train_size < 1.0) {
            return Err(Error::InvalidParameter {
                name: "train_size",
                reason: format!("expected a value in (0, 1), got {}", self.train_size),
            });
        }
        Ok(())
    }
}

/// One splittable example: its position (node id or edge position) and stratum.
#[derive(Debug, Clone)]
pub(crate) struct Example {
    pub(crate) position: usize,
    pub(crate) stratum: Vec<usize>,
}

/// Collect the examples of `graph` for `target`.
pub(crate) fn examples(graph: &Graph, target: SplitTarget) -> Result<Vec<Example>> {
    let examples: Vec<Example> = match target {
        SplitTarget::NodeLabels => (0..graph.node_count())
            .filter_map(|node| {
                graph.node_types(node).map(|types| Example {
                    position: node,
                    stratum: types.to_vec(),
                })
            })
            .collect(),
        SplitTarget::EdgeLabels => graph
            .edges()
            .enumerate()
            .filter_map(|(pos, (_, _, e))| {
                e.edge_type.map(|t| Example {
                    position: pos,
                    stratum: vec![t],
                })
            })
            .collect(),
        SplitTarget::Edges => graph
            .edges()
            .enumerate()
            .map(|(pos, (_, _, e))| Example {
                position: pos,
                stratum: e.edge_type.into_iter().collect(),
            })
            .collect(),
    };

    if examples.is_empty() {
        let what = match target {
            SplitTarget::NodeLabels => "known node types",
            SplitTarget::EdgeLabels => "known edge types",
            SplitTarget::Edges => "edges",
        };
        return Err(Error::MissingLabels {
            graph: graph.name().to_string(),
            what,
        });
    }
    Ok(examples)
}

/// Group example positions by stratum, in stratum order.
pub(crate) fn group_by_stratum(examples: &[Example]) -> BTreeMap<&[usize], Vec<usize>> {
    let mut groups: BTreeMap<&[usize], Vec<usize>> = BTreeMap::new();
    for ex in examples {
        groups.entry(ex.stratum.as_slice()).or_default().push(ex.position);
    }
    groups
}

/// Build the (train, test) graphs for the given example positions.
pub(crate) fn materialize(
    graph: &Graph,
    target: SplitTarget,
    train: &[usize],
    test: &[usize],
) -> (Graph, Graph) {
    match target {
        SplitTarget::NodeLabels => {
            let n = graph.node_count();
            let (mut keep_train, mut keep_test) = (vec![false; n], vec![false; n]);
            for &node in train {
                keep_train[node] = true;
            }
            for &node in test {
                keep_test[node] = true;
            }
            (
                graph.with_node_types_kept(&keep_train),
                graph.with_node_types_kept(&keep_test),
            )
        }
        SplitTarget::EdgeLabels => {
            let mut train_positions = train.to_vec();
            train_positions.extend(
                graph
                    .known_edge_types_mask()
                    .iter()
                    .enumerate()
                    .filter(|(_, &known)| !known)
                    .map(|(pos, _)| pos),
            );
            (graph.with_edges(&train_positions), graph.with_edges(test))
        }
        SplitTarget::Edges => (graph.with_edges(train), graph.with_edges(test)),
    }
}
