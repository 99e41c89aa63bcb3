//! The split interface consumed by the evaluation orchestrator.
//!
//! The orchestrator never calls the split primitives directly: it goes
//! through [`SplitEngine`], so another graph engine (or a counting mock in
//! tests) can be dropped in without touching the evaluation code.

use crate::split::{holdout, kfold, negative, HoldoutParams, SplitTarget};
use crate::{Graph, Result};

/// One holdout: train and test graphs plus an optional support graph.
///
/// The support graph provides topological context for feature extraction;
/// when absent, the train graph plays that role.
#[derive(Debug, Clone)]
pub struct HoldoutSplit {
    /// Graph the model is fitted on.
    pub train: Graph,
    /// Graph the model is scored on.
    pub test: Graph,
    /// Optional topology for feature extraction.
    pub support: Option<Graph>,
}

impl HoldoutSplit {
    /// Create a split without support graph.
    pub fn new(train: Graph, test: Graph) -> Self {
        Self {
            train,
            test,
            support: None,
        }
    }

    /// Attach a support graph.
    pub fn with_support(mut self, support: Graph) -> Self {
        self.support = Some(support);
        self
    }

    /// The support graph, falling back to the train graph.
    pub fn support_or_train(&self) -> &Graph {
        self.support.as_ref().unwrap_or(&self.train)
    }
}

/// Graph-engine operations needed to run an evaluation.
pub trait SplitEngine {
    /// Random holdout of `params.train_size` of the target's examples.
    fn random_holdout(
        &self,
        graph: &Graph,
        target: SplitTarget,
        params: &HoldoutParams,
        stratify: bool,
        seed: u64,
    ) -> Result<HoldoutSplit>;

    /// Fold `k_index` of a `k`-fold partition.
    fn kfold(
        &self,
        graph: &Graph,
        target: SplitTarget,
        k: usize,
        k_index: usize,
        stratify: bool,
        seed: u64,
    ) -> Result<HoldoutSplit>;

    /// `count` non-existing edges of `graph`, also absent from `avoid`.
    fn negative_edges(
        &self,
        graph: &Graph,
        count: usize,
        seed: u64,
        avoid: &Graph,
        heterogeneous_only: bool,
    ) -> Result<Graph>;
}

/// The built-in engine backed by [`crate::split`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryEngine;

impl SplitEngine for InMemoryEngine {
    fn random_holdout(
        &self,
        graph: &Graph,
        target: SplitTarget,
        params: &HoldoutParams,
        stratify: bool,
        seed: u64,
    ) -> Result<HoldoutSplit> {
        let (train, test) = holdout::random_holdout(graph, target, params, stratify, seed)?;
        Ok(HoldoutSplit::new(train, test))
    }

    fn kfold(
        &self,
        graph: &Graph,
        target: SplitTarget,
        k: usize,
        k_index: usize,
        stratify: bool,
        seed: u64,
    ) -> Result<HoldoutSplit> {
        let (train, test) = kfold::kfold(graph, target, k, k_index, stratify, seed)?;
        Ok(HoldoutSplit::new(train, test))
    }

    fn negative_edges(
        &self,
        graph: &Graph,
        count: usize,
        seed: u64,
        avoid: &Graph,
        heterogeneous_only: bool,
    ) -> Result<Graph> {
        negative::sample_negative_edges(graph, count, seed, avoid, heterogeneous_only)
    }
}
