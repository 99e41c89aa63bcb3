use super::{edge_train_size, hstack, pair_features, Examples, PredictionTask, TaskContext};
use crate::features::{EdgeEmbeddingMethod, FeatureKind, FeatureSources};
use crate::record::EvaluationMode;
use crate::{Error, Result};
use graphval_core::{Graph, HoldoutSplit, SplitTarget};
use graphval_models::{LabelEncoding, Labels};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Edge prediction hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePredictionConfig {
    /// Negatives per positive edge (default: 1.0).
    pub unbalance_rate: f64,
    /// Sample negatives only between nodes with different type sets (default: false).
    pub heterogeneous_negatives: bool,
    /// How node vectors combine into edge vectors.
    pub edge_embedding: EdgeEmbeddingMethod,
}

impl Default for EdgePredictionConfig {
    fn default() -> Self {
        Self {
            unbalance_rate: 1.0,
            heterogeneous_negatives: false,
            edge_embedding: EdgeEmbeddingMethod::default(),
        }
    }
}

impl EdgePredictionConfig {
    pub fn with_unbalance_rate(mut self, unbalance_rate: f64) -> Self {
        self.unbalance_rate = unbalance_rate;
        self
    }

    pub fn with_heterogeneous_negatives(mut self, heterogeneous: bool) -> Self {
        self.heterogeneous_negatives = heterogeneous;
        self
    }

    pub fn with_edge_embedding(mut self, method: EdgeEmbeddingMethod) -> Self {
        self.edge_embedding = method;
        self
    }

    /// `unbalance_rate` must be positive and finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.unbalance_rate.is_finite() && self.unbalance_rate > 0.0) {
            return Err(Error::InvalidParameter {
                name: "unbalance_rate",
                reason: format!("expected a positive finite value, got {}", self.unbalance_rate),
            });
        }
        Ok(())
    }
}

/// Predict whether an edge exists.
///
/// Positives are the evaluation graph's edges. Negatives are sampled per
/// mode from the full graph (so they never collide with any real edge), with
/// seed `2 * (random_state + holdout_number) + mode` where train is 0 and
/// test is 1.
#[derive(Debug, Clone, Copy)]
pub struct EdgePrediction {
    config: EdgePredictionConfig,
}

impl EdgePrediction {
    /// Create the task, validating the configuration.
    pub fn new(config: EdgePredictionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The task configuration.
    pub fn config(&self) -> &EdgePredictionConfig {
        &self.config
    }

    /// Seed for the negatives of `mode` in `holdout_number`.
    pub fn negative_seed(random_state: u64, holdout_number: usize, mode: EvaluationMode) -> u64 {
        let offset = match mode {
            EvaluationMode::Train => 0,
            EvaluationMode::Test => 1,
        };
        random_state
            .wrapping_add(holdout_number as u64)
            .wrapping_mul(2)
            .wrapping_add(offset)
    }
}

impl Default for EdgePrediction {
    fn default() -> Self {
        Self {
            config: EdgePredictionConfig::default(),
        }
    }
}

impl PredictionTask for EdgePrediction {
    fn name(&self) -> &'static str {
        "Edge Prediction"
    }

    fn split_target(&self) -> SplitTarget {
        SplitTarget::Edges
    }

    fn examples_column(&self) -> &'static str {
        "edges_number"
    }

    fn supported_features(&self) -> &'static [FeatureKind] {
        &[FeatureKind::NodeFeatures, FeatureKind::NodeTypeFeatures]
    }

    fn check_features(&self, features: &FeatureSources) -> Result<()> {
        if !features.edge_features.is_empty() {
            return Err(Error::UnsupportedFeature(
                "Edge features are not supported in edge prediction models.".to_string(),
            ));
        }
        if features.is_empty() {
            return Err(Error::InvalidFeatures(
                "edge prediction needs node features or node type features".to_string(),
            ));
        }
        Ok(())
    }

    fn label_encoding(&self, _graph: &Graph) -> Result<LabelEncoding> {
        Ok(LabelEncoding::Binary)
    }

    fn train_size(&self, graph: &Graph, split: &HoldoutSplit) -> f64 {
        edge_train_size(graph, split)
    }

    fn examples(&self, ctx: &TaskContext<'_>, mode: EvaluationMode, _encoding: LabelEncoding) -> Result<Examples> {
        let positives: Vec<(usize, usize)> = ctx
            .evaluation_graph(mode)
            .edges()
            .map(|(src, dst, _)| (src, dst))
            .collect();
        let count = (positives.len() as f64 * self.config.unbalance_rate).round() as usize;
        let seed = Self::negative_seed(ctx.random_state, ctx.holdout_number, mode);
        let negatives = ctx.engine.negative_edges(
            ctx.graph,
            count,
            seed,
            ctx.graph,
            self.config.heterogeneous_negatives,
        )?;

        let mut pairs = positives;
        let n_positives = pairs.len();
        pairs.extend(negatives.edges().map(|(src, dst, _)| (src, dst)));

        log::debug!(
            "edge prediction {} examples: {} positives, {} negatives (seed {})",
            mode,
            n_positives,
            pairs.len() - n_positives,
            seed
        );

        let blocks = pair_features(ctx, self.config.edge_embedding, &pairs);
        let features = hstack(&blocks, pairs.len())?;
        let labels = Labels::Binary(Array1::from_shape_fn(pairs.len(), |i| i < n_positives));
        Ok(Examples { features, labels })
    }
}
