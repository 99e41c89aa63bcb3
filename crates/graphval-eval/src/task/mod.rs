//! Prediction tasks.
//!
//! A task decides what a split partitions, which features it accepts, how
//! labels are encoded and how an evaluation graph becomes a feature matrix
//! with labels.
//!
//! | Task | Split target | Features | Encoding | Examples column |
//! |------|--------------|----------|----------|-----------------|
//! | [`NodeLabelPrediction`] | known node types | node | binary / multiclass / multilabel | `known_nodes_number` |
//! | [`EdgeLabelPrediction`] | known edge types | node (edge-embedded), edge | binary / multiclass | `known_edges_number` |
//! | [`EdgePrediction`] | edges | node, node type (edge-embedded) | binary | `edges_number` |

mod edge_label;
mod edge_prediction;
mod node_label;

pub use edge_label::EdgeLabelPrediction;
pub use edge_prediction::{EdgePrediction, EdgePredictionConfig};
pub use node_label::NodeLabelPrediction;

use crate::features::{FeatureKind, FeatureSources};
use crate::record::EvaluationMode;
use crate::schema::EvaluationSchema;
use crate::{Error, Result};
use graphval_core::{Graph, HoldoutSplit, SplitEngine, SplitTarget};
use graphval_models::{LabelEncoding, Labels};
use ndarray::Array2;

/// Feature matrix and labels for one evaluation graph.
#[derive(Debug, Clone)]
pub struct Examples {
    /// One row per example.
    pub features: Array2<f64>,
    /// Ground truth.
    pub labels: Labels,
}

impl Examples {
    /// Number of examples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no examples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Everything a task needs to build examples for one holdout.
pub struct TaskContext<'a> {
    /// Graph engine, for tasks that sample.
    pub engine: &'a dyn SplitEngine,
    /// The full graph being evaluated.
    pub graph: &'a Graph,
    /// The current holdout.
    pub split: &'a HoldoutSplit,
    /// Node features resolved on the support graph.
    pub node_features: Option<Array2<f64>>,
    /// Node type features.
    pub node_type_features: Option<Array2<f64>>,
    /// Edge features indexed by root edge id.
    pub edge_features: Option<Array2<f64>>,
    /// Base seed of the run.
    pub random_state: u64,
    /// Current holdout index.
    pub holdout_number: usize,
}

impl<'a> TaskContext<'a> {
    /// Resolve every feature source for `split`.
    pub fn new(
        engine: &'a dyn SplitEngine,
        graph: &'a Graph,
        split: &'a HoldoutSplit,
        features: &FeatureSources,
        random_state: u64,
        holdout_number: usize,
    ) -> Result<Self> {
        Ok(Self {
            engine,
            graph,
            split,
            node_features: features.resolve_node_features(split.support_or_train())?,
            node_type_features: features.resolve_node_type_features(graph)?,
            edge_features: features.resolve_edge_features(graph)?,
            random_state,
            holdout_number,
        })
    }

    /// The graph scored in `mode`.
    pub fn evaluation_graph(&self, mode: EvaluationMode) -> &'a Graph {
        match mode {
            EvaluationMode::Train => &self.split.train,
            EvaluationMode::Test => &self.split.test,
        }
    }
}

/// A graph prediction task evaluated through holdouts.
pub trait PredictionTask {
    /// Task name used in result tables.
    fn name(&self) -> &'static str;

    /// What the splits partition.
    fn split_target(&self) -> SplitTarget;

    /// Name of the evaluated-examples column.
    fn examples_column(&self) -> &'static str;

    /// Feature kinds this task can consume.
    fn supported_features(&self) -> &'static [FeatureKind];

    /// Schemas this task can be evaluated with.
    fn available_schemas(&self) -> &'static [EvaluationSchema] {
        &EvaluationSchema::ALL
    }

    /// Reject unsupported or missing features. Runs before any engine call.
    fn check_features(&self, features: &FeatureSources) -> Result<()> {
        let supported = self.supported_features();
        if let Some(kind) = features.kinds().into_iter().find(|k| !supported.contains(k)) {
            return Err(Error::UnsupportedFeature(format!(
                "{} is not supported by {}; supported: {}",
                kind,
                self.name(),
                supported
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        if features.is_empty() {
            return Err(Error::InvalidFeatures(format!(
                "{} needs at least one of: {}",
                self.name(),
                supported
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(())
    }

    /// Label encoding for `graph`, fixed for the whole run.
    fn label_encoding(&self, graph: &Graph) -> Result<LabelEncoding>;

    /// Fraction of the graph's examples in the train graph.
    fn train_size(&self, graph: &Graph, split: &HoldoutSplit) -> f64;

    /// Features and labels of the graph scored in `mode`.
    fn examples(&self, ctx: &TaskContext<'_>, mode: EvaluationMode, encoding: LabelEncoding) -> Result<Examples>;
}

/// `train.edge_count / graph.edge_count`, shared by the edge tasks.
pub(crate) fn edge_train_size(graph: &Graph, split: &HoldoutSplit) -> f64 {
    if graph.edge_count() == 0 {
        return 0.0;
    }
    split.train.edge_count() as f64 / graph.edge_count() as f64
}

/// Node vectors for `pairs` from the optional node and node-type matrices.
pub(crate) fn pair_features(
    ctx: &TaskContext<'_>,
    method: crate::EdgeEmbeddingMethod,
    pairs: &[(usize, usize)],
) -> Vec<Array2<f64>> {
    let mut blocks = Vec::new();
    if let Some(x) = &ctx.node_features {
        blocks.push(method.embed(x.view(), pairs));
    }
    if let Some(types) = &ctx.node_type_features {
        let per_node = crate::features::node_type_features_per_node(ctx.graph, types.view());
        blocks.push(method.embed(per_node.view(), pairs));
    }
    blocks
}

/// Column-wise concatenation of feature blocks with `rows` rows.
pub(crate) fn hstack(blocks: &[Array2<f64>], rows: usize) -> Result<Array2<f64>> {
    if blocks.is_empty() {
        return Ok(Array2::zeros((rows, 0)));
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    ndarray::concatenate(ndarray::Axis(1), &views).map_err(|e| Error::InvalidFeatures(e.to_string()))
}
