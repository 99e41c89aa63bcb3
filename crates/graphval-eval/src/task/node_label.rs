use super::{Examples, PredictionTask, TaskContext};
use crate::features::{FeatureKind, FeatureSources};
use crate::record::EvaluationMode;
use crate::{Error, Result};
use graphval_core::{Graph, HoldoutSplit, SplitTarget};
use graphval_models::{LabelEncoding, Labels};
use ndarray::{Array1, Array2, Axis};

/// Predict node types from node features.
///
/// Binary when the graph has exactly two node types and no node carries
/// several; multilabel when any node carries several; multiclass otherwise.
/// For binary tasks the positive class is node type id 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeLabelPrediction;

impl NodeLabelPrediction {
    /// Create the task.
    pub fn new() -> Self {
        Self
    }
}

impl PredictionTask for NodeLabelPrediction {
    fn name(&self) -> &'static str {
        "Node Label Prediction"
    }

    fn split_target(&self) -> SplitTarget {
        SplitTarget::NodeLabels
    }

    fn examples_column(&self) -> &'static str {
        "known_nodes_number"
    }

    fn supported_features(&self) -> &'static [FeatureKind] {
        &[FeatureKind::NodeFeatures]
    }

    fn check_features(&self, features: &FeatureSources) -> Result<()> {
        if !features.edge_features.is_empty() {
            return Err(Error::UnsupportedFeature(
                "Currently edge features are not supported in node-label prediction models.".to_string(),
            ));
        }
        if !features.node_type_features.is_empty() {
            return Err(Error::UnsupportedFeature(
                "Support for node type features is not currently available for any of the node-label prediction models."
                    .to_string(),
            ));
        }
        if features.node_features.is_empty() {
            return Err(Error::InvalidFeatures(
                "node-label prediction needs node features".to_string(),
            ));
        }
        Ok(())
    }

    fn label_encoding(&self, graph: &Graph) -> Result<LabelEncoding> {
        if graph.node_type_count() < 2 {
            return Err(Error::InvalidParameter {
                name: "graph",
                reason: format!(
                    "node-label prediction needs at least two node types, `{}` has {}",
                    graph.name(),
                    graph.node_type_count()
                ),
            });
        }
        Ok(if graph.has_multilabel_node_types() {
            LabelEncoding::MultiLabel
        } else if graph.node_type_count() == 2 {
            LabelEncoding::Binary
        } else {
            LabelEncoding::MultiClass
        })
    }

    fn train_size(&self, graph: &Graph, split: &HoldoutSplit) -> f64 {
        let known = graph.known_node_types_count();
        if known == 0 {
            return 0.0;
        }
        split.train.known_node_types_count() as f64 / known as f64
    }

    fn examples(&self, ctx: &TaskContext<'_>, mode: EvaluationMode, encoding: LabelEncoding) -> Result<Examples> {
        let x = ctx.node_features.as_ref().ok_or_else(|| {
            Error::InvalidFeatures("node-label prediction needs node features".to_string())
        })?;

        // Scored nodes come from the evaluation graph's mask; their labels from the full graph.
        let nodes: Vec<usize> = ctx
            .evaluation_graph(mode)
            .known_node_types_mask()
            .iter()
            .enumerate()
            .filter(|(_, &known)| known)
            .map(|(node, _)| node)
            .collect();
        let types: Vec<&[usize]> = nodes
            .iter()
            .map(|&node| ctx.graph.node_types(node).unwrap_or_default())
            .collect();

        let labels = match encoding {
            LabelEncoding::Binary => Labels::Binary(types.iter().map(|t| t.contains(&1)).collect()),
            LabelEncoding::MultiClass => Labels::Classes {
                ids: types.iter().map(|t| t.first().copied().unwrap_or(0)).collect::<Array1<_>>(),
                num_classes: ctx.graph.node_type_count(),
            },
            LabelEncoding::MultiLabel => Labels::OneHot(Array2::from_shape_fn(
                (nodes.len(), ctx.graph.node_type_count()),
                |(i, t)| types[i].contains(&t),
            )),
        };

        Ok(Examples {
            features: x.select(Axis(0), &nodes),
            labels,
        })
    }
}
