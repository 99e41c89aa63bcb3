use super::{edge_train_size, hstack, pair_features, Examples, PredictionTask, TaskContext};
use crate::features::{EdgeEmbeddingMethod, FeatureKind};
use crate::record::EvaluationMode;
use crate::{Error, Result};
use graphval_core::{Graph, HoldoutSplit, SplitTarget};
use graphval_models::{LabelEncoding, Labels};
use ndarray::{Array1, Axis};

/// Predict edge types from node features (combined per edge) and edge features.
///
/// Binary when the graph has exactly two edge types (positive class: edge
/// type id 1), multiclass otherwise. Only edges with a known type in the
/// evaluation graph are scored.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeLabelPrediction {
    method: EdgeEmbeddingMethod,
}

impl EdgeLabelPrediction {
    /// Create the task with the default (Hadamard) edge embedding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how node features combine into edge features.
    pub fn with_edge_embedding(mut self, method: EdgeEmbeddingMethod) -> Self {
        self.method = method;
        self
    }

    /// The edge embedding method.
    pub fn edge_embedding(&self) -> EdgeEmbeddingMethod {
        self.method
    }
}

impl PredictionTask for EdgeLabelPrediction {
    fn name(&self) -> &'static str {
        "Edge Label Prediction"
    }

    fn split_target(&self) -> SplitTarget {
        SplitTarget::EdgeLabels
    }

    fn examples_column(&self) -> &'static str {
        "known_edges_number"
    }

    fn supported_features(&self) -> &'static [FeatureKind] {
        &[FeatureKind::NodeFeatures, FeatureKind::EdgeFeatures]
    }

    fn label_encoding(&self, graph: &Graph) -> Result<LabelEncoding> {
        match graph.edge_type_count() {
            0 | 1 => Err(Error::InvalidParameter {
                name: "graph",
                reason: format!(
                    "edge-label prediction needs at least two edge types, `{}` has {}",
                    graph.name(),
                    graph.edge_type_count()
                ),
            }),
            2 => Ok(LabelEncoding::Binary),
            _ => Ok(LabelEncoding::MultiClass),
        }
    }

    fn train_size(&self, graph: &Graph, split: &HoldoutSplit) -> f64 {
        edge_train_size(graph, split)
    }

    fn examples(&self, ctx: &TaskContext<'_>, mode: EvaluationMode, encoding: LabelEncoding) -> Result<Examples> {
        let mut pairs = Vec::new();
        let mut edge_ids = Vec::new();
        let mut types = Vec::new();
        for (src, dst, edge) in ctx.evaluation_graph(mode).edges() {
            if let Some(t) = edge.edge_type {
                pairs.push((src, dst));
                edge_ids.push(edge.id);
                types.push(t);
            }
        }

        let mut blocks = pair_features(ctx, self.method, &pairs);
        if let Some(edge_features) = &ctx.edge_features {
            blocks.push(edge_features.select(Axis(0), &edge_ids));
        }
        let features = hstack(&blocks, pairs.len())?;

        let labels = match encoding {
            LabelEncoding::Binary => Labels::Binary(types.iter().map(|&t| t == 1).collect()),
            LabelEncoding::MultiClass => Labels::Classes {
                ids: Array1::from(types),
                num_classes: ctx.graph.edge_type_count(),
            },
            LabelEncoding::MultiLabel => {
                return Err(Error::InvalidParameter {
                    name: "encoding",
                    reason: "edges carry a single type; multilabel encoding is not available".to_string(),
                })
            }
        };

        Ok(Examples { features, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSources;
    use graphval_core::{HoldoutParams, InMemoryEngine, SplitEngine};
    use ndarray::{array, Array2};

    fn labelled() -> Graph {
        let mut g = Graph::new("labelled", true);
        for i in 0..10 {
            let ty = if i % 2 == 0 { "likes" } else { "knows" };
            g.add_edge(&format!("n{i}"), &format!("n{}", i + 1), Some(ty), 1.0);
        }
        g.add_edge("n0", "n5", None, 1.0);
        g
    }

    #[test]
    fn test_rejects_node_type_features() {
        let features = FeatureSources::new()
            .with_node_features(array![[1.0]])
            .with_node_type_features(array![[1.0]]);
        assert!(matches!(
            EdgeLabelPrediction::new().check_features(&features),
            Err(Error::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_examples_use_edge_ids() {
        let g = labelled();
        let split = InMemoryEngine
            .random_holdout(&g, SplitTarget::EdgeLabels, &HoldoutParams::default(), true, 1)
            .unwrap();
        let edge_features = Array2::from_shape_fn((g.edge_id_bound(), 1), |(id, _)| id as f64);
        let features = FeatureSources::new()
            .with_node_features(Array2::ones((g.node_count(), 2)))
            .with_edge_features(edge_features);
        let ctx = TaskContext::new(&InMemoryEngine, &g, &split, &features, 1, 0).unwrap();

        let task = EdgeLabelPrediction::new().with_edge_embedding(EdgeEmbeddingMethod::Concatenate);
        let encoding = task.label_encoding(&g).unwrap();
        assert_eq!(encoding, LabelEncoding::Binary);

        let train = task.examples(&ctx, EvaluationMode::Train, encoding).unwrap();
        // untyped edge stays in train but is not scored
        assert_eq!(split.train.edge_count(), 9);
        assert_eq!(train.len(), 8);
        assert_eq!(train.features.ncols(), 5);

        let test = task.examples(&ctx, EvaluationMode::Test, encoding).unwrap();
        assert_eq!(test.len(), 2);
        let Labels::Binary(labels) = &test.labels else {
            panic!("expected binary labels");
        };
        for (row, &label) in test.features.rows().into_iter().zip(labels) {
            // edge id parity decides the type: even ids are "likes" (0), odd are "knows" (1)
            assert_eq!(label, row[4] as usize % 2 == 1);
        }
        assert!((task.train_size(&g, &split) - 9.0 / 11.0).abs() < 1e-12);
    }
}
