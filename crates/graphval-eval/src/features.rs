//! Feature sources and edge embedding.
//!
//! | Kind | Rows | Indexed by |
//! |------|------|------------|
//! | node features | `graph.node_count()` | node id |
//! | node type features | `graph.node_type_count()` | node type id |
//! | edge features | `graph.edge_id_bound()` | root edge id |
//!
//! Several matrices of the same kind are concatenated column-wise. Computed
//! node features are extracted per holdout from the support graph (the train
//! graph when the split has none), so they never see test edges.

use crate::{Error, Result};
use graphval_core::{Graph, NodeId};
use ndarray::{concatenate, s, Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Computes a node feature matrix from a graph.
///
/// Implementations wrap embedding methods or topological statistics. The
/// returned matrix must have one row per node of `graph`.
pub trait NodeFeatureExtractor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Compute features for every node of `graph`.
    fn extract(&self, graph: &Graph) -> Result<Array2<f64>>;
}

/// Single-column node degree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDegree;

impl NodeFeatureExtractor for NodeDegree {
    fn name(&self) -> &str {
        "node_degree"
    }

    fn extract(&self, graph: &Graph) -> Result<Array2<f64>> {
        Ok(Array2::from_shape_fn((graph.node_count(), 1), |(node, _)| {
            graph.degree(node) as f64
        }))
    }
}

/// Where a node feature matrix comes from.
#[derive(Clone)]
pub enum FeatureSource {
    /// A matrix computed ahead of time.
    Precomputed(Array2<f64>),
    /// Computed per holdout on the support graph.
    Computed(Arc<dyn NodeFeatureExtractor>),
}

impl fmt::Debug for FeatureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precomputed(m) => f.debug_tuple("Precomputed").field(&m.dim()).finish(),
            Self::Computed(e) => f.debug_tuple("Computed").field(&e.name()).finish(),
        }
    }
}

impl From<Array2<f64>> for FeatureSource {
    fn from(matrix: Array2<f64>) -> Self {
        Self::Precomputed(matrix)
    }
}

impl FeatureSource {
    /// Wrap an extractor.
    pub fn computed(extractor: impl NodeFeatureExtractor + 'static) -> Self {
        Self::Computed(Arc::new(extractor))
    }

    fn resolve(&self, support: &Graph) -> Result<Array2<f64>> {
        match self {
            Self::Precomputed(m) => Ok(m.clone()),
            Self::Computed(extractor) => {
                log::debug!("extracting `{}` on `{}`", extractor.name(), support.name());
                extractor.extract(support)
            }
        }
    }
}

/// Kinds of features a task may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Per-node features.
    NodeFeatures,
    /// Per-node-type features.
    NodeTypeFeatures,
    /// Per-edge features.
    EdgeFeatures,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NodeFeatures => "node features",
            Self::NodeTypeFeatures => "node type features",
            Self::EdgeFeatures => "edge features",
        })
    }
}

/// All features handed to an evaluation.
#[derive(Debug, Clone, Default)]
pub struct FeatureSources {
    /// Node feature sources.
    pub node_features: Vec<FeatureSource>,
    /// Node type feature matrices.
    pub node_type_features: Vec<Array2<f64>>,
    /// Edge feature matrices.
    pub edge_features: Vec<Array2<f64>>,
}

impl FeatureSources {
    /// No features.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node feature source.
    pub fn with_node_features(mut self, source: impl Into<FeatureSource>) -> Self {
        self.node_features.push(source.into());
        self
    }

    /// Add a node type feature matrix.
    pub fn with_node_type_features(mut self, matrix: Array2<f64>) -> Self {
        self.node_type_features.push(matrix);
        self
    }

    /// Add an edge feature matrix.
    pub fn with_edge_features(mut self, matrix: Array2<f64>) -> Self {
        self.edge_features.push(matrix);
        self
    }

    /// Kinds present, in [`FeatureKind`] order.
    pub fn kinds(&self) -> Vec<FeatureKind> {
        let mut kinds = Vec::new();
        if !self.node_features.is_empty() {
            kinds.push(FeatureKind::NodeFeatures);
        }
        if !self.node_type_features.is_empty() {
            kinds.push(FeatureKind::NodeTypeFeatures);
        }
        if !self.edge_features.is_empty() {
            kinds.push(FeatureKind::EdgeFeatures);
        }
        kinds
    }

    /// Whether no feature of any kind is given.
    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }

    /// Concatenated node features, computed on `support`.
    pub fn resolve_node_features(&self, support: &Graph) -> Result<Option<Array2<f64>>> {
        let matrices = self
            .node_features
            .iter()
            .map(|source| source.resolve(support))
            .collect::<Result<Vec<_>>>()?;
        stack(&matrices, support.node_count(), FeatureKind::NodeFeatures)
    }

    /// Concatenated node type features.
    pub fn resolve_node_type_features(&self, graph: &Graph) -> Result<Option<Array2<f64>>> {
        stack(&self.node_type_features, graph.node_type_count(), FeatureKind::NodeTypeFeatures)
    }

    /// Concatenated edge features.
    pub fn resolve_edge_features(&self, graph: &Graph) -> Result<Option<Array2<f64>>> {
        stack(&self.edge_features, graph.edge_id_bound(), FeatureKind::EdgeFeatures)
    }
}

fn stack(matrices: &[Array2<f64>], rows: usize, kind: FeatureKind) -> Result<Option<Array2<f64>>> {
    if matrices.is_empty() {
        return Ok(None);
    }
    for (i, m) in matrices.iter().enumerate() {
        if m.nrows() != rows {
            return Err(Error::InvalidFeatures(format!(
                "{} #{} has {} rows but the graph requires {}",
                kind,
                i,
                m.nrows(),
                rows
            )));
        }
        if m.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidFeatures(format!("{kind} #{i} contains non-finite values")));
        }
    }
    let views: Vec<ArrayView2<f64>> = matrices.iter().map(|m| m.view()).collect();
    concatenate(Axis(1), &views)
        .map(Some)
        .map_err(|e| Error::InvalidFeatures(e.to_string()))
}

/// How two node vectors combine into one edge vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEmbeddingMethod {
    /// Element-wise product.
    #[default]
    Hadamard,
    /// Element-wise mean.
    Average,
    /// Element-wise absolute difference.
    WeightedL1,
    /// Element-wise squared difference.
    WeightedL2,
    /// Source vector followed by destination vector.
    Concatenate,
}

impl EdgeEmbeddingMethod {
    /// Output width for node vectors of width `dim`.
    pub fn output_dim(self, dim: usize) -> usize {
        match self {
            Self::Concatenate => 2 * dim,
            _ => dim,
        }
    }

    /// Write the edge vector of `(src, dst)` into `out`.
    pub fn embed_into(self, src: ArrayView1<f64>, dst: ArrayView1<f64>, mut out: ArrayViewMut1<f64>) {
        let dim = src.len();
        match self {
            Self::Concatenate => {
                out.slice_mut(s![..dim]).assign(&src);
                out.slice_mut(s![dim..]).assign(&dst);
            }
            Self::Hadamard => out.assign(&(&src * &dst)),
            Self::Average => out.assign(&((&src + &dst) / 2.0)),
            Self::WeightedL1 => out.assign(&(&src - &dst).mapv(f64::abs)),
            Self::WeightedL2 => out.assign(&(&src - &dst).mapv(|v| v * v)),
        }
    }

    /// Edge vectors for `pairs`, one row per pair.
    pub fn embed(self, node_features: ArrayView2<f64>, pairs: &[(NodeId, NodeId)]) -> Array2<f64> {
        let dim = node_features.ncols();
        let mut out = Array2::zeros((pairs.len(), self.output_dim(dim)));
        for (row, &(src, dst)) in out.axis_iter_mut(Axis(0)).zip(pairs) {
            self.embed_into(node_features.row(src), node_features.row(dst), row);
        }
        out
    }
}

/// Per-node mean of the node's type rows; nodes with unknown type get zeros.
pub fn node_type_features_per_node(graph: &Graph, type_features: ArrayView2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((graph.node_count(), type_features.ncols()));
    for (node, mut row) in out.axis_iter_mut(Axis(0)).enumerate() {
        if let Some(types) = graph.node_types(node) {
            for &t in types {
                row += &type_features.row(t);
            }
            row /= types.len() as f64;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_edge_embedding_methods() {
        let x = array![[1.0, 2.0], [3.0, -1.0]];
        let pairs = [(0, 1)];
        assert_eq!(EdgeEmbeddingMethod::Hadamard.embed(x.view(), &pairs), array![[3.0, -2.0]]);
        assert_eq!(EdgeEmbeddingMethod::Average.embed(x.view(), &pairs), array![[2.0, 0.5]]);
        assert_eq!(EdgeEmbeddingMethod::WeightedL1.embed(x.view(), &pairs), array![[2.0, 3.0]]);
        assert_eq!(EdgeEmbeddingMethod::WeightedL2.embed(x.view(), &pairs), array![[4.0, 9.0]]);
        assert_eq!(
            EdgeEmbeddingMethod::Concatenate.embed(x.view(), &pairs),
            array![[1.0, 2.0, 3.0, -1.0]]
        );
    }

    #[test]
    fn test_node_degree_on_support() {
        let mut g = Graph::new("star", false);
        g.add_edge("hub", "a", None, 1.0);
        g.add_edge("hub", "b", None, 1.0);
        let sources = FeatureSources::new().with_node_features(FeatureSource::computed(NodeDegree));
        let x = sources.resolve_node_features(&g).unwrap().unwrap();
        assert_eq!(x, array![[2.0], [1.0], [1.0]]);
    }

    #[test]
    fn test_stack_checks_rows() {
        let mut g = Graph::new("g", false);
        g.add_edge("a", "b", None, 1.0);
        let sources = FeatureSources::new()
            .with_node_features(array![[1.0], [2.0]])
            .with_node_features(array![[3.0, 4.0], [5.0, 6.0]]);
        let x = sources.resolve_node_features(&g).unwrap().unwrap();
        assert_eq!(x.dim(), (2, 3));

        let bad = FeatureSources::new().with_node_features(array![[1.0]]);
        assert!(matches!(bad.resolve_node_features(&g), Err(Error::InvalidFeatures(_))));

        let nan = FeatureSources::new().with_node_features(array![[1.0], [f64::NAN]]);
        assert!(matches!(nan.resolve_node_features(&g), Err(Error::InvalidFeatures(_))));
    }

    #[test]
    fn test_kinds() {
        let sources = FeatureSources::new().with_edge_features(Array2::zeros((1, 1)));
        assert_eq!(sources.kinds(), vec![FeatureKind::EdgeFeatures]);
        assert!(FeatureSources::new().is_empty());
    }

    #[test]
    fn test_node_type_features_per_node() {
        let mut g = Graph::new("typed", false);
        g.add_node("a", ["x"]);
        g.add_node("b", ["x", "y"]);
        g.add_node("c", Vec::<&str>::new());
        let types = array![[1.0, 0.0], [0.0, 1.0]];
        let per_node = node_type_features_per_node(&g, types.view());
        assert_eq!(per_node, array![[1.0, 0.0], [0.5, 0.5], [0.0, 0.0]]);
    }
}
