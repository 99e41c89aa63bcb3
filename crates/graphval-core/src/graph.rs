use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Dense node identifier, stable across every subgraph derived from the same root.
pub type NodeId = usize;

/// Edge identifier assigned by the root graph; survives subgraph extraction.
pub type EdgeId = usize;

/// Index into a node-type or edge-type vocabulary.
pub type TypeId = usize;

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique node name.
    pub name: String,
    /// Sorted, deduplicated node types. `None` when the type is unknown.
    pub types: Option<Vec<TypeId>>,
}

/// Edge payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Root edge id.
    pub id: EdgeId,
    /// Edge type, `None` when unknown.
    pub edge_type: Option<TypeId>,
    /// Edge weight (1.0 when not given).
    pub weight: f32,
}

/// A typed multigraph with known/unknown label masks.
///
/// Built on petgraph's `DiGraph`. Undirected graphs store each edge once and
/// answer [`Graph::has_edge`] in both directions.
///
/// Subgraphs produced by the split primitives keep the full node set in the
/// same order, so a [`NodeId`] means the same node in the root graph and in
/// every train/test graph derived from it.
///
/// # Example
///
/// ```rust
/// use graphval_core::Graph;
///
/// let mut g = Graph::new("toy", false);
/// g.add_node("alice", ["person"]);
/// g.add_node("acme", ["company"]);
/// g.add_edge("alice", "acme", Some("works_at"), 1.0);
///
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1);
/// assert_eq!(g.known_node_types_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    directed: bool,
    graph: DiGraph<Node, Edge>,
    node_index: HashMap<String, NodeIndex>,
    node_type_names: Vec<String>,
    node_type_index: HashMap<String, TypeId>,
    edge_type_names: Vec<String>,
    edge_type_index: HashMap<String, TypeId>,
    /// Upper bound (exclusive) on edge ids, i.e. the root graph's edge count.
    edge_id_bound: EdgeId,
}

impl Graph {
    /// Create an empty graph.
    pub fn new(name: impl Into<String>, directed: bool) -> Self {
        Self {
            name: name.into(),
            directed,
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            node_type_names: Vec::new(),
            node_type_index: HashMap::new(),
            edge_type_names: Vec::new(),
            edge_type_index: HashMap::new(),
            edge_id_bound: 0,
        }
    }

    /// Graph name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether edges are directed.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add a node (or extend an existing node's types).
    ///
    /// An empty `types` iterator leaves the node type unknown.
    pub fn add_node<I, S>(&mut self, name: &str, types: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let idx = self.get_or_create_node(name);
        let mut ids: Vec<TypeId> = types
            .into_iter()
            .map(|t| intern(&mut self.node_type_names, &mut self.node_type_index, t.as_ref()))
            .collect();

        if !ids.is_empty() {
            let node = &mut self.graph[idx];
            if let Some(existing) = node.types.take() {
                ids.extend(existing);
            }
            ids.sort_unstable();
            ids.dedup();
            node.types = Some(ids);
        }

        idx.index()
    }

    /// Add an edge, creating missing endpoints with unknown node type.
    pub fn add_edge(&mut self, src: &str, dst: &str, edge_type: Option<&str>, weight: f32) -> EdgeId {
        let src_idx = self.get_or_create_node(src);
        let dst_idx = self.get_or_create_node(dst);
        let edge_type =
            edge_type.map(|t| intern(&mut self.edge_type_names, &mut self.edge_type_index, t));

        let id = self.edge_id_bound;
        self.graph.add_edge(
            src_idx,
            dst_idx,
            Edge {
                id,
                edge_type,
                weight,
            },
        );
        self.edge_id_bound += 1;
        id
    }

    fn get_or_create_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(Node {
            name: name.to_string(),
            types: None,
        });
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    // =========================================================================
    // Counts and vocabularies
    // =========================================================================

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Exclusive upper bound on edge ids (the root graph's edge count).
    ///
    /// Edge feature matrices are indexed by edge id and need this many rows.
    pub fn edge_id_bound(&self) -> usize {
        self.edge_id_bound
    }

    /// Look up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).map(|idx| idx.index())
    }

    /// Name of a node.
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(node))
            .map(|n| n.name.as_str())
    }

    /// Known types of a node, `None` when unknown or out of range.
    pub fn node_types(&self, node: NodeId) -> Option<&[TypeId]> {
        self.graph
            .node_weight(NodeIndex::new(node))
            .and_then(|n| n.types.as_deref())
    }

    /// Node type vocabulary in first-seen order.
    pub fn node_type_names(&self) -> &[String] {
        &self.node_type_names
    }

    /// Number of distinct node types.
    pub fn node_type_count(&self) -> usize {
        self.node_type_names.len()
    }

    /// Edge type vocabulary in first-seen order.
    pub fn edge_type_names(&self) -> &[String] {
        &self.edge_type_names
    }

    /// Number of distinct edge types.
    pub fn edge_type_count(&self) -> usize {
        self.edge_type_names.len()
    }

    // =========================================================================
    // Known-label masks
    // =========================================================================

    /// Number of nodes with a known type.
    pub fn known_node_types_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|n| n.types.is_some())
            .count()
    }

    /// Per-node mask, `true` where the node type is known.
    pub fn known_node_types_mask(&self) -> Vec<bool> {
        self.graph
            .node_weights()
            .map(|n| n.types.is_some())
            .collect()
    }

    /// Whether any node carries more than one type.
    pub fn has_multilabel_node_types(&self) -> bool {
        self.graph
            .node_weights()
            .any(|n| n.types.as_ref().is_some_and(|t| t.len() > 1))
    }

    /// Occurrences of each node type among nodes with known type.
    pub fn node_type_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for node in self.graph.node_weights() {
            for &t in node.types.iter().flatten() {
                *counts.entry(self.node_type_names[t].as_str()).or_default() += 1;
            }
        }
        counts
    }

    /// Number of edges with a known type.
    pub fn known_edge_types_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|e| e.edge_type.is_some())
            .count()
    }

    /// Per-edge mask in [`Graph::edges`] order, `true` where the edge type is known.
    pub fn known_edge_types_mask(&self) -> Vec<bool> {
        self.graph
            .edge_weights()
            .map(|e| e.edge_type.is_some())
            .collect()
    }

    /// Occurrences of each edge type.
    pub fn edge_type_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in self.graph.edge_weights() {
            if let Some(t) = edge.edge_type {
                *counts.entry(self.edge_type_names[t].as_str()).or_default() += 1;
            }
        }
        counts
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Iterate `(src, dst, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &Edge)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }

    /// Whether an edge `src -> dst` exists (either direction when undirected). O(d).
    pub fn has_edge(&self, src: NodeId, dst: NodeId) -> bool {
        if src >= self.node_count() || dst >= self.node_count() {
            return false;
        }
        let (a, b) = (NodeIndex::new(src), NodeIndex::new(dst));
        if self.graph.find_edge(a, b).is_some() {
            return true;
        }
        !self.directed && self.graph.find_edge(b, a).is_some()
    }

    /// Total degree (in + out). O(d).
    pub fn degree(&self, node: NodeId) -> usize {
        if node >= self.node_count() {
            return 0;
        }
        let idx = NodeIndex::new(node);
        self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    // =========================================================================
    // Subgraph extraction (used by the split primitives)
    // =========================================================================

    /// Copy with node types kept only where `keep[node]` is true.
    pub(crate) fn with_node_types_kept(&self, keep: &[bool]) -> Self {
        let mut out = self.clone();
        for (idx, node) in out.graph.node_weights_mut().enumerate() {
            if !keep.get(idx).copied().unwrap_or(false) {
                node.types = None;
            }
        }
        out
    }

    /// Same nodes, only the edges at the given positions of [`Graph::edges`].
    ///
    /// Positions are applied in ascending order so the subgraph preserves the
    /// root's edge order.
    pub(crate) fn with_edges(&self, positions: &[usize]) -> Self {
        let all: Vec<_> = self.graph.edge_references().collect();
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut graph = self.empty_topology(sorted.len());
        for pos in sorted {
            if let Some(e) = all.get(pos) {
                graph.add_edge(e.source(), e.target(), e.weight().clone());
            }
        }

        Self {
            graph,
            ..self.clone_metadata()
        }
    }

    /// Same nodes, with a fresh set of untyped unit-weight edges.
    pub(crate) fn with_new_edges(&self, pairs: &[(NodeId, NodeId)]) -> Self {
        let mut graph = self.empty_topology(pairs.len());
        for (id, &(src, dst)) in pairs.iter().enumerate() {
            graph.add_edge(
                NodeIndex::new(src),
                NodeIndex::new(dst),
                Edge {
                    id,
                    edge_type: None,
                    weight: 1.0,
                },
            );
        }

        Self {
            graph,
            edge_id_bound: pairs.len(),
            ..self.clone_metadata()
        }
    }

    fn empty_topology(&self, edges: usize) -> DiGraph<Node, Edge> {
        let mut graph = DiGraph::with_capacity(self.node_count(), edges);
        for node in self.graph.node_weights() {
            graph.add_node(node.clone());
        }
        graph
    }

    fn clone_metadata(&self) -> Self {
        Self {
            name: self.name.clone(),
            directed: self.directed,
            graph: DiGraph::new(),
            node_index: self.node_index.clone(),
            node_type_names: self.node_type_names.clone(),
            node_type_index: self.node_type_index.clone(),
            edge_type_names: self.edge_type_names.clone(),
            edge_type_index: self.edge_type_index.clone(),
            edge_id_bound: self.edge_id_bound,
        }
    }
}

fn intern(names: &mut Vec<String>, index: &mut HashMap<String, TypeId>, name: &str) -> TypeId {
    if let Some(&id) = index.get(name) {
        return id;
    }
    let id = names.len();
    names.push(name.to_string());
    index.insert(name.to_string(), id);
    id
}

/// Statistics about a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Distinct node types.
    pub node_type_count: usize,
    /// Distinct edge types.
    pub edge_type_count: usize,
    /// Nodes with a known type.
    pub known_node_types: usize,
    /// Edges with a known type.
    pub known_edge_types: usize,
    /// Whether edges are directed.
    pub directed: bool,
}

impl Graph {
    /// Compute statistics about the graph.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            node_type_count: self.node_type_count(),
            edge_type_count: self.edge_type_count(),
            known_node_types: self.known_node_types_count(),
            known_edge_types: self.known_edge_types_count(),
            directed: self.directed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Graph {
        let mut g = Graph::new("toy", false);
        g.add_node("a", ["x"]);
        g.add_node("b", ["y"]);
        g.add_node("c", Vec::<&str>::new());
        g.add_edge("a", "b", Some("r1"), 1.0);
        g.add_edge("b", "c", Some("r2"), 2.0);
        g.add_edge("c", "d", None, 1.0);
        g
    }

    #[test]
    fn test_counts() {
        let g = toy();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_id_bound(), 3);
        assert_eq!(g.node_type_count(), 2);
        assert_eq!(g.edge_type_count(), 2);
        assert_eq!(g.known_node_types_count(), 2);
        assert_eq!(g.known_edge_types_count(), 2);
    }

    #[test]
    fn test_masks() {
        let g = toy();
        assert_eq!(g.known_node_types_mask(), vec![true, true, false, false]);
        assert_eq!(g.known_edge_types_mask(), vec![true, true, false]);
    }

    #[test]
    fn test_add_node_merges_types() {
        let mut g = Graph::new("m", true);
        g.add_node("a", ["x"]);
        g.add_node("a", ["y", "x"]);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.node_types(0), Some(&[0, 1][..]));
        assert!(g.has_multilabel_node_types());
    }

    #[test]
    fn test_undirected_has_edge() {
        let g = toy();
        let (a, b) = (g.node_id("a").unwrap(), g.node_id("b").unwrap());
        assert!(g.has_edge(a, b));
        assert!(g.has_edge(b, a));
        assert!(!g.has_edge(a, a));
        assert!(!g.has_edge(a, 99));
    }

    #[test]
    fn test_directed_has_edge() {
        let mut g = Graph::new("d", true);
        g.add_edge("a", "b", None, 1.0);
        assert!(g.has_edge(0, 1));
        assert!(!g.has_edge(1, 0));
    }

    #[test]
    fn test_degree() {
        let g = toy();
        assert_eq!(g.degree(g.node_id("b").unwrap()), 2);
        assert_eq!(g.degree(g.node_id("d").unwrap()), 1);
    }

    #[test]
    fn test_with_edges_keeps_ids_and_nodes() {
        let g = toy();
        let sub = g.with_edges(&[2, 0]);
        assert_eq!(sub.node_count(), g.node_count());
        assert_eq!(sub.edge_count(), 2);
        let ids: Vec<EdgeId> = sub.edges().map(|(_, _, e)| e.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(sub.edge_id_bound(), 3);
    }

    #[test]
    fn test_with_node_types_kept() {
        let g = toy();
        let sub = g.with_node_types_kept(&[false, true, true, true]);
        assert_eq!(sub.known_node_types_count(), 1);
        assert_eq!(sub.node_types(1), Some(&[1][..]));
        assert_eq!(sub.edge_count(), g.edge_count());
    }

    #[test]
    fn test_type_counts() {
        let g = toy();
        let counts = g.node_type_counts();
        assert_eq!(counts.get("x"), Some(&1));
        assert_eq!(counts.get("y"), Some(&1));
        assert_eq!(g.edge_type_counts().len(), 2);
    }

    #[test]
    fn test_stats() {
        let stats = toy().stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.known_edge_types, 2);
        assert!(!stats.directed);
    }
}
