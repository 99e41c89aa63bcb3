//! Negative edge sampling for edge prediction.

use crate::{Error, Graph, NodeId, Result};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use std::collections::HashSet;

/// Sample `count` distinct edges that do not exist.
///
/// Returns a graph with the same nodes as `graph` whose edges are the sampled
/// negatives. A candidate `(src, dst)` is rejected when it is a self loop,
/// was already drawn, or exists in `graph` or `avoid`. With
/// `heterogeneous_only`, endpoints must also have different node type sets
/// (useful for bipartite tasks).
///
/// `avoid` must share node ids with `graph` (i.e. derive from the same root).
///
/// # Errors
///
/// `InvalidParameter` when fewer than `count` negatives could be found, which
/// happens for graphs that are too small or too dense.
pub fn sample_negative_edges(
    graph: &Graph,
    count: usize,
    seed: u64,
    avoid: &Graph,
    heterogeneous_only: bool,
) -> Result<Graph> {
    let n = graph.node_count();
    if count == 0 {
        return Ok(graph.with_new_edges(&[]));
    }
    if n < 2 {
        return Err(Error::InvalidParameter {
            name: "count",
            reason: format!("cannot sample negative edges in a graph with {n} nodes"),
        });
    }

    let mut rng = XorShiftRng::seed_from_u64(seed);
    let max_attempts = count.saturating_mul(100).max(10_000);
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::with_capacity(count);
    let mut pairs = Vec::with_capacity(count);
    let mut attempts = 0usize;

    while pairs.len() < count {
        if attempts >= max_attempts {
            return Err(Error::InvalidParameter {
                name: "count",
                reason: format!(
                    "only {} of {} negative edges found in `{}` after {} attempts; the graph is too dense",
                    pairs.len(),
                    count,
                    graph.name(),
                    attempts
                ),
            });
        }
        attempts += 1;

        let src = rng.random_range(0..n);
        let dst = rng.random_range(0..n);
        if src == dst {
            continue;
        }
        let key = if graph.is_directed() {
            (src, dst)
        } else {
            (src.min(dst), src.max(dst))
        };
        if seen.contains(&key) || graph.has_edge(src, dst) || avoid.has_edge(src, dst) {
            continue;
        }
        if heterogeneous_only && graph.node_types(src) == graph.node_types(dst) {
            continue;
        }
        seen.insert(key);
        pairs.push(key);
    }

    Ok(graph.with_new_edges(&pairs))
}
