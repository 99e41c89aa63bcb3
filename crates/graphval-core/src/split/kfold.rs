//! K-fold splits.
//!
//! A single seeded shuffle defines the fold assignment, so calling [`kfold`]
//! with the same seed for every `k_index in 0..k` yields test sets that are
//! pairwise disjoint and together cover every example exactly once. Changing
//! the seed between folds would break that partition.

use super::{examples, group_by_stratum, materialize, Example, SplitTarget};
use crate::{Error, Graph, Result};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;

/// Split `graph` into (train, test) where test is fold `k_index` of `k`.
///
/// Plain k-fold shuffles once and cuts contiguous folds (the first
/// `n % k` folds get one extra example). Stratified k-fold shuffles each
/// stratum, concatenates strata in order, and deals examples round-robin.
///
/// # Errors
///
/// - `InvalidParameter` if `k < 2` or `k` exceeds the number of examples
/// - `InvalidHoldoutIndex` if `k_index >= k`
/// - `MissingLabels` if the target has no examples
pub fn kfold(
    graph: &Graph,
    target: SplitTarget,
    k: usize,
    k_index: usize,
    stratify: bool,
    seed: u64,
) -> Result<(Graph, Graph)> {
    if k < 2 {
        return Err(Error::InvalidParameter {
            name: "k",
            reason: format!("k must be at least 2, got {k}"),
        });
    }
    if k_index >= k {
        return Err(Error::InvalidHoldoutIndex { index: k_index, k });
    }

    let examples = examples(graph, target)?;
    if k > examples.len() {
        return Err(Error::InvalidParameter {
            name: "k",
            reason: format!(
                "k = {k} exceeds the {} available examples in `{}`",
                examples.len(),
                graph.name()
            ),
        });
    }

    let folds = fold_assignment(&examples, k, stratify, seed);
    let (test, train): (Vec<(usize, usize)>, Vec<(usize, usize)>) =
        folds.into_iter().partition(|&(_, fold)| fold == k_index);
    let train: Vec<usize> = train.into_iter().map(|(pos, _)| pos).collect();
    let test: Vec<usize> = test.into_iter().map(|(pos, _)| pos).collect();

    log::debug!(
        "fold {}/{} of `{}` ({:?}, stratify={}, seed={}): {} train / {} test",
        k_index,
        k,
        graph.name(),
        target,
        stratify,
        seed,
        train.len(),
        test.len()
    );

    Ok(materialize(graph, target, &train, &test))
}

/// Assign every example position to a fold. Returns `(position, fold)` pairs.
pub(crate) fn fold_assignment(
    examples: &[Example],
    k: usize,
    stratify: bool,
    seed: u64,
) -> Vec<(usize, usize)> {
    let mut rng = XorShiftRng::seed_from_u64(seed);

    if stratify {
        let mut ordered = Vec::with_capacity(examples.len());
        for (_, mut group) in group_by_stratum(examples) {
            group.shuffle(&mut rng);
            ordered.extend(group);
        }
        return ordered
            .into_iter()
            .enumerate()
            .map(|(i, pos)| (pos, i % k))
            .collect();
    }

    let mut positions: Vec<usize> = examples.iter().map(|e| e.position).collect();
    positions.shuffle(&mut rng);

    let n = positions.len();
    let fold_size = n / k;
    let remainder = n % k;

    let mut out = Vec::with_capacity(n);
    let mut start = 0;
    for fold in 0..k {
        let size = fold_size + usize::from(fold < remainder);
        out.extend(positions[start..start + size].iter().map(|&pos| (pos, fold)));
        start += size;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labelled_nodes(n: usize) -> Graph {
        let mut g = Graph::new("nodes", false);
        for i in 0..n {
            g.add_node(&format!("n{i}"), [format!("t{}", i % 3)]);
        }
        g
    }

    fn test_nodes(g: &Graph) -> HashSet<usize> {
        g.known_node_types_mask()
            .iter()
            .enumerate()
            .filter(|(_, &known)| known)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_five_folds_partition_hundred_nodes() {
        let g = labelled_nodes(100);
        let mut seen = HashSet::new();
        for k_index in 0..5 {
            let (train, test) = kfold(&g, SplitTarget::NodeLabels, 5, k_index, false, 42).unwrap();
            let fold = test_nodes(&test);
            assert_eq!(fold.len(), 20);
            assert_eq!(train.known_node_types_count(), 80);
            assert!(seen.is_disjoint(&fold));
            seen.extend(fold);
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_stratified_folds_partition() {
        let g = labelled_nodes(30);
        let mut seen = HashSet::new();
        for k_index in 0..3 {
            let (_, test) = kfold(&g, SplitTarget::NodeLabels, 3, k_index, true, 9).unwrap();
            // 10 nodes per type, dealt round-robin: every type lands 3 or 4 times per fold
            let counts = test.node_type_counts();
            assert_eq!(counts.len(), 3);
            assert!(counts.values().all(|&c| c == 3 || c == 4));
            assert_eq!(counts.values().sum::<usize>(), 10);
            let fold = test_nodes(&test);
            assert!(seen.is_disjoint(&fold));
            seen.extend(fold);
        }
        assert_eq!(seen.len(), 30);
    }

    #[test]
    fn test_uneven_folds() {
        let g = labelled_nodes(11);
        let sizes: Vec<usize> = (0..3)
            .map(|i| {
                let (_, test) = kfold(&g, SplitTarget::NodeLabels, 3, i, false, 0).unwrap();
                test.known_node_types_count()
            })
            .collect();
        assert_eq!(sizes, vec![4, 4, 3]);
    }

    #[test]
    fn test_invalid_k_index() {
        let g = labelled_nodes(10);
        let err = kfold(&g, SplitTarget::NodeLabels, 5, 5, false, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidHoldoutIndex { index: 5, k: 5 }));
    }

    #[test]
    fn test_invalid_k() {
        let g = labelled_nodes(3);
        assert!(matches!(
            kfold(&g, SplitTarget::NodeLabels, 1, 0, false, 0),
            Err(Error::InvalidParameter { name: "k", .. })
        ));
        assert!(matches!(
            kfold(&g, SplitTarget::NodeLabels, 4, 0, false, 0),
            Err(Error::InvalidParameter { name: "k", .. })
        ));
    }
}
