//! Property-based tests for the split primitives.
//!
//! - K-fold test sets partition the examples
//! - Holdouts are seed-deterministic and sized by `train_size`, stratified or not
//! - Negative edges never collide with existing edges

use graphval_core::{kfold, random_holdout, sample_negative_edges, Graph, HoldoutParams, SplitTarget};
use proptest::prelude::*;
use std::collections::HashSet;

fn labelled_nodes(n: usize, types: usize) -> Graph {
    let mut g = Graph::new("nodes", false);
    for i in 0..n {
        g.add_node(&format!("n{i}"), [format!("t{}", i % types)]);
    }
    g
}

fn chain(n: usize) -> Graph {
    let mut g = Graph::new("chain", false);
    for i in 0..n {
        g.add_edge(&format!("n{i}"), &format!("n{}", i + 1), None, 1.0);
    }
    g
}

fn known_nodes(g: &Graph) -> HashSet<usize> {
    g.known_node_types_mask()
        .iter()
        .enumerate()
        .filter(|(_, &known)| known)
        .map(|(i, _)| i)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn kfold_test_sets_partition_examples(
        n in 10usize..80,
        k in 2usize..8,
        types in 1usize..4,
        stratify in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let g = labelled_nodes(n, types);
        let mut seen = HashSet::new();
        for k_index in 0..k {
            let (train, test) = kfold(&g, SplitTarget::NodeLabels, k, k_index, stratify, seed).unwrap();
            let fold = known_nodes(&test);
            prop_assert!(!fold.is_empty());
            prop_assert!(seen.is_disjoint(&fold));
            prop_assert_eq!(train.known_node_types_count() + fold.len(), n);
            seen.extend(fold);
        }
        prop_assert_eq!(seen.len(), n);
    }

    #[test]
    fn holdout_sizes_follow_train_size(
        n in 10usize..200,
        train_size in 0.1f64..0.9,
        seed in any::<u64>(),
    ) {
        let g = chain(n);
        let params = HoldoutParams::default().with_train_size(train_size);
        let (train, test) = random_holdout(&g, SplitTarget::Edges, &params, false, seed).unwrap();
        let expected = (n as f64 * train_size).round() as usize;
        prop_assert_eq!(train.edge_count(), expected);
        prop_assert_eq!(train.edge_count() + test.edge_count(), n);
    }

    #[test]
    fn stratified_holdout_honors_train_size(
        classes in 1usize..12,
        per_class in 1usize..6,
        train_size in 0.1f64..0.9,
        seed in any::<u64>(),
    ) {
        let n = classes * per_class;
        let g = labelled_nodes(n, classes);
        let params = HoldoutParams::default().with_train_size(train_size);
        let expected = (n as f64 * train_size).round() as usize;
        prop_assume!(expected > 0 && expected < n);

        let (train, test) = random_holdout(&g, SplitTarget::NodeLabels, &params, true, seed).unwrap();
        prop_assert_eq!(train.known_node_types_count(), expected);
        prop_assert_eq!(test.known_node_types_count(), n - expected);
    }

    #[test]
    fn holdout_is_seed_deterministic(n in 10usize..100, seed in any::<u64>()) {
        let g = chain(n);
        let params = HoldoutParams::default();
        let ids = |g: &Graph| g.edges().map(|(_, _, e)| e.id).collect::<Vec<_>>();
        let (a, _) = random_holdout(&g, SplitTarget::Edges, &params, false, seed).unwrap();
        let (b, _) = random_holdout(&g, SplitTarget::Edges, &params, false, seed).unwrap();
        prop_assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn negatives_never_exist(n in 10usize..60, count in 1usize..20, seed in any::<u64>()) {
        let g = chain(n);
        let neg = sample_negative_edges(&g, count, seed, &g, false).unwrap();
        prop_assert_eq!(neg.edge_count(), count);
        for (src, dst, _) in neg.edges() {
            prop_assert!(src != dst);
            prop_assert!(!g.has_edge(src, dst));
        }
    }
}
