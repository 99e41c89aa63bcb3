//! Turn a split strategy and holdout index into one engine call.

use crate::schema::{SplitPrimitive, SplitStrategy};
use crate::{Error, Result};
use graphval_core::{Graph, HoldoutParams, HoldoutSplit, SplitEngine, SplitTarget};

/// Seed passed to the engine for `holdout_number`.
///
/// Random holdouts offset the seed by the holdout index so each holdout
/// draws a different split. K-fold reuses `random_state` for every fold:
/// the folds must come from the same shuffle to partition the examples.
pub fn holdout_seed(strategy: SplitStrategy, random_state: u64, holdout_number: usize) -> u64 {
    match strategy.primitive {
        SplitPrimitive::RandomHoldout => random_state.wrapping_add(holdout_number as u64),
        SplitPrimitive::Kfold => random_state,
    }
}

/// Produce the split for `holdout_number`.
///
/// `params` is forwarded to random holdouts unmodified and ignored by
/// k-fold, which uses `number_of_holdouts` as `k`.
///
/// # Errors
///
/// `InvalidHoldoutIndex` when `holdout_number >= number_of_holdouts`, before
/// the engine is called. Engine errors propagate unchanged.
#[allow(clippy::too_many_arguments)]
pub fn split<E: SplitEngine + ?Sized>(
    engine: &E,
    graph: &Graph,
    target: SplitTarget,
    strategy: SplitStrategy,
    number_of_holdouts: usize,
    random_state: u64,
    holdout_number: usize,
    params: &HoldoutParams,
) -> Result<HoldoutSplit> {
    if holdout_number >= number_of_holdouts {
        return Err(Error::InvalidHoldoutIndex {
            holdout_number,
            number_of_holdouts,
        });
    }

    let seed = holdout_seed(strategy, random_state, holdout_number);
    let split = match strategy.primitive {
        SplitPrimitive::RandomHoldout => {
            engine.random_holdout(graph, target, params, strategy.stratify, seed)?
        }
        SplitPrimitive::Kfold => engine.kfold(
            graph,
            target,
            number_of_holdouts,
            holdout_number,
            strategy.stratify,
            seed,
        )?,
    };
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EvaluationSchema;
    use graphval_core::InMemoryEngine;

    fn chain(n: usize) -> Graph {
        let mut g = Graph::new("chain", true);
        for i in 0..n {
            g.add_edge(&format!("n{i}"), &format!("n{}", i + 1), None, 1.0);
        }
        g
    }

    #[test]
    fn test_seeds() {
        let mc = EvaluationSchema::MonteCarlo.strategy();
        let kf = EvaluationSchema::Kfold.strategy();
        assert_eq!(holdout_seed(mc, 42, 0), 42);
        assert_eq!(holdout_seed(mc, 42, 2), 44);
        assert_eq!(holdout_seed(kf, 42, 2), 42);
        assert_eq!(holdout_seed(mc, u64::MAX, 1), 0);
    }

    #[test]
    fn test_index_checked_first() {
        let g = chain(10);
        let err = split(
            &InMemoryEngine,
            &g,
            SplitTarget::Edges,
            EvaluationSchema::MonteCarlo.strategy(),
            3,
            42,
            3,
            &HoldoutParams::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidHoldoutIndex {
                holdout_number: 3,
                number_of_holdouts: 3
            }
        ));
    }

    #[test]
    fn test_monte_carlo_repeatable() {
        let g = chain(50);
        let strategy = EvaluationSchema::MonteCarlo.strategy();
        let ids = |s: &HoldoutSplit| s.test.edges().map(|(_, _, e)| e.id).collect::<Vec<_>>();
        let run = |holdout| {
            split(&InMemoryEngine, &g, SplitTarget::Edges, strategy, 5, 7, holdout, &HoldoutParams::default())
                .unwrap()
        };
        assert_eq!(ids(&run(1)), ids(&run(1)));
        assert_ne!(ids(&run(1)), ids(&run(2)));
        assert_eq!(g.edge_count(), 50);
    }
}
