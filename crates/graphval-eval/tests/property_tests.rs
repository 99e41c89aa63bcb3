//! Property-based tests for the evaluation loop.
//!
//! - Every run yields exactly `2 * number_of_holdouts` records, train then test
//! - Monte Carlo seeds advance with the holdout index; k-fold seeds do not
//! - Summaries count one value per holdout for always-defined metrics

use graphval_core::Graph;
use graphval_eval::splitter::holdout_seed;
use graphval_eval::{EvaluationConfig, EvaluationMode, EvaluationSchema, Evaluator, FeatureSources, NodeLabelPrediction};
use graphval_models::NearestCentroid;
use ndarray::Array2;
use proptest::prelude::*;

fn labelled(n: usize) -> (Graph, FeatureSources) {
    let mut g = Graph::new("labelled", false);
    for i in 0..n {
        g.add_node(&format!("n{i}"), [if i % 2 == 0 { "a" } else { "b" }]);
    }
    let x = Array2::from_shape_fn((n, 1), |(i, _)| (i % 2) as f64 * 3.0 + (i % 5) as f64 * 0.1);
    (g, FeatureSources::new().with_node_features(x))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn record_count_is_twice_holdouts(
        n in 20usize..60,
        holdouts in 2usize..6,
        random_state in 0u64..1000,
        schema_idx in 0usize..4,
    ) {
        let (g, features) = labelled(n);
        let schema = EvaluationSchema::ALL[schema_idx];
        let config = EvaluationConfig::default()
            .with_schema(schema)
            .with_number_of_holdouts(holdouts)
            .with_random_state(random_state);

        let result = Evaluator::new(config)
            .unwrap()
            .run(&NodeLabelPrediction, &g, &features, || Ok(NearestCentroid::new()))
            .unwrap();

        prop_assert_eq!(result.len(), 2 * holdouts);
        for (i, record) in result.records().iter().enumerate() {
            prop_assert_eq!(record.holdout_number, i / 2);
            let mode = if i % 2 == 0 { EvaluationMode::Train } else { EvaluationMode::Test };
            prop_assert_eq!(record.evaluation_mode, mode);
        }

        let accuracy = result
            .summary()
            .into_iter()
            .filter(|s| s.metric == "accuracy")
            .collect::<Vec<_>>();
        prop_assert_eq!(accuracy.len(), 2);
        prop_assert!(accuracy.iter().all(|s| s.count == holdouts));
    }

    #[test]
    fn seeds_follow_schema(
        random_state in 0u64..u64::MAX / 2,
        holdout_number in 0usize..100,
    ) {
        let mc = holdout_seed(EvaluationSchema::MonteCarlo.strategy(), random_state, holdout_number);
        let kf = holdout_seed(EvaluationSchema::StratifiedKfold.strategy(), random_state, holdout_number);
        prop_assert_eq!(mc, random_state + holdout_number as u64);
        prop_assert_eq!(kf, random_state);
    }
}
