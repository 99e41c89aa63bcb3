//! Property-based tests for the built-in classifiers.
//!
//! - Probabilities stay in [0, 1] and have the encoding's shape
//! - Multiclass rows sum to 1
//! - `predict` agrees with thresholded `predict_proba`

use graphval_models::ndarray::{Array1, Array2};
use graphval_models::{Classifier, ClassifierConfig, LabelEncoding, Labels, LogisticRegressionConfig};
use proptest::prelude::*;

fn arb_features(rows: usize, cols: usize) -> impl Strategy<Value = Array2<f64>> {
    prop::collection::vec(-10.0f64..10.0, rows * cols)
        .prop_map(move |v| Array2::from_shape_vec((rows, cols), v).unwrap())
}

fn configs() -> Vec<ClassifierConfig> {
    vec![
        ClassifierConfig::NearestCentroid,
        ClassifierConfig::LogisticRegression(LogisticRegressionConfig::default().with_epochs(20)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn binary_probabilities_in_unit_interval(
        x in arb_features(12, 3),
        y in prop::collection::vec(any::<bool>(), 12),
    ) {
        let labels = Labels::Binary(Array1::from(y));
        for config in configs() {
            let mut model = config.build().unwrap();
            model.fit(x.view(), &labels).unwrap();
            let proba = model.predict_proba(x.view()).unwrap();
            prop_assert_eq!(proba.dim(), (12, 1));
            prop_assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));

            let predicted = model.predict(x.view()).unwrap();
            let expected = Labels::from_probabilities(LabelEncoding::Binary, proba.view()).unwrap();
            prop_assert_eq!(predicted, expected);
        }
    }

    #[test]
    fn multiclass_rows_sum_to_one(
        x in arb_features(15, 2),
        ids in prop::collection::vec(0usize..4, 15),
    ) {
        let labels = Labels::Classes { ids: Array1::from(ids), num_classes: 4 };
        for config in configs() {
            let mut model = config.build().unwrap();
            model.fit(x.view(), &labels).unwrap();
            let proba = model.predict_proba(x.view()).unwrap();
            prop_assert_eq!(proba.dim(), (15, 4));
            for row in proba.rows() {
                prop_assert!((row.sum() - 1.0).abs() < 1e-9);
            }
        }
    }
}
