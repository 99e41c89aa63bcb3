//! Fit and score one holdout.
//!
//! ```text
//! HoldoutSplit ──► TaskContext (features resolved on support/train)
//!                      │
//!        train Examples ──► factory() ──► fit ──► FittedModel
//!                                                     │
//!              train Examples / test Examples ──► predict + predict_proba ──► metrics ──► 2 records
//! ```

use crate::metrics::{evaluate_predictions, evaluate_probabilities};
use crate::record::{EvaluationMode, PerformanceRecord};
use crate::task::{Examples, PredictionTask, TaskContext};
use crate::{Error, FeatureSources, Result};
use graphval_core::{Graph, HoldoutSplit, SplitEngine};
use graphval_models::{Classifier, LabelEncoding, Labels};
use std::cell::OnceCell;

/// Unbalance ratio above which fitting logs a warning.
const UNBALANCE_WARNING_RATIO: usize = 20;

/// A classifier fitted on one holdout, with the encoding chosen at fit time.
#[derive(Debug)]
pub struct FittedModel<C> {
    /// The fitted classifier.
    pub classifier: C,
    /// Label encoding used for fitting and scoring.
    pub encoding: LabelEncoding,
}

/// One holdout being evaluated.
///
/// Examples are built at most once per mode, so tasks that sample (edge
/// prediction negatives) draw once for fitting and scoring.
pub struct HoldoutRun<'a, T: ?Sized> {
    task: &'a T,
    ctx: TaskContext<'a>,
    encoding: LabelEncoding,
    train_size: f64,
    train: OnceCell<Examples>,
    test: OnceCell<Examples>,
}

impl<'a, T: PredictionTask + ?Sized> HoldoutRun<'a, T> {
    /// Resolve features, the label encoding and `train_size` for `split`.
    pub fn prepare(
        task: &'a T,
        engine: &'a dyn SplitEngine,
        graph: &'a Graph,
        split: &'a HoldoutSplit,
        features: &FeatureSources,
        random_state: u64,
        holdout_number: usize,
    ) -> Result<Self> {
        let ctx = TaskContext::new(engine, graph, split, features, random_state, holdout_number)?;
        Ok(Self {
            task,
            encoding: task.label_encoding(graph)?,
            train_size: task.train_size(graph, split),
            ctx,
            train: OnceCell::new(),
            test: OnceCell::new(),
        })
    }

    /// Label encoding of this run.
    pub fn encoding(&self) -> LabelEncoding {
        self.encoding
    }

    /// Fraction of the graph's examples in the train graph.
    pub fn train_size(&self) -> f64 {
        self.train_size
    }

    fn examples(&self, mode: EvaluationMode) -> Result<&Examples> {
        let cell = match mode {
            EvaluationMode::Train => &self.train,
            EvaluationMode::Test => &self.test,
        };
        if let Some(examples) = cell.get() {
            return Ok(examples);
        }
        let examples = self.task.examples(&self.ctx, mode, self.encoding)?;
        Ok(cell.get_or_init(|| examples))
    }

    /// Build a fresh classifier and fit it on the train graph.
    pub fn fit<F, C>(&self, factory: &F) -> Result<FittedModel<C>>
    where
        F: Fn() -> graphval_models::Result<C>,
        C: Classifier,
    {
        let train = self.examples(EvaluationMode::Train)?;
        warn_if_unbalanced(self.task.name(), self.ctx.holdout_number, &train.labels);

        let mut classifier = factory()?;
        classifier.fit(train.features.view(), &train.labels)?;
        log::debug!(
            "holdout {}: fitted {} on {} {} examples",
            self.ctx.holdout_number,
            classifier.name(),
            train.len(),
            self.encoding.name()
        );

        Ok(FittedModel {
            classifier,
            encoding: self.encoding,
        })
    }

    /// Score `model` on the train then the test graph.
    ///
    /// # Errors
    ///
    /// `NaNInPredictions` when any probability is NaN.
    pub fn score<C: Classifier>(&self, model: &FittedModel<C>) -> Result<(PerformanceRecord, PerformanceRecord)> {
        let train = self.score_mode(model, EvaluationMode::Train)?;
        let test = self.score_mode(model, EvaluationMode::Test)?;
        Ok((train, test))
    }

    fn score_mode<C: Classifier>(&self, model: &FittedModel<C>, mode: EvaluationMode) -> Result<PerformanceRecord> {
        let examples = self.examples(mode)?;
        let holdout_number = self.ctx.holdout_number;

        let proba = model.classifier.predict_proba(examples.features.view())?;
        if proba.iter().any(|p| p.is_nan()) {
            return Err(Error::NaNInPredictions { holdout_number, mode });
        }
        let predicted = model.classifier.predict(examples.features.view())?;

        let mut metrics = evaluate_predictions(&examples.labels, &predicted)?;
        metrics.extend(evaluate_probabilities(&examples.labels, proba.view())?);

        Ok(PerformanceRecord {
            holdout_number,
            evaluation_mode: mode,
            train_size: self.train_size,
            examples_column: self.task.examples_column().to_string(),
            examples_number: examples.len(),
            task: self.task.name().to_string(),
            model: model.classifier.name().to_string(),
            metrics,
        })
    }
}

fn warn_if_unbalanced(task: &str, holdout_number: usize, labels: &Labels) {
    let counts: Vec<usize> = labels.class_counts().into_iter().filter(|&c| c > 0).collect();
    let (Some(&min), Some(&max)) = (counts.iter().min(), counts.iter().max()) else {
        return;
    };
    if max > UNBALANCE_WARNING_RATIO * min {
        log::warn!(
            "{} holdout {}: the most common label has {} examples and the least common {}; \
             the label distribution is heavily unbalanced",
            task,
            holdout_number,
            max,
            min
        );
    }
}

/// Fit a fresh model on `split` and score it on train and test.
///
/// Returns the train record then the test record. With `verbose`, the test
/// accuracy of the holdout is logged at info level instead of debug.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_holdout<T, F, C>(
    task: &T,
    engine: &dyn SplitEngine,
    graph: &Graph,
    split: &HoldoutSplit,
    factory: &F,
    features: &FeatureSources,
    random_state: u64,
    holdout_number: usize,
    verbose: bool,
) -> Result<(PerformanceRecord, PerformanceRecord)>
where
    T: PredictionTask + ?Sized,
    F: Fn() -> graphval_models::Result<C>,
    C: Classifier,
{
    let run = HoldoutRun::prepare(task, engine, graph, split, features, random_state, holdout_number)?;
    let model = run.fit(factory)?;
    let (train, test) = run.score(&model)?;

    let level = if verbose { log::Level::Info } else { log::Level::Debug };
    log::log!(
        level,
        "{} holdout {}: train_size {:.3}, {} test {}, test accuracy {}",
        task.name(),
        holdout_number,
        run.train_size(),
        test.examples_number,
        test.examples_column,
        test.metrics
            .get("accuracy")
            .map_or_else(|| "n/a".to_string(), |a| format!("{a:.4}"))
    );
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NodeLabelPrediction;
    use graphval_core::{HoldoutParams, InMemoryEngine, SplitTarget};
    use graphval_models::NearestCentroid;
    use ndarray::Array2;

    fn separable() -> (Graph, FeatureSources) {
        let mut g = Graph::new("separable", false);
        for i in 0..20 {
            g.add_node(&format!("n{i}"), [if i < 10 { "low" } else { "high" }]);
        }
        let x = Array2::from_shape_fn((20, 2), |(i, j)| if i < 10 { j as f64 } else { 10.0 + j as f64 });
        (g, FeatureSources::new().with_node_features(x))
    }

    #[test]
    fn test_two_records_train_then_test() {
        let (g, features) = separable();
        let split = InMemoryEngine
            .random_holdout(&g, SplitTarget::NodeLabels, &HoldoutParams::default(), true, 5)
            .unwrap();
        let (train, test) = evaluate_holdout(
            &NodeLabelPrediction,
            &InMemoryEngine,
            &g,
            &split,
            &|| Ok::<_, graphval_models::Error>(NearestCentroid::new()),
            &features,
            5,
            0,
            true,
        )
        .unwrap();

        assert_eq!(train.evaluation_mode, EvaluationMode::Train);
        assert_eq!(test.evaluation_mode, EvaluationMode::Test);
        assert_eq!(train.examples_number, 16);
        assert_eq!(test.examples_number, 4);
        assert!((train.train_size - 0.8).abs() < 1e-12);
        assert_eq!(test.metrics["accuracy"], 1.0);
        assert_eq!(test.metrics["auroc"], 1.0);
        assert_eq!(test.model, "nearest_centroid");
    }

    #[test]
    fn test_verbosity_does_not_change_records() {
        let (g, features) = separable();
        let split = InMemoryEngine
            .random_holdout(&g, SplitTarget::NodeLabels, &HoldoutParams::default(), true, 9)
            .unwrap();
        let factory = || Ok::<_, graphval_models::Error>(NearestCentroid::new());
        let quiet =
            evaluate_holdout(&NodeLabelPrediction, &InMemoryEngine, &g, &split, &factory, &features, 9, 3, false)
                .unwrap();
        let loud =
            evaluate_holdout(&NodeLabelPrediction, &InMemoryEngine, &g, &split, &factory, &features, 9, 3, true)
                .unwrap();
        assert_eq!(quiet, loud);
        assert_eq!(quiet.0.holdout_number, 3);
    }

    #[test]
    fn test_fresh_model_per_fit() {
        let (g, features) = separable();
        let split = InMemoryEngine
            .random_holdout(&g, SplitTarget::NodeLabels, &HoldoutParams::default(), false, 1)
            .unwrap();
        let run = HoldoutRun::prepare(&NodeLabelPrediction, &InMemoryEngine, &g, &split, &features, 1, 0).unwrap();
        let calls = std::cell::Cell::new(0);
        let factory = || {
            calls.set(calls.get() + 1);
            Ok::<_, graphval_models::Error>(NearestCentroid::new())
        };
        let a = run.fit(&factory).unwrap();
        let b = run.fit(&factory).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(a.encoding, LabelEncoding::Binary);
        assert!(a.classifier.is_fitted() && b.classifier.is_fitted());
    }
}
