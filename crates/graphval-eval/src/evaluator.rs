//! The evaluation loop.
//!
//! For `holdout_number` in `0..number_of_holdouts`, sequentially:
//!
//! ```text
//! Initialized ─► Splitting ─► Fitting ─► Scoring ─► Recorded ─┐
//!                   ▲                                         │
//!                   └──────────── next holdout ◄──────────────┘
//!                                                             ▼
//!                                                         Complete
//! ```
//!
//! Feature and schema checks run before the first engine call. Any error
//! aborts the run and no partial result is returned.

use crate::cycle::HoldoutRun;
use crate::record::EvaluationResult;
use crate::schema::EvaluationSchema;
use crate::splitter;
use crate::task::PredictionTask;
use crate::{Error, FeatureSources, Result};
use graphval_core::{Graph, HoldoutParams, InMemoryEngine, SplitEngine};
use graphval_models::Classifier;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Evaluation run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Evaluation schema (default: Monte Carlo).
    pub schema: EvaluationSchema,
    /// Number of holdouts, the fold count for k-fold schemas (default: 10).
    pub number_of_holdouts: usize,
    /// Base seed (default: 42).
    pub random_state: u64,
    /// Parameters forwarded to random holdouts.
    pub holdout: HoldoutParams,
    /// Show a progress bar over holdouts (default: false).
    pub verbose: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            schema: EvaluationSchema::MonteCarlo,
            number_of_holdouts: 10,
            random_state: 42,
            holdout: HoldoutParams::default(),
            verbose: false,
        }
    }
}

impl EvaluationConfig {
    pub fn with_schema(mut self, schema: EvaluationSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_number_of_holdouts(mut self, number_of_holdouts: usize) -> Self {
        self.number_of_holdouts = number_of_holdouts;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn with_holdout(mut self, holdout: HoldoutParams) -> Self {
        self.holdout = holdout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the configuration.
    ///
    /// At least one holdout is required, and at least two folds for k-fold
    /// schemas. `holdout.train_size` must lie in (0, 1).
    pub fn validate(&self) -> Result<()> {
        if self.number_of_holdouts == 0 {
            return Err(Error::InvalidParameter {
                name: "number_of_holdouts",
                reason: "expected at least one holdout".to_string(),
            });
        }
        if matches!(self.schema, EvaluationSchema::Kfold | EvaluationSchema::StratifiedKfold)
            && self.number_of_holdouts < 2
        {
            return Err(Error::InvalidParameter {
                name: "number_of_holdouts",
                reason: format!(
                    "the `{}` schema uses number_of_holdouts as k and needs at least 2, got {}",
                    self.schema, self.number_of_holdouts
                ),
            });
        }
        self.holdout.validate()?;
        Ok(())
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Initialized,
    Splitting(usize),
    Fitting(usize),
    Scoring(usize),
    Recorded(usize),
    Complete,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => f.write_str("initialized"),
            Self::Splitting(h) => write!(f, "splitting holdout {h}"),
            Self::Fitting(h) => write!(f, "fitting holdout {h}"),
            Self::Scoring(h) => write!(f, "scoring holdout {h}"),
            Self::Recorded(h) => write!(f, "recorded holdout {h}"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    log::debug!("{} -> {}", state, next);
    *state = next;
}

/// Runs holdout evaluations against a split engine.
#[derive(Debug, Clone)]
pub struct Evaluator<E = InMemoryEngine> {
    engine: E,
    config: EvaluationConfig,
}

impl Evaluator<InMemoryEngine> {
    /// Evaluator over the built-in engine.
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        Self::with_engine(InMemoryEngine, config)
    }
}

impl<E: SplitEngine> Evaluator<E> {
    /// Evaluator over a custom engine.
    pub fn with_engine(engine: E, config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    /// The run configuration.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// The split engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.verbose {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(self.config.number_of_holdouts as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} holdouts ({eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }

    /// Evaluate `task` on `graph`, building a fresh model per holdout from `factory`.
    ///
    /// Returns `2 * number_of_holdouts` records, train then test, in holdout order.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFeature` / `InvalidFeatures` before any engine call
    /// - `UnsupportedSchema` if the task does not offer the configured schema
    /// - `NaNInPredictions`, engine and model errors abort the run
    pub fn run<T, F, C>(
        &self,
        task: &T,
        graph: &Graph,
        features: &FeatureSources,
        factory: F,
    ) -> Result<EvaluationResult>
    where
        T: PredictionTask + ?Sized,
        F: Fn() -> graphval_models::Result<C>,
        C: Classifier,
    {
        task.check_features(features)?;
        if !task.available_schemas().contains(&self.config.schema) {
            return Err(Error::UnsupportedSchema {
                requested: self.config.schema.name().to_string(),
                available: task.available_schemas().iter().map(|s| s.name()).collect(),
            });
        }

        let config = &self.config;
        let strategy = config.schema.strategy();
        log::info!(
            "evaluating {} on `{}` with {} x {} (random_state {})",
            task.name(),
            graph.name(),
            config.schema,
            config.number_of_holdouts,
            config.random_state
        );

        let bar = self.progress_bar();
        bar.set_message(task.name());
        let mut state = RunState::Initialized;
        let mut result = EvaluationResult::new();

        for holdout_number in 0..config.number_of_holdouts {
            advance(&mut state, RunState::Splitting(holdout_number));
            let split = splitter::split(
                &self.engine,
                graph,
                task.split_target(),
                strategy,
                config.number_of_holdouts,
                config.random_state,
                holdout_number,
                &config.holdout,
            )?;

            advance(&mut state, RunState::Fitting(holdout_number));
            let run = HoldoutRun::prepare(
                task,
                &self.engine,
                graph,
                &split,
                features,
                config.random_state,
                holdout_number,
            )?;
            let model = run.fit(&factory)?;

            advance(&mut state, RunState::Scoring(holdout_number));
            let (train, test) = run.score(&model)?;
            result.push(train);
            result.push(test);

            advance(&mut state, RunState::Recorded(holdout_number));
            bar.inc(1);
        }

        advance(&mut state, RunState::Complete);
        bar.finish_and_clear();
        log::info!("evaluation of {} complete: {} records", task.name(), result.len());
        Ok(result)
    }
}

/// Evaluate with the built-in engine, naming the schema by its literal.
///
/// # Example
///
/// ```rust
/// use graphval_core::{Graph, HoldoutParams};
/// use graphval_eval::{evaluate, FeatureSources, NodeLabelPrediction};
/// use graphval_models::ClassifierConfig;
/// use ndarray::Array2;
///
/// let mut g = Graph::new("toy", false);
/// for i in 0..20 {
///     g.add_node(&format!("n{i}"), [if i % 2 == 0 { "even" } else { "odd" }]);
/// }
/// let x = Array2::from_shape_fn((20, 1), |(i, _)| (i % 2) as f64);
/// let features = FeatureSources::new().with_node_features(x);
///
/// let result = evaluate(
///     &NodeLabelPrediction,
///     &g,
///     "Monte Carlo",
///     HoldoutParams::default(),
///     &features,
///     3,
///     42,
///     false,
///     ClassifierConfig::NearestCentroid.factory(),
/// )
/// .unwrap();
/// assert_eq!(result.len(), 6);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn evaluate<T, F, C>(
    task: &T,
    graph: &Graph,
    schema: &str,
    holdout: HoldoutParams,
    features: &FeatureSources,
    number_of_holdouts: usize,
    random_state: u64,
    verbose: bool,
    factory: F,
) -> Result<EvaluationResult>
where
    T: PredictionTask + ?Sized,
    F: Fn() -> graphval_models::Result<C>,
    C: Classifier,
{
    let schema: EvaluationSchema = schema.parse()?;
    let config = EvaluationConfig {
        schema,
        number_of_holdouts,
        random_state,
        holdout,
        verbose,
    };
    Evaluator::new(config)?.run(task, graph, features, factory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(EvaluationConfig::default().validate().is_ok());
        assert!(EvaluationConfig::default().with_number_of_holdouts(0).validate().is_err());
        assert!(EvaluationConfig::default()
            .with_schema(EvaluationSchema::Kfold)
            .with_number_of_holdouts(1)
            .validate()
            .is_err());
        assert!(EvaluationConfig::default()
            .with_holdout(HoldoutParams::default().with_train_size(1.5))
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_serde() {
        let config: EvaluationConfig = serde_json::from_str(
            r#"{"schema": "Stratified Kfold", "number_of_holdouts": 5, "holdout": {"train_size": 0.7}}"#,
        )
        .unwrap();
        assert_eq!(config.schema, EvaluationSchema::StratifiedKfold);
        assert_eq!(config.number_of_holdouts, 5);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.holdout.train_size, 0.7);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Splitting(3).to_string(), "splitting holdout 3");
        assert_eq!(RunState::Complete.to_string(), "complete");
    }
}
