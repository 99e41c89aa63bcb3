//! Logistic regression trained with full-batch gradient descent.
//!
//! | Encoding | Link | Loss |
//! |----------|------|------|
//! | Binary | sigmoid | binary cross-entropy |
//! | MultiClass | softmax | categorical cross-entropy |
//! | MultiLabel | sigmoid per label | summed binary cross-entropy |
//!
//! All three share the gradient `X^T (P - Y) / n + l2 * W`, so one loop
//! serves every encoding. Features are standardized with the training
//! mean and standard deviation.

use crate::classifier::{check_fit_inputs, check_width};
use crate::{Classifier, Error, LabelEncoding, Labels, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

/// Logistic regression hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Gradient step (default: 0.1).
    pub learning_rate: f64,
    /// Full-batch iterations (default: 200).
    pub epochs: usize,
    /// L2 penalty on the weights (default: 1e-4).
    pub l2: f64,
    /// Seed for weight initialization (default: 42).
    pub seed: u64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 200,
            l2: 1e-4,
            seed: 42,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check ranges: positive finite learning rate, at least one epoch, non-negative l2.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig {
                name: "learning_rate",
                reason: format!("expected a positive finite value, got {}", self.learning_rate),
            });
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig {
                name: "epochs",
                reason: "expected at least one epoch".to_string(),
            });
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(Error::InvalidConfig {
                name: "l2",
                reason: format!("expected a non-negative finite value, got {}", self.l2),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    encoding: LabelEncoding,
    mean: Array1<f64>,
    scale: Array1<f64>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

/// Linear classifier with a sigmoid or softmax link.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    fitted: Option<Fitted>,
}

impl LogisticRegression {
    /// Create an unfitted model, validating the configuration.
    pub fn new(config: LogisticRegressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fitted: None,
        })
    }

    /// The configuration this model was built with.
    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    fn standardize(x: ArrayView2<f64>, mean: &Array1<f64>, scale: &Array1<f64>) -> Array2<f64> {
        (&x - mean) / scale
    }

    fn activate(encoding: LabelEncoding, logits: &mut Array2<f64>) {
        match encoding {
            LabelEncoding::Binary | LabelEncoding::MultiLabel => logits.mapv_inplace(sigmoid),
            LabelEncoding::MultiClass => {
                for mut row in logits.axis_iter_mut(Axis(0)) {
                    let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
                    row.mapv_inplace(|v| (v - max).exp());
                    let sum = row.sum();
                    row.mapv_inplace(|v| v / sum);
                }
            }
        }
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            config: LogisticRegressionConfig::default(),
            fitted: None,
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn fit(&mut self, features: ArrayView2<f64>, labels: &Labels) -> Result<()> {
        check_fit_inputs(self.name(), features, labels)?;

        let n = features.nrows() as f64;
        let dim = features.ncols();
        let outputs = labels.num_outputs();
        let encoding = labels.encoding();

        let mean = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(dim));
        let scale = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let x = Self::standardize(features, &mean, &scale);
        let y = labels.to_targets();

        let mut rng = XorShiftRng::seed_from_u64(self.config.seed);
        let mut weights = Array2::<f64>::from_shape_fn((dim, outputs), |_| rng.random_range(-0.01..0.01));
        let mut bias = Array1::<f64>::zeros(outputs);

        for _ in 0..self.config.epochs {
            let mut proba = x.dot(&weights) + &bias;
            Self::activate(encoding, &mut proba);
            let residual = proba - &y;

            let grad_w = x.t().dot(&residual) / n + &weights * self.config.l2;
            let grad_b = residual.sum_axis(Axis(0)) / n;
            weights.scaled_add(-self.config.learning_rate, &grad_w);
            bias.scaled_add(-self.config.learning_rate, &grad_b);
        }

        log::debug!(
            "fitted {} ({}, {} features, {} outputs, {} epochs)",
            self.name(),
            encoding.name(),
            dim,
            outputs,
            self.config.epochs
        );

        self.fitted = Some(Fitted {
            encoding,
            mean,
            scale,
            weights,
            bias,
        });
        Ok(())
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Result<Array2<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        check_width(features, fitted.mean.len())?;

        let x = Self::standardize(features, &fitted.mean, &fitted.scale);
        let mut proba = x.dot(&fitted.weights) + &fitted.bias;
        Self::activate(fitted.encoding, &mut proba);
        Ok(proba)
    }

    fn encoding(&self) -> Option<LabelEncoding> {
        self.fitted.as_ref().map(|f| f.encoding)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn trained() -> LogisticRegressionConfig {
        LogisticRegressionConfig::default()
            .with_learning_rate(0.5)
            .with_epochs(2000)
    }

    fn blobs() -> (Array2<f64>, Array1<usize>) {
        let x = array![
            [0.0, 0.1],
            [0.2, 0.0],
            [0.1, 0.2],
            [4.0, 4.1],
            [4.2, 3.9],
            [3.9, 4.0],
            [0.0, 8.0],
            [0.2, 8.1],
            [0.1, 7.9],
        ];
        let y = array![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (x, y)
    }

    #[test]
    fn test_binary_separable() {
        let (x, ids) = blobs();
        let y = Labels::Binary(ids.mapv(|c| c == 1));
        let mut model = LogisticRegression::new(trained()).unwrap();
        model.fit(x.view(), &y).unwrap();

        let proba = model.predict_proba(x.view()).unwrap();
        assert_eq!(proba.dim(), (9, 1));
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_multiclass_rows_sum_to_one() {
        let (x, ids) = blobs();
        let y = Labels::Classes { ids, num_classes: 3 };
        let mut model = LogisticRegression::new(trained()).unwrap();
        model.fit(x.view(), &y).unwrap();

        let proba = model.predict_proba(x.view()).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_multilabel_shape() {
        let (x, ids) = blobs();
        let onehot = Array2::from_shape_fn((9, 2), |(i, j)| ids[i] == j || ids[i] == 2);
        let mut model = LogisticRegression::default();
        model.fit(x.view(), &Labels::OneHot(onehot)).unwrap();
        assert_eq!(model.predict_proba(x.view()).unwrap().dim(), (9, 2));
        assert_eq!(model.encoding(), Some(LabelEncoding::MultiLabel));
    }

    #[test]
    fn test_not_fitted() {
        let model = LogisticRegression::default();
        let x = array![[1.0]];
        assert!(matches!(model.predict_proba(x.view()), Err(Error::NotFitted(_))));
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_width_mismatch() {
        let (x, ids) = blobs();
        let mut model = LogisticRegression::default();
        model.fit(x.view(), &Labels::Binary(ids.mapv(|c| c == 0))).unwrap();
        let narrow = array![[1.0]];
        assert!(matches!(model.predict_proba(narrow.view()), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_config_validation() {
        assert!(LogisticRegression::new(LogisticRegressionConfig::default().with_epochs(0)).is_err());
        assert!(LogisticRegression::new(LogisticRegressionConfig::default().with_learning_rate(-1.0)).is_err());
        assert!(LogisticRegression::new(LogisticRegressionConfig::default().with_l2(f64::NAN)).is_err());
    }
}
