//! The classifier contract consumed by the evaluation pipeline.
//!
//! Any model that can `fit` a dense feature matrix against [`Labels`] and
//! return class probabilities can be evaluated. Each holdout builds a fresh
//! instance through a factory closure, so implementations never need to
//! support refitting.
//!
//! # Example
//!
//! ```rust
//! use graphval_models::{Classifier, Labels, NearestCentroid};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.1, 0.0], [5.0, 5.0], [5.1, 5.0]];
//! let y = Labels::Binary(array![false, false, true, true]);
//!
//! let mut model = NearestCentroid::new();
//! model.fit(x.view(), &y).unwrap();
//! assert_eq!(model.predict(x.view()).unwrap(), y);
//! ```

use crate::{Error, LabelEncoding, Labels, Result};
use ndarray::{Array2, ArrayView2};

/// A trainable probabilistic classifier.
pub trait Classifier: Send {
    /// Model name used in result tables.
    fn name(&self) -> &str;

    /// Fit on `features` (one row per example) against `labels`.
    fn fit(&mut self, features: ArrayView2<f64>, labels: &Labels) -> Result<()>;

    /// Class probabilities, shaped as described in [`crate::labels`].
    fn predict_proba(&self, features: ArrayView2<f64>) -> Result<Array2<f64>>;

    /// Encoding seen at fit time, `None` before fitting.
    fn encoding(&self) -> Option<LabelEncoding>;

    /// Discrete predictions.
    ///
    /// Default implementation thresholds [`Classifier::predict_proba`].
    fn predict(&self, features: ArrayView2<f64>) -> Result<Labels> {
        let encoding = self
            .encoding()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        let proba = self.predict_proba(features)?;
        Labels::from_probabilities(encoding, proba.view())
    }

    /// Whether `fit` has completed.
    fn is_fitted(&self) -> bool {
        self.encoding().is_some()
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, features: ArrayView2<f64>, labels: &Labels) -> Result<()> {
        (**self).fit(features, labels)
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Result<Array2<f64>> {
        (**self).predict_proba(features)
    }

    fn encoding(&self) -> Option<LabelEncoding> {
        (**self).encoding()
    }

    fn predict(&self, features: ArrayView2<f64>) -> Result<Labels> {
        (**self).predict(features)
    }
}

/// Shared argument checks for `fit`.
pub(crate) fn check_fit_inputs(name: &str, features: ArrayView2<f64>, labels: &Labels) -> Result<()> {
    if features.nrows() == 0 {
        return Err(Error::EmptyTrainingSet(name.to_string()));
    }
    if features.nrows() != labels.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }
    Ok(())
}

/// Shared argument checks for prediction against the fitted width.
pub(crate) fn check_width(features: ArrayView2<f64>, fitted: usize) -> Result<()> {
    if features.ncols() != fitted {
        return Err(Error::ShapeMismatch(format!(
            "model was fitted on {} features, got {}",
            fitted,
            features.ncols()
        )));
    }
    Ok(())
}
