//! Serializable classifier selection.
//!
//! ```rust
//! use graphval_models::{Classifier, ClassifierConfig};
//!
//! let config: ClassifierConfig =
//!     serde_json::from_str(r#"{"model": "logistic_regression", "epochs": 50}"#).unwrap();
//! let model = config.build().unwrap();
//! assert_eq!(model.name(), "logistic_regression");
//! ```

use crate::{Classifier, LogisticRegression, LogisticRegressionConfig, NearestCentroid, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which built-in classifier to evaluate, with its hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ClassifierConfig {
    /// [`LogisticRegression`].
    LogisticRegression(LogisticRegressionConfig),
    /// [`NearestCentroid`].
    NearestCentroid,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::LogisticRegression(LogisticRegressionConfig::default())
    }
}

impl ClassifierConfig {
    /// Build a fresh, unfitted classifier.
    pub fn build(&self) -> Result<Box<dyn Classifier>> {
        Ok(match self {
            Self::LogisticRegression(config) => Box::new(LogisticRegression::new(config.clone())?),
            Self::NearestCentroid => Box::new(NearestCentroid::new()),
        })
    }

    /// A factory producing a new classifier per call, for use as a model factory.
    pub fn factory(self) -> impl Fn() -> Result<Box<dyn Classifier>> {
        move || self.build()
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&ClassifierConfig::NearestCentroid).unwrap();
        assert_eq!(json, r#"{"model":"nearest_centroid"}"#);

        let config: ClassifierConfig =
            serde_json::from_str(r#"{"model":"logistic_regression","learning_rate":0.5}"#).unwrap();
        match config {
            ClassifierConfig::LogisticRegression(c) => {
                assert_eq!(c.learning_rate, 0.5);
                assert_eq!(c.epochs, LogisticRegressionConfig::default().epochs);
            }
            ClassifierConfig::NearestCentroid => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_factory_builds_fresh_models() {
        let factory = ClassifierConfig::NearestCentroid.factory();
        let a = factory().unwrap();
        let b = factory().unwrap();
        assert!(!a.is_fitted());
        assert!(!b.is_fitted());
    }

    #[test]
    fn test_invalid_config_fails_to_build() {
        let config = ClassifierConfig::LogisticRegression(LogisticRegressionConfig::default().with_epochs(0));
        assert!(config.build().is_err());
    }
}
