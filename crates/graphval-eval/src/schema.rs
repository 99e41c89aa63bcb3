//! Evaluation schemas and their split strategies.
//!
//! | Schema | Primitive | Stratified | Seed per holdout |
//! |--------|-----------|------------|------------------|
//! | `Monte Carlo` | random holdout | no | `random_state + holdout_number` |
//! | `Stratified Monte Carlo` | random holdout | yes | `random_state + holdout_number` |
//! | `Kfold` | k-fold | no | `random_state` |
//! | `Stratified Kfold` | k-fold | yes | `random_state` |
//!
//! Names match exactly; there is no case folding or fuzzy matching.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named evaluation schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationSchema {
    /// Independent random holdouts.
    #[serde(rename = "Monte Carlo")]
    MonteCarlo,
    /// Independent random holdouts preserving label proportions.
    #[serde(rename = "Stratified Monte Carlo")]
    StratifiedMonteCarlo,
    /// Folds of one seeded partition.
    #[serde(rename = "Kfold")]
    Kfold,
    /// Folds of one seeded partition preserving label proportions.
    #[serde(rename = "Stratified Kfold")]
    StratifiedKfold,
}

impl EvaluationSchema {
    /// Every schema, in canonical order.
    pub const ALL: [Self; 4] = [
        Self::MonteCarlo,
        Self::StratifiedMonteCarlo,
        Self::Kfold,
        Self::StratifiedKfold,
    ];

    /// Literal name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MonteCarlo => "Monte Carlo",
            Self::StratifiedMonteCarlo => "Stratified Monte Carlo",
            Self::Kfold => "Kfold",
            Self::StratifiedKfold => "Stratified Kfold",
        }
    }

    /// Every literal name.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }

    /// The split strategy this schema maps to.
    pub fn strategy(self) -> SplitStrategy {
        let (primitive, stratify) = match self {
            Self::MonteCarlo => (SplitPrimitive::RandomHoldout, false),
            Self::StratifiedMonteCarlo => (SplitPrimitive::RandomHoldout, true),
            Self::Kfold => (SplitPrimitive::Kfold, false),
            Self::StratifiedKfold => (SplitPrimitive::Kfold, true),
        };
        SplitStrategy { primitive, stratify }
    }
}

impl fmt::Display for EvaluationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvaluationSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|schema| schema.name() == s)
            .ok_or_else(|| Error::UnsupportedSchema {
                requested: s.to_string(),
                available: Self::names(),
            })
    }
}

/// The graph-engine primitive a schema calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitPrimitive {
    /// Random holdout with `train_size` and a per-holdout seed.
    RandomHoldout,
    /// Fold `holdout_number` of `number_of_holdouts`.
    Kfold,
}

/// How to split a graph for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitStrategy {
    /// Engine primitive.
    pub primitive: SplitPrimitive,
    /// Whether to preserve label proportions.
    pub stratify: bool,
}

/// Resolve a schema name into its split strategy.
///
/// # Errors
///
/// `UnsupportedSchema` listing the valid names when `name` is not one of them.
pub fn resolve(name: &str) -> Result<SplitStrategy> {
    name.parse::<EvaluationSchema>().map(EvaluationSchema::strategy)
}
