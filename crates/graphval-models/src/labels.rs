//! Label encodings shared by every classifier.
//!
//! | Encoding | Labels variant | `predict_proba` shape |
//! |----------|----------------|-----------------------|
//! | `Binary` | `Binary(bool per example)` | `(n, 1)`, probability of `true` |
//! | `MultiClass` | `Classes { ids, num_classes }` | `(n, num_classes)`, rows sum to 1 |
//! | `MultiLabel` | `OneHot(n x num_labels)` | `(n, num_labels)`, independent probabilities |

use crate::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// How a task's labels are encoded, chosen once at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEncoding {
    /// Exactly two classes, encoded as booleans.
    Binary,
    /// One class id per example.
    MultiClass,
    /// Any subset of labels per example, one-hot encoded.
    MultiLabel,
}

impl LabelEncoding {
    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::MultiClass => "multiclass",
            Self::MultiLabel => "multilabel",
        }
    }
}

/// Ground-truth or predicted labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// Binary labels.
    Binary(Array1<bool>),
    /// Integer class ids in `0..num_classes`.
    Classes {
        /// Class id per example.
        ids: Array1<usize>,
        /// Size of the class vocabulary.
        num_classes: usize,
    },
    /// One-hot rows, one column per label.
    OneHot(Array2<bool>),
}

impl Labels {
    /// The encoding of these labels.
    pub fn encoding(&self) -> LabelEncoding {
        match self {
            Self::Binary(_) => LabelEncoding::Binary,
            Self::Classes { .. } => LabelEncoding::MultiClass,
            Self::OneHot(_) => LabelEncoding::MultiLabel,
        }
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(v) => v.len(),
            Self::Classes { ids, .. } => ids.len(),
            Self::OneHot(m) => m.nrows(),
        }
    }

    /// Whether there are no examples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of probability columns a classifier produces for these labels.
    pub fn num_outputs(&self) -> usize {
        match self {
            Self::Binary(_) => 1,
            Self::Classes { num_classes, .. } => *num_classes,
            Self::OneHot(m) => m.ncols(),
        }
    }

    /// Number of classes (2 for binary).
    pub fn num_classes(&self) -> usize {
        match self {
            Self::Binary(_) => 2,
            Self::Classes { num_classes, .. } => *num_classes,
            Self::OneHot(m) => m.ncols(),
        }
    }

    /// Occurrences of each class. Binary is `[false, true]`.
    pub fn class_counts(&self) -> Vec<usize> {
        match self {
            Self::Binary(v) => {
                let positives = v.iter().filter(|&&b| b).count();
                vec![v.len() - positives, positives]
            }
            Self::Classes { ids, num_classes } => {
                let mut counts = vec![0; *num_classes];
                for &id in ids {
                    if let Some(c) = counts.get_mut(id) {
                        *c += 1;
                    }
                }
                counts
            }
            Self::OneHot(m) => m
                .axis_iter(Axis(1))
                .map(|col| col.iter().filter(|&&b| b).count())
                .collect(),
        }
    }

    /// Dense `(n, num_outputs)` target matrix with 1.0 for positives.
    pub fn to_targets(&self) -> Array2<f64> {
        match self {
            Self::Binary(v) => Array2::from_shape_fn((v.len(), 1), |(i, _)| f64::from(u8::from(v[i]))),
            Self::Classes { ids, num_classes } => {
                Array2::from_shape_fn((ids.len(), *num_classes), |(i, j)| {
                    f64::from(u8::from(ids[i] == j))
                })
            }
            Self::OneHot(m) => m.mapv(|b| f64::from(u8::from(b))),
        }
    }

    /// Turn probabilities into discrete labels.
    ///
    /// Binary and multilabel threshold at 0.5; multiclass takes the argmax
    /// (first class wins ties).
    pub fn from_probabilities(encoding: LabelEncoding, proba: ArrayView2<f64>) -> Result<Self> {
        match encoding {
            LabelEncoding::Binary => {
                if proba.ncols() != 1 {
                    return Err(Error::ShapeMismatch(format!(
                        "binary probabilities need 1 column, got {}",
                        proba.ncols()
                    )));
                }
                Ok(Self::Binary(proba.column(0).mapv(|p| p >= 0.5)))
            }
            LabelEncoding::MultiClass => {
                let ids = proba
                    .axis_iter(Axis(0))
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .fold((0, f64::NEG_INFINITY), |best, (j, &p)| {
                                if p > best.1 {
                                    (j, p)
                                } else {
                                    best
                                }
                            })
                            .0
                    })
                    .collect();
                Ok(Self::Classes {
                    ids,
                    num_classes: proba.ncols(),
                })
            }
            LabelEncoding::MultiLabel => Ok(Self::OneHot(proba.mapv(|p| p >= 0.5))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_counts() {
        let labels = Labels::Binary(array![true, false, false]);
        assert_eq!(labels.class_counts(), vec![2, 1]);

        let labels = Labels::Classes {
            ids: array![0, 2, 2],
            num_classes: 3,
        };
        assert_eq!(labels.class_counts(), vec![1, 0, 2]);
        assert_eq!(labels.num_outputs(), 3);
    }

    #[test]
    fn test_targets() {
        let labels = Labels::Classes {
            ids: array![1, 0],
            num_classes: 2,
        };
        assert_eq!(labels.to_targets(), array![[0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_from_probabilities() {
        let proba = array![[0.2, 0.5, 0.3], [0.6, 0.2, 0.2]];
        let labels = Labels::from_probabilities(LabelEncoding::MultiClass, proba.view()).unwrap();
        assert_eq!(
            labels,
            Labels::Classes {
                ids: array![1, 0],
                num_classes: 3
            }
        );

        let labels = Labels::from_probabilities(LabelEncoding::MultiLabel, proba.view()).unwrap();
        assert_eq!(labels, Labels::OneHot(array![[false, true, false], [true, false, false]]));

        assert!(Labels::from_probabilities(LabelEncoding::Binary, proba.view()).is_err());
    }
}
