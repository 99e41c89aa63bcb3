//! Nearest-centroid classifier.
//!
//! Binary and multilabel outputs keep a positive and a negative centroid per
//! column and score `sigmoid(d_neg - d_pos)`; multiclass keeps one centroid
//! per class and scores `softmax(-d)`. A class with no training examples has
//! no centroid and gets probability 0 (or 1 for the opposite side).

use crate::classifier::{check_fit_inputs, check_width};
use crate::{Classifier, Error, LabelEncoding, Labels, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

#[derive(Debug, Clone)]
enum Centroids {
    /// `(negative, positive)` centroid per output column.
    Paired(Vec<(Option<Array1<f64>>, Option<Array1<f64>>)>),
    /// One centroid per class.
    PerClass(Vec<Option<Array1<f64>>>),
}

/// Distance-to-centroid classifier with no hyperparameters.
#[derive(Debug, Clone, Default)]
pub struct NearestCentroid {
    fitted: Option<(LabelEncoding, usize, Centroids)>,
}

impl NearestCentroid {
    /// Create an unfitted model.
    pub fn new() -> Self {
        Self::default()
    }
}

fn centroid<'a>(rows: impl Iterator<Item = ArrayView1<'a, f64>>, dim: usize) -> Option<Array1<f64>> {
    let mut sum = Array1::<f64>::zeros(dim);
    let mut count = 0usize;
    for row in rows {
        sum += &row;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

fn distance(a: ArrayView1<f64>, b: &Array1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn paired_probability(row: ArrayView1<f64>, neg: Option<&Array1<f64>>, pos: Option<&Array1<f64>>) -> f64 {
    match (neg, pos) {
        (Some(neg), Some(pos)) => {
            let z = distance(row, neg) - distance(row, pos);
            1.0 / (1.0 + (-z).exp())
        }
        (None, Some(_)) => 1.0,
        _ => 0.0,
    }
}

impl Classifier for NearestCentroid {
    fn name(&self) -> &str {
        "nearest_centroid"
    }

    fn fit(&mut self, features: ArrayView2<f64>, labels: &Labels) -> Result<()> {
        check_fit_inputs(self.name(), features, labels)?;
        let dim = features.ncols();
        let rows = || features.axis_iter(Axis(0));

        let centroids = match labels {
            Labels::Binary(y) => {
                let neg = centroid(rows().zip(y).filter(|(_, &b)| !b).map(|(r, _)| r), dim);
                let pos = centroid(rows().zip(y).filter(|(_, &b)| b).map(|(r, _)| r), dim);
                Centroids::Paired(vec![(neg, pos)])
            }
            Labels::OneHot(y) => Centroids::Paired(
                y.axis_iter(Axis(1))
                    .map(|col| {
                        let neg = centroid(rows().zip(col.iter()).filter(|(_, &b)| !b).map(|(r, _)| r), dim);
                        let pos = centroid(rows().zip(col.iter()).filter(|(_, &b)| b).map(|(r, _)| r), dim);
                        (neg, pos)
                    })
                    .collect(),
            ),
            Labels::Classes { ids, num_classes } => Centroids::PerClass(
                (0..*num_classes)
                    .map(|c| centroid(rows().zip(ids).filter(|(_, &id)| id == c).map(|(r, _)| r), dim))
                    .collect(),
            ),
        };

        self.fitted = Some((labels.encoding(), dim, centroids));
        Ok(())
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (_, dim, centroids) = self
            .fitted
            .as_ref()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        check_width(features, *dim)?;
        let n = features.nrows();

        let proba = match centroids {
            Centroids::Paired(pairs) => Array2::from_shape_fn((n, pairs.len()), |(i, j)| {
                let (neg, pos) = &pairs[j];
                paired_probability(features.row(i), neg.as_ref(), pos.as_ref())
            }),
            Centroids::PerClass(classes) => {
                let mut proba = Array2::<f64>::zeros((n, classes.len()));
                for (i, row) in features.axis_iter(Axis(0)).enumerate() {
                    let scores: Vec<Option<f64>> = classes
                        .iter()
                        .map(|c| c.as_ref().map(|c| -distance(row, c)))
                        .collect();
                    let max = scores.iter().flatten().fold(f64::NEG_INFINITY, |m, &s| m.max(s));
                    let exp: Vec<f64> = scores
                        .iter()
                        .map(|s| s.map_or(0.0, |s| (s - max).exp()))
                        .collect();
                    let sum: f64 = exp.iter().sum();
                    for (j, e) in exp.into_iter().enumerate() {
                        proba[[i, j]] = if sum > 0.0 { e / sum } else { 0.0 };
                    }
                }
                proba
            }
        };
        Ok(proba)
    }

    fn encoding(&self) -> Option<LabelEncoding> {
        self.fitted.as_ref().map(|(encoding, _, _)| *encoding)
    }
}
