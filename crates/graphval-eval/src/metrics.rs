//! Classification metrics.
//!
//! | Metric | Binary | Multiclass / multilabel |
//! |--------|--------|-------------------------|
//! | `accuracy` | (tp + tn) / n | exact match / element-wise |
//! | `balanced_accuracy` | (recall + specificity) / 2 | mean per-class recall / per-label balanced accuracy |
//! | `precision`, `recall`, `f1_score` | positive class | macro over classes seen in truth or prediction |
//! | `specificity`, `mcc` | yes | no |
//! | `auroc` | rank based, ties averaged | macro one-vs-rest |
//! | `auprc` | average precision | macro one-vs-rest |
//!
//! A metric that is undefined for the given labels (e.g. `auroc` when only
//! one class is present) is left out of the returned map.

use crate::{Error, Result};
use graphval_models::{LabelEncoding, Labels};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use std::collections::BTreeMap;

/// Metric name to value.
pub type Metrics = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Confusion {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl Confusion {
    fn from_columns(truth: ArrayView1<f64>, predicted: ArrayView1<f64>) -> Self {
        let mut c = Self::default();
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t > 0.5, p > 0.5) {
                (true, true) => c.tp += 1,
                (false, true) => c.fp += 1,
                (false, false) => c.tn += 1,
                (true, false) => c.fn_ += 1,
            }
        }
        c
    }

    fn ratio(num: usize, den: usize) -> Option<f64> {
        (den > 0).then(|| num as f64 / den as f64)
    }

    fn accuracy(&self) -> Option<f64> {
        Self::ratio(self.tp + self.tn, self.tp + self.tn + self.fp + self.fn_)
    }

    fn precision(&self) -> Option<f64> {
        Self::ratio(self.tp, self.tp + self.fp)
    }

    fn recall(&self) -> Option<f64> {
        Self::ratio(self.tp, self.tp + self.fn_)
    }

    fn specificity(&self) -> Option<f64> {
        Self::ratio(self.tn, self.tn + self.fp)
    }

    fn f1(&self) -> Option<f64> {
        Self::ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }

    fn balanced_accuracy(&self) -> Option<f64> {
        Some((self.recall()? + self.specificity()?) / 2.0)
    }

    fn mcc(&self) -> Option<f64> {
        let (tp, fp, tn, fn_) = (self.tp as f64, self.fp as f64, self.tn as f64, self.fn_ as f64);
        let den = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        (den > 0.0).then(|| (tp * tn - fp * fn_) / den)
    }

    /// Whether the class occurs in truth or prediction.
    fn is_seen(&self) -> bool {
        self.tp + self.fp + self.fn_ > 0
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn insert(metrics: &mut Metrics, name: &str, value: Option<f64>) {
    if let Some(value) = value {
        metrics.insert(name.to_string(), value);
    }
}

fn check_lengths(truth: &Labels, rows: usize, what: &str) -> Result<()> {
    if truth.len() != rows {
        return Err(Error::InvalidParameter {
            name: "labels",
            reason: format!("{} ground-truth labels but {} {}", truth.len(), rows, what),
        });
    }
    Ok(())
}

/// Metrics over discrete predictions.
pub fn evaluate_predictions(truth: &Labels, predicted: &Labels) -> Result<Metrics> {
    check_lengths(truth, predicted.len(), "predictions")?;
    if truth.encoding() != predicted.encoding() {
        return Err(Error::InvalidParameter {
            name: "predictions",
            reason: format!(
                "expected {} predictions, got {}",
                truth.encoding().name(),
                predicted.encoding().name()
            ),
        });
    }

    let mut metrics = Metrics::new();
    if truth.is_empty() {
        return Ok(metrics);
    }

    let t = truth.to_targets();
    let p = predicted.to_targets();
    if t.ncols() != p.ncols() {
        return Err(Error::InvalidParameter {
            name: "predictions",
            reason: format!("expected {} classes, got {}", t.ncols(), p.ncols()),
        });
    }
    let per_class: Vec<Confusion> = t
        .axis_iter(Axis(1))
        .zip(p.axis_iter(Axis(1)))
        .map(|(tc, pc)| Confusion::from_columns(tc, pc))
        .collect();

    match truth.encoding() {
        LabelEncoding::Binary => {
            let c = per_class[0];
            insert(&mut metrics, "accuracy", c.accuracy());
            insert(&mut metrics, "balanced_accuracy", c.balanced_accuracy());
            insert(&mut metrics, "precision", c.precision());
            insert(&mut metrics, "recall", c.recall());
            insert(&mut metrics, "f1_score", c.f1());
            insert(&mut metrics, "specificity", c.specificity());
            insert(&mut metrics, "mcc", c.mcc());
        }
        LabelEncoding::MultiClass | LabelEncoding::MultiLabel => {
            let accuracy = if truth.encoding() == LabelEncoding::MultiClass {
                let matches = t.rows().into_iter().zip(p.rows()).filter(|(a, b)| a == b).count();
                matches as f64 / t.nrows() as f64
            } else {
                let matches = t.iter().zip(p.iter()).filter(|(a, b)| a == b).count();
                matches as f64 / t.len() as f64
            };
            metrics.insert("accuracy".to_string(), accuracy);

            let balanced = if truth.encoding() == LabelEncoding::MultiClass {
                mean(per_class.iter().filter_map(Confusion::recall))
            } else {
                mean(per_class.iter().filter_map(Confusion::balanced_accuracy))
            };
            insert(&mut metrics, "balanced_accuracy", balanced);

            let seen: Vec<&Confusion> = per_class.iter().filter(|c| c.is_seen()).collect();
            insert(&mut metrics, "precision", mean(seen.iter().map(|c| c.precision().unwrap_or(0.0))));
            insert(&mut metrics, "recall", mean(seen.iter().map(|c| c.recall().unwrap_or(0.0))));
            insert(&mut metrics, "f1_score", mean(seen.iter().map(|c| c.f1().unwrap_or(0.0))));
        }
    }
    Ok(metrics)
}

/// Area under the ROC curve; `None` unless both classes are present.
pub fn auroc(truth: ArrayView1<f64>, scores: ArrayView1<f64>) -> Option<f64> {
    let positives = truth.iter().filter(|&&t| t > 0.5).count();
    let negatives = truth.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based ranks, ties share their average rank
    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        rank_sum += rank * order[i..=j].iter().filter(|&&k| truth[k] > 0.5).count() as f64;
        i = j + 1;
    }

    let p = positives as f64;
    Some((rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

/// Average precision; `None` without positives.
pub fn auprc(truth: ArrayView1<f64>, scores: ArrayView1<f64>) -> Option<f64> {
    let positives = truth.iter().filter(|&&t| t > 0.5).count();
    if positives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let (mut tp, mut fp) = (0usize, 0usize);
    let mut previous_recall = 0.0;
    let mut ap = 0.0;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if truth[order[i]] > 0.5 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        let recall = tp as f64 / positives as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        ap += (recall - previous_recall) * precision;
        previous_recall = recall;
    }
    Some(ap)
}

/// Metrics over predicted probabilities.
pub fn evaluate_probabilities(truth: &Labels, proba: ArrayView2<f64>) -> Result<Metrics> {
    check_lengths(truth, proba.nrows(), "probability rows")?;
    if proba.ncols() != truth.num_outputs() {
        return Err(Error::InvalidParameter {
            name: "prediction_probabilities",
            reason: format!(
                "expected {} probability columns for {} labels, got {}",
                truth.num_outputs(),
                truth.encoding().name(),
                proba.ncols()
            ),
        });
    }

    let mut metrics = Metrics::new();
    if truth.is_empty() {
        return Ok(metrics);
    }

    let t: Array2<f64> = truth.to_targets();
    let columns = || t.axis_iter(Axis(1)).zip(proba.axis_iter(Axis(1)));
    insert(&mut metrics, "auroc", mean(columns().filter_map(|(tc, pc)| auroc(tc, pc))));
    insert(&mut metrics, "auprc", mean(columns().filter_map(|(tc, pc)| auprc(tc, pc))));
    Ok(metrics)
}
