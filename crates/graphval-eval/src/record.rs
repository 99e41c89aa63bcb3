//! Per-holdout performance records and the result table.
//!
//! Every holdout contributes exactly two rows, `train` then `test`, in
//! holdout order. The CSV layout is:
//!
//! | holdout_number | evaluation_mode | train_size | `<examples column>` | task | model | metrics... |
//! |----------------|-----------------|------------|---------------------|------|-------|------------|
//!
//! Metric columns are the sorted union of metric names across rows; a metric
//! missing from a row (undefined for its labels) is an empty cell.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;

/// Which side of a holdout a record scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// The graph the model was fitted on.
    Train,
    /// The held-out graph.
    Test,
}

impl EvaluationMode {
    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metrics for one (holdout, mode) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Holdout index.
    pub holdout_number: usize,
    /// Train or test.
    pub evaluation_mode: EvaluationMode,
    /// Fraction of the labelled set (or edges) in the train graph.
    pub train_size: f64,
    /// Name of the evaluated-examples column, e.g. `known_nodes_number`.
    pub examples_column: String,
    /// Number of evaluated examples.
    pub examples_number: usize,
    /// Task name.
    pub task: String,
    /// Model name.
    pub model: String,
    /// Metric name to value.
    pub metrics: BTreeMap<String, f64>,
}

/// Mean, standard deviation and range of one metric in one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Train or test.
    pub evaluation_mode: EvaluationMode,
    /// Metric name.
    pub metric: String,
    /// Number of records holding the metric.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Ordered performance records of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationResult {
    records: Vec<PerformanceRecord>,
}

impl EvaluationResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: PerformanceRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in execution order.
    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    /// Take ownership of the records.
    pub fn into_records(self) -> Vec<PerformanceRecord> {
        self.records
    }

    /// Records of one mode, in holdout order.
    pub fn by_mode(&self, mode: EvaluationMode) -> impl Iterator<Item = &PerformanceRecord> + '_ {
        self.records.iter().filter(move |r| r.evaluation_mode == mode)
    }

    /// Sorted union of metric names.
    pub fn metric_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|r| r.metrics.keys().map(String::as_str))
            .collect();
        names.into_iter().collect()
    }

    fn examples_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for record in &self.records {
            if !columns.contains(&record.examples_column.as_str()) {
                columns.push(&record.examples_column);
            }
        }
        columns
    }

    /// Table header: bookkeeping columns, then metric names.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            "holdout_number".to_string(),
            "evaluation_mode".to_string(),
            "train_size".to_string(),
        ];
        columns.extend(self.examples_columns().into_iter().map(str::to_string));
        columns.push("task".to_string());
        columns.push("model".to_string());
        columns.extend(self.metric_names().into_iter().map(str::to_string));
        columns
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let examples_columns = self.examples_columns();
        let metric_names = self.metric_names();
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.columns())?;

        for record in &self.records {
            let mut row = vec![
                record.holdout_number.to_string(),
                record.evaluation_mode.to_string(),
                record.train_size.to_string(),
            ];
            row.extend(examples_columns.iter().map(|&column| {
                if column == record.examples_column {
                    record.examples_number.to_string()
                } else {
                    String::new()
                }
            }));
            row.push(record.task.clone());
            row.push(record.model.clone());
            row.extend(
                metric_names
                    .iter()
                    .map(|&m| record.metrics.get(m).map(f64::to_string).unwrap_or_default()),
            );
            csv.write_record(&row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Serialize the records as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Per-mode summary of every metric, train first, metrics sorted by name.
    pub fn summary(&self) -> Vec<MetricSummary> {
        let mut values: BTreeMap<(EvaluationMode, &str), Vec<f64>> = BTreeMap::new();
        for record in &self.records {
            for (name, &value) in &record.metrics {
                values
                    .entry((record.evaluation_mode, name.as_str()))
                    .or_default()
                    .push(value);
            }
        }

        values
            .into_iter()
            .map(|((evaluation_mode, metric), v)| {
                let count = v.len();
                let mean = v.iter().sum::<f64>() / count as f64;
                let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
                MetricSummary {
                    evaluation_mode,
                    metric: metric.to_string(),
                    count,
                    mean,
                    std: var.sqrt(),
                    min: v.iter().copied().fold(f64::INFINITY, f64::min),
                    max: v.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a EvaluationResult {
    type Item = &'a PerformanceRecord;
    type IntoIter = std::slice::Iter<'a, PerformanceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(holdout_number: usize, mode: EvaluationMode, accuracy: f64, auroc: Option<f64>) -> PerformanceRecord {
        let mut metrics = BTreeMap::from([("accuracy".to_string(), accuracy)]);
        if let Some(auroc) = auroc {
            metrics.insert("auroc".to_string(), auroc);
        }
        PerformanceRecord {
            holdout_number,
            evaluation_mode: mode,
            train_size: 0.8,
            examples_column: "known_nodes_number".to_string(),
            examples_number: 10,
            task: "Node Label Prediction".to_string(),
            model: "nearest_centroid".to_string(),
            metrics,
        }
    }

    fn sample() -> EvaluationResult {
        let mut result = EvaluationResult::new();
        result.push(record(0, EvaluationMode::Train, 1.0, Some(1.0)));
        result.push(record(0, EvaluationMode::Test, 0.5, None));
        result.push(record(1, EvaluationMode::Train, 0.8, Some(0.9)));
        result.push(record(1, EvaluationMode::Test, 0.7, Some(0.6)));
        result
    }

    #[test]
    fn test_columns() {
        assert_eq!(
            sample().columns(),
            vec![
                "holdout_number",
                "evaluation_mode",
                "train_size",
                "known_nodes_number",
                "task",
                "model",
                "accuracy",
                "auroc"
            ]
        );
    }

    #[test]
    fn test_csv_leaves_missing_metrics_empty() {
        let mut buf = Vec::new();
        sample().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[2],
            "0,test,0.8,10,Node Label Prediction,nearest_centroid,0.5,"
        );
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        let test_accuracy = summary
            .iter()
            .find(|s| s.evaluation_mode == EvaluationMode::Test && s.metric == "accuracy")
            .unwrap();
        assert_eq!(test_accuracy.count, 2);
        assert!((test_accuracy.mean - 0.6).abs() < 1e-12);
        assert!((test_accuracy.std - 0.1).abs() < 1e-12);
        assert_eq!(test_accuracy.min, 0.5);
        assert_eq!(test_accuracy.max, 0.7);

        let test_auroc = summary
            .iter()
            .find(|s| s.evaluation_mode == EvaluationMode::Test && s.metric == "auroc")
            .unwrap();
        assert_eq!(test_auroc.count, 1);
        assert_eq!(summary[0].evaluation_mode, EvaluationMode::Train);
    }

    #[test]
    fn test_json() {
        let json = sample().to_json().unwrap();
        let back: Vec<PerformanceRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 4);
        assert_eq!(back[1].evaluation_mode, EvaluationMode::Test);
        assert!(json.contains("\"evaluation_mode\": \"test\""));
    }

    #[test]
    fn test_by_mode() {
        let result = sample();
        let holdouts: Vec<usize> = result.by_mode(EvaluationMode::Test).map(|r| r.holdout_number).collect();
        assert_eq!(holdouts, vec![0, 1]);
    }
}
