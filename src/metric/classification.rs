//! Classification metrics

use super::{check_lengths, ClassProbabilities, MetricHandler, MetricResult, ModelType};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification metric results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetricResult {
    pub accuracy: f64,
    pub roc_auc: f64,
}

impl fmt::Display for ClassificationMetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "accuracy={:.6}, roc_auc={:.6}", self.accuracy, self.roc_auc)
    }
}

/// Computes accuracy and ROC-AUC.
///
/// ROC-AUC is a ranking metric over probability scores, so `y_proba` is
/// mandatory: calling [`MetricHandler::compute_metrics`] without it fails
/// with [`PipelineError::MissingProbabilities`].
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetricHandler;

impl ClassificationMetricHandler {
    pub fn new() -> Self {
        Self
    }

    /// Fraction of predictions equal to the true label
    pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 1e-9)
            .count();
        correct as f64 / y_true.len() as f64
    }
}

impl MetricHandler for ClassificationMetricHandler {
    fn model_type(&self) -> ModelType {
        ModelType::Classification
    }

    fn compute_metrics(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        y_proba: Option<&ClassProbabilities>,
    ) -> Result<MetricResult> {
        check_lengths(y_true, y_pred)?;
        let y_proba = y_proba.ok_or(PipelineError::MissingProbabilities)?;

        Ok(MetricResult::Classification(ClassificationMetricResult {
            accuracy: Self::accuracy(y_true, y_pred),
            roc_auc: roc_auc_score(y_true, y_proba)?,
        }))
    }
}

/// Area under the ROC curve.
///
/// With two classes the second column scores the positive class. With more,
/// each class present in `y_true` is scored one-vs-rest and the areas are
/// averaged without weighting.
pub fn roc_auc_score(y_true: &Array1<f64>, y_proba: &ClassProbabilities) -> Result<f64> {
    if y_true.len() != y_proba.n_samples() {
        return Err(PipelineError::length_mismatch(y_true.len(), y_proba.n_samples()));
    }

    let mut class_counts = vec![0usize; y_proba.n_classes()];
    for &label in y_true.iter() {
        let idx = y_proba.class_index(label).ok_or_else(|| {
            PipelineError::ComputationError(format!(
                "label {} in y_true has no probability column",
                label
            ))
        })?;
        class_counts[idx] += 1;
    }

    let present = class_counts.iter().filter(|&&c| c > 0).count();
    if present < 2 {
        return Err(PipelineError::ComputationError(
            "ROC AUC is undefined when y_true contains a single class".to_string(),
        ));
    }

    let one_vs_rest = |class_idx: usize| -> Result<f64> {
        let label = y_proba.classes()[class_idx];
        let positives: Vec<bool> = y_true.iter().map(|&y| (y - label).abs() < 1e-9).collect();
        let scores = y_proba.column(class_idx).ok_or_else(|| {
            PipelineError::ComputationError(format!("missing probability column {}", class_idx))
        })?;
        binary_auc(scores, &positives)
    };

    if y_proba.n_classes() == 2 {
        return one_vs_rest(1);
    }

    let mut total = 0.0;
    for (class_idx, &count) in class_counts.iter().enumerate() {
        if count > 0 {
            total += one_vs_rest(class_idx)?;
        }
    }
    Ok(total / present as f64)
}

/// Trapezoid area under the ROC curve, with tied scores sharing one threshold.
fn binary_auc(scores: ArrayView1<'_, f64>, positives: &[bool]) -> Result<f64> {
    let n_pos = positives.iter().filter(|&&p| p).count();
    let n_neg = positives.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(PipelineError::ComputationError(
            "ROC AUC needs both positive and negative samples".to_string(),
        ));
    }

    let mut scored: Vec<(f64, bool)> = scores.iter().copied().zip(positives.iter().copied()).collect();
    if scored.iter().any(|(s, _)| s.is_nan()) {
        return Err(PipelineError::ComputationError("probability scores contain NaN".to_string()));
    }
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut area = 0.0;
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < scored.len() {
        let threshold = scored[i].0;
        let (prev_tp, prev_fp) = (tp, fp);
        while i < scored.len() && scored[i].0 == threshold {
            if scored[i].1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        let dx = (fp - prev_fp) as f64 / n_neg as f64;
        let y_avg = (prev_tp + tp) as f64 / 2.0 / n_pos as f64;
        area += dx * y_avg;
    }

    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![0.0, 1.0, 1.0, 0.0, 1.0, 0.0];
        let y_pred = array![0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let y_proba = ClassProbabilities::binary(array![0.2, 0.8, 0.9, 0.3, 0.4, 0.6]);

        let result = ClassificationMetricHandler::new()
            .compute_metrics(&y_true, &y_pred, Some(&y_proba))
            .unwrap();
        let c = result.as_classification().unwrap();

        assert!((c.accuracy - 4.0 / 6.0).abs() < 1e-9);
        assert!((c.roc_auc - 0.89).abs() < 1e-2);
    }

    #[test]
    fn test_missing_probabilities_fails() {
        let y_true = array![0.0, 1.0];
        let y_pred = array![0.0, 1.0];

        let err = ClassificationMetricHandler::new()
            .compute_metrics(&y_true, &y_pred, None)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingProbabilities));
    }

    #[test]
    fn test_auc_with_ties() {
        let y_true = array![1.0, 1.0, 0.0, 0.0];
        let proba = ClassProbabilities::binary(array![0.9, 0.4, 0.4, 0.2]);
        let auc = roc_auc_score(&y_true, &proba).unwrap();
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_and_inverted_ranking() {
        let y_true = array![0.0, 0.0, 1.0, 1.0];
        let perfect = ClassProbabilities::binary(array![0.1, 0.2, 0.8, 0.9]);
        let inverted = ClassProbabilities::binary(array![0.9, 0.8, 0.2, 0.1]);
        assert!((roc_auc_score(&y_true, &perfect).unwrap() - 1.0).abs() < 1e-12);
        assert!(roc_auc_score(&y_true, &inverted).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_multiclass_one_vs_rest() {
        let y_true = array![0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let values = array![
            [0.8, 0.1, 0.1],
            [0.1, 0.8, 0.1],
            [0.1, 0.1, 0.8],
            [0.7, 0.2, 0.1],
            [0.2, 0.7, 0.1],
            [0.1, 0.2, 0.7],
        ];
        let proba = ClassProbabilities::new(vec![0.0, 1.0, 2.0], values).unwrap();
        let auc = roc_auc_score(&y_true, &proba).unwrap();
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_is_undefined() {
        let y_true = array![1.0, 1.0, 1.0];
        let proba = ClassProbabilities::binary(array![0.2, 0.5, 0.9]);
        assert!(roc_auc_score(&y_true, &proba).is_err());
    }

    #[test]
    fn test_unknown_label_fails() {
        let y_true = array![0.0, 2.0];
        let proba = ClassProbabilities::binary(array![0.2, 0.9]);
        assert!(roc_auc_score(&y_true, &proba).is_err());
    }
}
