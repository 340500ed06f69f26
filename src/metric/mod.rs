//! Evaluation metrics
//!
//! A [`MetricHandler`] turns ground truth and predictions into a
//! [`MetricResult`]. Which handler applies is decided by the [`ModelType`]
//! through the [`MetricFactory`]:
//! - [`RegressionMetricHandler`] - MAE, MSE, R²
//! - [`ClassificationMetricHandler`] - accuracy, ROC-AUC (needs probabilities)

mod classification;
mod factory;
mod probabilities;
mod regression;

pub use classification::{roc_auc_score, ClassificationMetricHandler, ClassificationMetricResult};
pub use factory::MetricFactory;
pub use probabilities::ClassProbabilities;
pub use regression::{RegressionMetricHandler, RegressionMetricResult};

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of supervised task a model solves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ModelType {
    Classification,
    Regression,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::Classification, ModelType::Regression];

    /// The configuration tag for this model type
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Classification => "classification",
            ModelType::Regression => "regression",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Ok(ModelType::Classification),
            "regression" => Ok(ModelType::Regression),
            _ => Err(PipelineError::InvalidModelType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ModelType {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Statistics computed for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricResult {
    Regression(RegressionMetricResult),
    Classification(ClassificationMetricResult),
}

impl MetricResult {
    pub fn model_type(&self) -> ModelType {
        match self {
            MetricResult::Regression(_) => ModelType::Regression,
            MetricResult::Classification(_) => ModelType::Classification,
        }
    }

    pub fn as_regression(&self) -> Option<&RegressionMetricResult> {
        match self {
            MetricResult::Regression(r) => Some(r),
            MetricResult::Classification(_) => None,
        }
    }

    pub fn as_classification(&self) -> Option<&ClassificationMetricResult> {
        match self {
            MetricResult::Classification(c) => Some(c),
            MetricResult::Regression(_) => None,
        }
    }

    /// Named metric values in a stable display order
    pub fn values(&self) -> Vec<(&'static str, f64)> {
        match self {
            MetricResult::Regression(r) => vec![
                ("mean_absolute_error", r.mean_absolute_error),
                ("mean_squared_error", r.mean_squared_error),
                ("r_square", r.r_square),
            ],
            MetricResult::Classification(c) => {
                vec![("accuracy", c.accuracy), ("roc_auc", c.roc_auc)]
            }
        }
    }

    /// Average each metric across results of the same kind.
    pub fn mean(results: &[MetricResult]) -> Result<MetricResult> {
        let first = results
            .first()
            .ok_or_else(|| PipelineError::ComputationError("no metric results to average".to_string()))?;
        let n = results.len() as f64;

        match first {
            MetricResult::Regression(_) => {
                let mut sum = RegressionMetricResult::default();
                for result in results {
                    let r = result.as_regression().ok_or_else(|| mixed_kinds(result))?;
                    sum.mean_absolute_error += r.mean_absolute_error;
                    sum.mean_squared_error += r.mean_squared_error;
                    sum.r_square += r.r_square;
                }
                Ok(MetricResult::Regression(RegressionMetricResult {
                    mean_absolute_error: sum.mean_absolute_error / n,
                    mean_squared_error: sum.mean_squared_error / n,
                    r_square: sum.r_square / n,
                }))
            }
            MetricResult::Classification(_) => {
                let mut accuracy = 0.0;
                let mut roc_auc = 0.0;
                for result in results {
                    let c = result.as_classification().ok_or_else(|| mixed_kinds(result))?;
                    accuracy += c.accuracy;
                    roc_auc += c.roc_auc;
                }
                Ok(MetricResult::Classification(ClassificationMetricResult {
                    accuracy: accuracy / n,
                    roc_auc: roc_auc / n,
                }))
            }
        }
    }
}

fn mixed_kinds(result: &MetricResult) -> PipelineError {
    PipelineError::ComputationError(format!(
        "cannot average {} metrics with metrics of another kind",
        result.model_type()
    ))
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricResult::Regression(r) => write!(f, "{}", r),
            MetricResult::Classification(c) => write!(f, "{}", c),
        }
    }
}

/// Computes the metrics relevant to one [`ModelType`]
pub trait MetricHandler: fmt::Debug + Send + Sync {
    /// The model type this handler evaluates
    fn model_type(&self) -> ModelType;

    /// Compute all metrics for the given ground truth and predictions.
    ///
    /// `y_proba` carries per-class probabilities; whether it is required
    /// depends on the handler.
    fn compute_metrics(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        y_proba: Option<&ClassProbabilities>,
    ) -> Result<MetricResult>;
}

pub(crate) fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.is_empty() {
        return Err(PipelineError::DataError("cannot compute metrics on empty input".to_string()));
    }
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::length_mismatch(y_true.len(), y_pred.len()));
    }
    Ok(())
}
