//! Regression metrics

use super::{check_lengths, ClassProbabilities, MetricHandler, MetricResult, ModelType};
use crate::error::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regression metric results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetricResult {
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    pub r_square: f64,
}

impl fmt::Display for RegressionMetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean_absolute_error={:.6}, mean_squared_error={:.6}, r_square={:.6}",
            self.mean_absolute_error, self.mean_squared_error, self.r_square
        )
    }
}

/// Computes MAE, MSE and R². Probabilities are ignored.
#[derive(Debug, Clone, Default)]
pub struct RegressionMetricHandler;

impl RegressionMetricHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let n = y_true.len() as f64;
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / n
    }

    pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let n = y_true.len() as f64;
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / n
    }

    /// 1 - SS_res / SS_tot, with the mean of `y_true` as baseline.
    ///
    /// A constant `y_true` gives 1.0 for a perfect fit and 0.0 otherwise.
    pub fn r_square(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let n = y_true.len() as f64;
        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();

        if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

impl MetricHandler for RegressionMetricHandler {
    fn model_type(&self) -> ModelType {
        ModelType::Regression
    }

    fn compute_metrics(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        _y_proba: Option<&ClassProbabilities>,
    ) -> Result<MetricResult> {
        check_lengths(y_true, y_pred)?;

        Ok(MetricResult::Regression(RegressionMetricResult {
            mean_absolute_error: Self::mean_absolute_error(y_true, y_pred),
            mean_squared_error: Self::mean_squared_error(y_true, y_pred),
            r_square: Self::r_square(y_true, y_pred),
        }))
    }
}
