//! Per-class probability estimates

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Predicted class probabilities, one row per sample and one column per class.
///
/// `classes` holds the label of each column in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    classes: Vec<f64>,
    values: Array2<f64>,
}

impl ClassProbabilities {
    /// Wrap a probability matrix whose columns follow `classes`
    pub fn new(classes: Vec<f64>, values: Array2<f64>) -> Result<Self> {
        if classes.is_empty() {
            return Err(PipelineError::DataError(
                "class probabilities need at least one class".to_string(),
            ));
        }
        if values.ncols() != classes.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} probability columns", classes.len()),
                actual: format!("{} probability columns", values.ncols()),
            });
        }
        if classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::DataError(
                "class labels must be unique and sorted".to_string(),
            ));
        }
        Ok(Self { classes, values })
    }

    /// Build binary probabilities for labels {0, 1} from positive-class scores
    pub fn binary(positive_scores: Array1<f64>) -> Self {
        let n = positive_scores.len();
        let values = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 1 {
                positive_scores[i]
            } else {
                1.0 - positive_scores[i]
            }
        });
        Self {
            classes: vec![0.0, 1.0],
            values,
        }
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Probability column for the class at `class_idx`
    pub fn column(&self, class_idx: usize) -> Option<ArrayView1<'_, f64>> {
        (class_idx < self.n_classes()).then(|| self.values.column(class_idx))
    }

    /// Column index of a label, if the label is one of the classes
    pub fn class_index(&self, label: f64) -> Option<usize> {
        self.classes.iter().position(|&c| (c - label).abs() < 1e-9)
    }

    /// Most probable label per sample
    pub fn argmax_labels(&self) -> Array1<f64> {
        self.values
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best = 0;
                for (j, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = j;
                    }
                }
                self.classes[best]
            })
            .collect()
    }
}
