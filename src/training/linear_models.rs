//! Linear model implementations

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system Ax = b by Cholesky decomposition.
///
/// A matrix that is not positive definite gets a tiny ridge added once before
/// giving up.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    cholesky_factor(a)
        .or_else(|| {
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
            let mut a_reg = a.clone();
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            cholesky_factor(&a_reg)
        })
        .map(|l| {
            // Forward substitution: L * y = b
            let mut y = Array1::zeros(n);
            for i in 0..n {
                let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
                y[i] = (b[i] - sum) / l[[i, i]];
            }

            // Backward substitution: L^T * x = y
            let mut x = Array1::zeros(n);
            for i in (0..n).rev() {
                let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
                x[i] = (y[i] - sum) / l[[i, i]];
            }
            x
        })
}

/// Lower-triangular L with A = L * L^T
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Gauss-Jordan inversion with partial pivoting, used when Cholesky fails
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // Augmented matrix [M | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let max_row = (col..n)
            .max_by(|&a, &b| aug[[a, col]].abs().total_cmp(&aug[[b, col]].abs()))
            .unwrap_or(col);

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.slice(ndarray::s![.., n..]).to_owned())
}

fn check_samples(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(PipelineError::TrainingError("cannot fit on an empty training set".to_string()));
    }
    Ok(())
}

fn check_features(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(PipelineError::ShapeError {
            expected: format!("{} features", expected),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

/// Per-column mean and population std; constant columns get a std of 1
fn column_moments(x: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| PipelineError::TrainingError("empty feature matrix".to_string()))?;
    let std = x
        .std_axis(Axis(0), 0.0)
        .mapv(|s| if s > 0.0 && s.is_finite() { s } else { 1.0 });
    Ok((mean, std))
}

/// Sorted unique labels of a classification target
pub(crate) fn unique_classes(y: &Array1<f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = y.iter().copied().collect();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup();
    classes
}

/// Ordinary least squares linear regression with an intercept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fit the model by solving the normal equations (X^T X) w = X^T y
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_samples(x, y)?;

        // Center data so the intercept drops out of the normal equations
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::TrainingError("empty feature matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_work = x - &x_mean.view().insert_axis(Axis(0));
        let y_work = y - y_mean;

        let xtx = x_work.t().dot(&x_work);
        let xty = x_work.t().dot(&y_work);

        let coefficients = cholesky_solve(&xtx, &xty)
            .or_else(|| matrix_inverse(&xtx).map(|inv| inv.dot(&xty)))
            .ok_or_else(|| {
                PipelineError::ComputationError(
                    "Matrix is singular, cannot solve least squares".to_string(),
                )
            })?;

        let intercept = y_mean - coefficients.dot(&x_mean);

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        check_features(coefficients.len(), x)?;
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }
}

/// One binary logistic model
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinaryLogit {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl BinaryLogit {
    fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        sigmoid(&(x.dot(&self.coefficients) + self.intercept))
    }
}

fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
    z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

/// Logistic regression trained by gradient descent with an L2 penalty.
///
/// Two classes fit a single model for the greater label; more classes fit
/// one model per class (one-vs-rest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Regularization strength (L2)
    pub alpha: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    classes: Vec<f64>,
    estimators: Vec<BinaryLogit>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            classes: Vec::new(),
            estimators: Vec::new(),
        }
    }

    /// Class labels in probability column order
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        !self.estimators.is_empty()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_samples(x, y)?;

        let classes = unique_classes(y);
        if classes.len() < 2 {
            return Err(PipelineError::TrainingError(
                "logistic regression needs at least two classes".to_string(),
            ));
        }

        let targets: Vec<f64> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        // Descend in standardized space so raw feature magnitudes cannot
        // saturate the sigmoid, then map the weights back to raw units
        let (mean, std) = column_moments(x)?;
        let x_std = (x - &mean.view().insert_axis(Axis(0))) / &std.view().insert_axis(Axis(0));

        self.estimators = targets
            .iter()
            .map(|&label| {
                let y_bin = y.mapv(|v| if v == label { 1.0 } else { 0.0 });
                let scaled = self.fit_binary(&x_std, &y_bin);
                let coefficients = &scaled.coefficients / &std;
                BinaryLogit {
                    intercept: scaled.intercept - coefficients.dot(&mean),
                    coefficients,
                }
            })
            .collect();
        self.classes = classes;

        Ok(self)
    }

    fn fit_binary(&self, x: &Array2<f64>, y: &Array1<f64>) -> BinaryLogit {
        let n_samples = x.nrows() as f64;
        let mut weights = Array1::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..self.max_iter {
            let predictions = sigmoid(&(x.dot(&weights) + bias));

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples) + (self.alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - self.learning_rate * dw;
            bias -= self.learning_rate * db;
        }

        BinaryLogit {
            coefficients: weights,
            intercept: bias,
        }
    }

    /// Class probabilities, one column per entry of [`Self::classes`]
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let first = self.estimators.first().ok_or(PipelineError::ModelNotFitted)?;
        check_features(first.coefficients.len(), x)?;
        let n = x.nrows();

        if self.classes.len() == 2 {
            let p = first.predict_proba(x);
            return Ok(Array2::from_shape_fn((n, 2), |(i, j)| if j == 1 { p[i] } else { 1.0 - p[i] }));
        }

        let mut proba = Array2::zeros((n, self.classes.len()));
        for (j, estimator) in self.estimators.iter().enumerate() {
            proba.column_mut(j).assign(&estimator.predict_proba(x));
        }

        // Normalize one-vs-rest scores per row
        let k = self.classes.len() as f64;
        for mut row in proba.rows_mut() {
            let sum = row.sum();
            if sum > 0.0 {
                row /= sum;
            } else {
                row.fill(1.0 / k);
            }
        }

        Ok(proba)
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;

        if self.classes.len() == 2 {
            let (neg, pos) = (self.classes[0], self.classes[1]);
            return Ok(proba.column(1).mapv(|p| if p >= 0.5 { pos } else { neg }));
        }

        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = j;
                    }
                }
                self.classes[best]
            })
            .collect())
    }
}
