//! Feature scaling implementations

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Robust scaling using median and IQR
    Robust,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
}

impl ScalerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalerType::Standard => "standard",
            ScalerType::Robust => "robust",
            ScalerType::MinMax => "minmax",
        }
    }
}

/// Parameters learned for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// mean, median, or min
    pub center: f64,
    /// std, IQR, or range
    pub scale: f64,
}

/// Column-wise feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    /// Learned parameters for a column, once fitted
    pub fn params(&self, column: &str) -> Option<ScalerParams> {
        self.params
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, p)| *p)
    }

    /// Fit the scaler on `columns` of `df`. Refitting discards earlier parameters.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());
        for col_name in columns {
            let series = numeric_column(df, col_name)?;
            params.push((col_name.clone(), self.compute_params(col_name, &series)?));
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale the fitted columns of `df`; other columns pass through unchanged.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        // Build all scaled columns first, then apply them in one pass
        let replacements: Vec<Series> = self
            .params
            .iter()
            .map(|(col_name, params)| {
                let series = numeric_column(df, col_name)?;
                self.scale_series(&series, params)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn compute_params(&self, col_name: &str, series: &Series) -> Result<ScalerParams> {
        let ca = series.f64()?;
        let empty = || PipelineError::DataError(format!("column '{}' has no values to fit", col_name));

        match self.scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().ok_or_else(empty)?;
                // population standard deviation
                let std = ca.std(0).unwrap_or(0.0);
                Ok(ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                })
            }
            ScalerType::Robust => {
                let median = ca.median().ok_or_else(empty)?;
                let q1 = ca.quantile(0.25, QuantileMethod::Linear)?.ok_or_else(empty)?;
                let q3 = ca.quantile(0.75, QuantileMethod::Linear)?.ok_or_else(empty)?;
                let iqr = q3 - q1;
                Ok(ScalerParams {
                    center: median,
                    scale: if iqr == 0.0 { 1.0 } else { iqr },
                })
            }
            ScalerType::MinMax => {
                let min = ca.min().ok_or_else(empty)?;
                let max = ca.max().ok_or_else(empty)?;
                let range = max - min;
                Ok(ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                })
            }
        }
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series.f64()?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.center) / params.scale))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

/// Fetch a column as Float64
fn numeric_column(df: &DataFrame, col_name: &str) -> Result<Series> {
    let column = df
        .column(col_name)
        .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
    column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| PipelineError::DataError(format!("column '{}' is not numeric: {}", col_name, e)))
}
