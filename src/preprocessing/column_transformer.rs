//! Column-wise composition of scalers

use super::scaler::{Scaler, ScalerParams, ScalerType};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Applies a different scaler to each of several disjoint column groups.
///
/// Columns that belong to no group pass through untouched and keep their
/// position in the frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnTransformer {
    transformers: Vec<(String, Scaler, Vec<String>)>,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scaler for `columns`. Empty groups are skipped.
    pub fn with_scaler(mut self, name: impl Into<String>, scaler_type: ScalerType, columns: Vec<String>) -> Self {
        if !columns.is_empty() {
            self.transformers
                .push((name.into(), Scaler::new(scaler_type), columns));
        }
        self
    }

    /// True when no column group is registered
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// All columns that are scaled, in registration order
    pub fn scaled_columns(&self) -> Vec<&str> {
        self.transformers
            .iter()
            .flat_map(|(_, _, cols)| cols.iter().map(String::as_str))
            .collect()
    }

    /// Learned parameters for a scaled column
    pub fn params(&self, column: &str) -> Option<(ScalerType, ScalerParams)> {
        self.transformers
            .iter()
            .find_map(|(_, scaler, _)| scaler.params(column).map(|p| (scaler.scaler_type(), p)))
    }

    fn check_disjoint(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, _, columns) in &self.transformers {
            for col in columns {
                if !seen.insert(col.as_str()) {
                    return Err(PipelineError::ConfigError(format!(
                        "column '{}' is assigned to more than one scaler (found again in '{}')",
                        col, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fit every registered scaler on `df`
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.check_disjoint()?;
        for (_, scaler, columns) in &mut self.transformers {
            scaler.fit(df, columns)?;
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the fitted scalers to `df`
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (_, scaler, _) in &self.transformers {
            result = scaler.transform(&result)?;
        }
        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> DataFrame {
        df!(
            "a" => &[1.0, 2.0, 3.0, 4.0],
            "b" => &[10.0, 20.0, 30.0, 40.0],
            "c" => &[5.0, 6.0, 7.0, 8.0],
        )
        .unwrap()
    }

    #[test]
    fn test_pass_through_columns_keep_order() {
        let df = sample();
        let mut ct = ColumnTransformer::new().with_scaler("minmax", ScalerType::MinMax, cols(&["b"]));
        let out = ct.fit_transform(&df).unwrap();

        let names: Vec<&str> = out.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        for name in ["a", "c"] {
            let before = df.column(name).unwrap().as_materialized_series();
            let after = out.column(name).unwrap().as_materialized_series();
            assert!(after.equals(before));
        }

        let b = out.column("b").unwrap().f64().unwrap();
        assert!((b.max().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        let mut ct = ColumnTransformer::new()
            .with_scaler("standard", ScalerType::Standard, cols(&["a", "b"]))
            .with_scaler("robust", ScalerType::Robust, cols(&["b"]));
        assert!(matches!(ct.fit(&sample()), Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_empty_groups_skipped() {
        let ct = ColumnTransformer::new()
            .with_scaler("standard", ScalerType::Standard, Vec::new())
            .with_scaler("robust", ScalerType::Robust, Vec::new());
        assert!(ct.is_empty());
    }

    #[test]
    fn test_params_lookup() {
        let mut ct = ColumnTransformer::new()
            .with_scaler("standard", ScalerType::Standard, cols(&["a"]))
            .with_scaler("minmax", ScalerType::MinMax, cols(&["c"]));
        ct.fit(&sample()).unwrap();

        let (kind, params) = ct.params("c").unwrap();
        assert_eq!(kind, ScalerType::MinMax);
        assert_eq!(params.center, 5.0);
        assert!(ct.params("b").is_none());
        assert_eq!(ct.scaled_columns(), vec!["a", "c"]);
    }
}
