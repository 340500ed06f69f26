//! Data preprocessing module
//!
//! Provides the column-wise scaling used ahead of model fitting:
//! - Feature scaling (standard, robust, min-max)
//! - A column transformer composing scalers over disjoint column groups
//! - Conversion from polars frames to the ndarray matrices the models consume

mod column_transformer;
mod scaler;

pub use column_transformer::ColumnTransformer;
pub use scaler::{Scaler, ScalerParams, ScalerType};

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
///
/// Missing values are rejected rather than filled.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.clone()))?;
            series_to_vec(column.as_materialized_series())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

/// Convert a numeric series into an `Array1<f64>`
pub fn series_to_array1(series: &Series) -> Result<Array1<f64>> {
    series_to_vec(series).map(Array1::from_vec)
}

fn series_to_vec(series: &Series) -> Result<Vec<f64>> {
    let name = series.name().to_string();
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| PipelineError::DataError(format!("column '{}' is not numeric: {}", name, e)))?;

    series_f64
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                PipelineError::DataError(format!("column '{}' contains missing values", name))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_to_array2_row_major() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4i64, 5, 6],
        )
        .unwrap();

        let x = columns_to_array2(&df, &["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(x.dim(), (3, 2));
        assert_eq!(x[[0, 0]], 4.0);
        assert_eq!(x[[2, 1]], 3.0);
    }

    #[test]
    fn test_missing_values_rejected() {
        let df = df!("a" => &[Some(1.0), None, Some(3.0)]).unwrap();
        let err = columns_to_array2(&df, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::DataError(_)));
    }

    #[test]
    fn test_unknown_column() {
        let df = df!("a" => &[1.0]).unwrap();
        let err = columns_to_array2(&df, &["z".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureNotFound(_)));
    }

    #[test]
    fn test_series_to_array1() {
        let s = Series::new("y".into(), &[0i32, 1, 1]);
        assert_eq!(series_to_array1(&s).unwrap(), Array1::from_vec(vec![0.0, 1.0, 1.0]));
    }
}
