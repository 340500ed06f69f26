//! Integration tests for scaling and the column transformer

use ml_pipeline::preprocessing::{columns_to_array2, ColumnTransformer, Scaler, ScalerType};
use ml_pipeline::PipelineError;
use polars::prelude::*;

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn train() -> DataFrame {
    df!(
        "a" => &[1.0, 2.0, 3.0, 4.0, 5.0],
        "b" => &[10.0, 20.0, 30.0, 40.0, 1000.0],
        "c" => &[0.0, 5.0, 10.0, 15.0, 20.0],
        "d" => &[7.0, 7.0, 8.0, 8.0, 9.0],
    )
    .unwrap()
}

fn values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name).unwrap().f64().unwrap().into_no_null_iter().collect()
}

#[test]
fn test_standard_scaler_zero_mean_unit_variance() {
    let mut scaler = Scaler::new(ScalerType::Standard);
    let out = scaler.fit_transform(&train(), &cols(&["a"])).unwrap();
    let a = values(&out, "a");

    let mean: f64 = a.iter().sum::<f64>() / a.len() as f64;
    let var: f64 = a.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / a.len() as f64;
    assert!(mean.abs() < 1e-12);
    assert!((var - 1.0).abs() < 1e-9);
}

#[test]
fn test_robust_scaler_uses_median_and_iqr() {
    let mut scaler = Scaler::new(ScalerType::Robust);
    scaler.fit(&train(), &cols(&["b"])).unwrap();
    let params = scaler.params("b").unwrap();

    // median 30, quartiles 20 and 40
    assert_eq!(params.center, 30.0);
    assert_eq!(params.scale, 20.0);
}

#[test]
fn test_minmax_scaler_range() {
    let mut scaler = Scaler::new(ScalerType::MinMax);
    let out = scaler.fit_transform(&train(), &cols(&["c"])).unwrap();
    assert_eq!(values(&out, "c"), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn test_constant_column_does_not_divide_by_zero() {
    let df = df!("k" => &[3.0, 3.0, 3.0]).unwrap();
    let mut scaler = Scaler::new(ScalerType::Standard);
    let out = scaler.fit_transform(&df, &cols(&["k"])).unwrap();
    assert!(values(&out, "k").iter().all(|v| v.is_finite()));
}

#[test]
fn test_transformer_groups_and_pass_through() {
    let mut ct = ColumnTransformer::new()
        .with_scaler("scaler_standard", ScalerType::Standard, cols(&["a"]))
        .with_scaler("scaler_robust", ScalerType::Robust, cols(&["b"]))
        .with_scaler("scaler_minmax", ScalerType::MinMax, cols(&["c"]));

    let df = train();
    let out = ct.fit_transform(&df).unwrap();

    assert_eq!(out.width(), 4);
    assert_eq!(values(&out, "d"), values(&df, "d"));
    assert_eq!(values(&out, "c"), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(ct.params("b").unwrap().0, ScalerType::Robust);
}

#[test]
fn test_transformer_applies_train_statistics_to_test() {
    let mut ct = ColumnTransformer::new().with_scaler("scaler_minmax", ScalerType::MinMax, cols(&["c"]));
    ct.fit(&train()).unwrap();

    let test = df!("c" => &[40.0, -20.0]).unwrap();
    let out = ct.transform(&test).unwrap();
    assert_eq!(values(&out, "c"), vec![2.0, -1.0]);
}

#[test]
fn test_transform_before_fit() {
    let ct = ColumnTransformer::new().with_scaler("s", ScalerType::Standard, cols(&["a"]));
    assert!(matches!(ct.transform(&train()), Err(PipelineError::ModelNotFitted)));
}

#[test]
fn test_missing_scaled_column() {
    let mut ct = ColumnTransformer::new().with_scaler("s", ScalerType::Standard, cols(&["zz"]));
    assert!(matches!(ct.fit(&train()), Err(PipelineError::FeatureNotFound(_))));
}

#[test]
fn test_columns_to_array2_layout() {
    let x = columns_to_array2(&train(), &cols(&["c", "a"])).unwrap();
    assert_eq!(x.dim(), (5, 2));
    assert_eq!(x[[1, 0]], 5.0);
    assert_eq!(x[[1, 1]], 2.0);
}

#[test]
fn test_columns_to_array2_rejects_nulls() {
    let df = df!("a" => &[Some(1.0), None, Some(3.0)]).unwrap();
    assert!(matches!(
        columns_to_array2(&df, &cols(&["a"])),
        Err(PipelineError::DataError(_))
    ));
}
