//! Shared pipeline services: loading, splitting, preprocessing

use super::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::io::DataLoader;
use crate::preprocessing::{columns_to_array2, series_to_array1, ColumnTransformer, ScalerType};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fraction of rows held out for evaluation
pub const TEST_FRACTION: f64 = 0.3;

/// Train/test partition of the feature table and target
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
}

impl DatasetSplit {
    pub fn n_train(&self) -> usize {
        self.x_train.height()
    }

    pub fn n_test(&self) -> usize {
        self.x_test.height()
    }
}

/// Model-ready matrices for one split
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Fitted on the training rows; `None` when no scaling is configured
    pub preprocessor: Option<ColumnTransformer>,
}

/// Services every concrete pipeline builds on
#[derive(Debug, Clone)]
pub struct BasePipeline {
    config: PipelineConfig,
    loader: DataLoader,
    preprocessor: Option<ColumnTransformer>,
}

impl BasePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            loader: DataLoader::new(),
            preprocessor: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Preprocessor fitted by the last run
    pub fn preprocessor(&self) -> Option<&ColumnTransformer> {
        self.preprocessor.as_ref()
    }

    pub(crate) fn set_preprocessor(&mut self, preprocessor: Option<ColumnTransformer>) {
        self.preprocessor = preprocessor;
    }

    /// Load the configured file as (features, target)
    pub fn load_dataset(&self) -> Result<(DataFrame, Series)> {
        self.loader
            .load_dataset(&self.config.data_path, &self.config.target_column)
    }

    /// Restrict the feature table to the configured features, in order
    pub fn select_features(&self, features: &DataFrame) -> Result<DataFrame> {
        for name in &self.config.features {
            if features.column(name).is_err() {
                return Err(PipelineError::FeatureNotFound(name.clone()));
            }
        }
        Ok(features.select(self.config.features.iter().map(|s| s.as_str()))?)
    }

    /// Seeded random train/test partition.
    ///
    /// The test set gets `ceil(n * test_fraction)` rows. The same seed always
    /// yields the same partition.
    pub fn split(&self, features: &DataFrame, target: &Series, test_fraction: f64) -> Result<DatasetSplit> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "test fraction must be in (0, 1), got {}",
                test_fraction
            )));
        }

        let features = self.select_features(features)?;
        let n = features.height();
        if target.len() != n {
            return Err(PipelineError::length_mismatch(n, target.len()));
        }

        let n_test = (n as f64 * test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(PipelineError::DataError(format!(
                "{} rows are too few for a train/test split",
                n
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        Self::split_by_indices(&features, target, train_idx, test_idx)
    }

    /// Partition rows by explicit train and test indices
    pub fn split_by_indices(
        features: &DataFrame,
        target: &Series,
        train_idx: &[usize],
        test_idx: &[usize],
    ) -> Result<DatasetSplit> {
        let train = to_idx(train_idx);
        let test = to_idx(test_idx);

        Ok(DatasetSplit {
            x_train: features.take(&train)?,
            x_test: features.take(&test)?,
            y_train: target.take(&train)?,
            y_test: target.take(&test)?,
        })
    }

    /// Load and split with the configured seed
    pub fn load_and_split(&self, test_fraction: f64) -> Result<DatasetSplit> {
        let (features, target) = self.load_dataset()?;
        self.split(&features, &target, test_fraction)
    }

    /// Column transformer for the configured scaling groups, not yet fitted
    pub fn build_preprocessor(&self) -> ColumnTransformer {
        ColumnTransformer::new()
            .with_scaler("scaler_standard", ScalerType::Standard, self.config.scale_standard.clone())
            .with_scaler("scaler_robust", ScalerType::Robust, self.config.scale_robust.clone())
            .with_scaler("scaler_minmax", ScalerType::MinMax, self.config.scale_minmax.clone())
    }

    /// Scale the configured columns, fitting on `x_train` only.
    ///
    /// Without any scaling group the inputs come back unchanged and no
    /// transformer is returned.
    pub fn preprocess(
        &self,
        x_train: &DataFrame,
        x_test: &DataFrame,
    ) -> Result<(DataFrame, DataFrame, Option<ColumnTransformer>)> {
        if !self.config.has_scaling() {
            return Ok((x_train.clone(), x_test.clone(), None));
        }

        let mut transformer = self.build_preprocessor();
        transformer.fit(x_train)?;
        let x_train = transformer.transform(x_train)?;
        let x_test = transformer.transform(x_test)?;
        Ok((x_train, x_test, Some(transformer)))
    }

    /// Preprocess a split and convert it to model-ready matrices
    pub fn prepare(&self, split: &DatasetSplit) -> Result<PreparedData> {
        let (x_train, x_test, preprocessor) = self.preprocess(&split.x_train, &split.x_test)?;

        Ok(PreparedData {
            x_train: columns_to_array2(&x_train, &self.config.features)?,
            x_test: columns_to_array2(&x_test, &self.config.features)?,
            y_train: series_to_array1(&split.y_train)?,
            y_test: series_to_array1(&split.y_test)?,
            preprocessor,
        })
    }
}

fn to_idx(indices: &[usize]) -> IdxCa {
    IdxCa::from_vec("idx".into(), indices.iter().map(|&i| i as IdxSize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AlgorithmType;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn frame() -> (DataFrame, Series) {
        let n = 20;
        let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..n).map(|i| (i * i) as f64).collect();
        let c: Vec<f64> = (0..n).map(|i| 100.0 - i as f64).collect();
        let y: Vec<f64> = (0..n).map(|i| 2.0 * i as f64).collect();
        let df = df!("a" => a, "b" => b, "c" => c).unwrap();
        (df, Series::new("y".into(), y))
    }

    fn base(features: &[&str]) -> BasePipeline {
        BasePipeline::new(PipelineConfig::new(
            "unused.csv",
            cols(features),
            "y",
            AlgorithmType::LinearRegression,
        ))
    }

    #[test]
    fn test_split_sizes_and_feature_order() {
        let (df, y) = frame();
        let split = base(&["c", "a"]).split(&df, &y, TEST_FRACTION).unwrap();

        assert_eq!(split.n_test(), 6);
        assert_eq!(split.n_train(), 14);
        assert_eq!(split.y_test.len(), 6);
        let names: Vec<String> = split.x_train.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_split_is_deterministic() {
        let (df, y) = frame();
        let first = base(&["a"]).split(&df, &y, TEST_FRACTION).unwrap();
        let second = base(&["a"]).split(&df, &y, TEST_FRACTION).unwrap();

        assert!(first.x_test.equals(&second.x_test));
        assert!(first.y_train.equals(&second.y_train));
    }

    #[test]
    fn test_rows_stay_aligned_with_target() {
        let (df, y) = frame();
        let split = base(&["a"]).split(&df, &y, TEST_FRACTION).unwrap();

        let a = series_to_array1(split.x_test.column("a").unwrap().as_materialized_series()).unwrap();
        let y_test = series_to_array1(&split.y_test).unwrap();
        for (x, t) in a.iter().zip(y_test.iter()) {
            assert_eq!(*t, 2.0 * x);
        }
    }

    #[test]
    fn test_unknown_feature() {
        let (df, y) = frame();
        let err = base(&["a", "zzz"]).split(&df, &y, TEST_FRACTION).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureNotFound(ref f) if f == "zzz"));
    }

    #[test]
    fn test_too_few_rows() {
        let df = df!("a" => &[1.0]).unwrap();
        let y = Series::new("y".into(), &[1.0]);
        assert!(base(&["a"]).split(&df, &y, TEST_FRACTION).is_err());
    }

    #[test]
    fn test_preprocess_identity_without_scaling() {
        let (df, y) = frame();
        let base = base(&["a", "b"]);
        let split = base.split(&df, &y, TEST_FRACTION).unwrap();

        let (train, test, transformer) = base.preprocess(&split.x_train, &split.x_test).unwrap();
        assert!(transformer.is_none());
        assert!(train.equals(&split.x_train));
        assert!(test.equals(&split.x_test));
    }

    #[test]
    fn test_preprocess_fits_on_train_only() {
        let (df, y) = frame();
        let config = PipelineConfig::new("unused.csv", cols(&["a", "b"]), "y", AlgorithmType::LinearRegression)
            .with_scale_minmax(cols(&["a"]));
        let base = BasePipeline::new(config);
        let split = base.split(&df, &y, TEST_FRACTION).unwrap();

        let (_, _, fitted) = base.preprocess(&split.x_train, &split.x_test).unwrap();

        // Same training rows, very different test rows
        let shifted_test = df!("a" => &[1e6, -1e6], "b" => &[0.0, 0.0]).unwrap();
        let (_, _, refit) = base.preprocess(&split.x_train, &shifted_test).unwrap();

        assert_eq!(fitted.unwrap().params("a"), refit.unwrap().params("a"));
    }
}
