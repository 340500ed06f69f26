//! Model persistence

use crate::error::{PipelineError, Result};
use crate::metric::{ClassProbabilities, ModelType};
use crate::pipeline::{AlgorithmType, Pipeline};
use crate::preprocessing::{columns_to_array2, ColumnTransformer};
use crate::training::TrainedModel;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A fitted model plus what is needed to feed it new rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub algorithm: AlgorithmType,
    pub model_type: ModelType,
    pub features: Vec<String>,
    pub target_column: String,
    pub random_state: u64,
    pub created_at: DateTime<Utc>,
    /// Scalers fitted on the training rows, if any were configured
    #[serde(default)]
    pub preprocessor: Option<ColumnTransformer>,
    pub model: TrainedModel,
}

impl ModelArtifact {
    /// Snapshot a pipeline that has been run
    pub fn from_pipeline(pipeline: &dyn Pipeline) -> Result<Self> {
        let model = pipeline.trained_model().ok_or(PipelineError::ModelNotFitted)?;
        let config = pipeline.config();

        Ok(Self {
            algorithm: config.algorithm,
            model_type: pipeline.model_type(),
            features: config.features.clone(),
            target_column: config.target_column.clone(),
            random_state: config.random_state,
            created_at: Utc::now(),
            preprocessor: pipeline.base().preprocessor().cloned(),
            model,
        })
    }

    /// Predict from an already preprocessed feature matrix
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_width(x)?;
        self.model.predict(x)
    }

    /// Class probabilities from an already preprocessed feature matrix
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<ClassProbabilities>> {
        self.check_width(x)?;
        self.model.predict_proba(x)
    }

    /// Select the stored features from `df`, apply the stored scalers and predict
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.prepare_frame(df)?;
        self.model.predict(&x)
    }

    fn prepare_frame(&self, df: &DataFrame) -> Result<Array2<f64>> {
        for name in &self.features {
            if df.column(name).is_err() {
                return Err(PipelineError::FeatureNotFound(name.clone()));
            }
        }
        let selected = df.select(self.features.iter().map(|s| s.as_str()))?;
        let scaled = match &self.preprocessor {
            Some(transformer) => transformer.transform(&selected)?,
            None => selected,
        };
        columns_to_array2(&scaled, &self.features)
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.features.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.features.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }
}

/// Serialize the fitted model of `pipeline` to `path` as JSON
pub fn save_model(pipeline: &dyn Pipeline, path: impl AsRef<Path>) -> Result<ModelArtifact> {
    let artifact = ModelArtifact::from_pipeline(pipeline)?;
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(writer, &artifact)?;
    Ok(artifact)
}

/// Read an artifact written by [`save_model`]
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelArtifact> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}
