//! Pipelines
//!
//! A [`Pipeline`] owns one model and one [`MetricHandler`]. It loads the
//! configured dataset, splits it 70/30 with the configured seed, optionally
//! scales columns, fits its model and predicts the held-out rows. The
//! [`PipelineFactory`] builds the right pipeline for an [`AlgorithmType`].

mod algorithm;
mod base;
mod classification;
mod config;
mod cross_validation;
mod factory;
mod regression;

pub use algorithm::AlgorithmType;
pub use base::{BasePipeline, DatasetSplit, PreparedData, TEST_FRACTION};
pub use classification::{
    DecisionTreeClassifierPipeline, LogisticRegressionPipeline, RandomForestClassifierPipeline,
};
pub use config::PipelineConfig;
pub use cross_validation::{cross_validate, CrossValidationReport, FoldResult};
pub use factory::PipelineFactory;
pub use regression::{
    DecisionTreeRegressorPipeline, LinearRegressionPipeline, RandomForestRegressorPipeline,
};

use crate::error::Result;
use crate::metric::{ClassProbabilities, MetricHandler, MetricResult, ModelType};
use crate::training::TrainedModel;
use ndarray::Array1;

/// Outcome of one predict call: the prepared data plus what the model produced
#[derive(Debug, Clone)]
pub struct PredictionRun {
    data: PreparedData,
    predictions: Array1<f64>,
    probabilities: Option<ClassProbabilities>,
}

impl PredictionRun {
    pub fn new(data: PreparedData, predictions: Array1<f64>, probabilities: Option<ClassProbabilities>) -> Self {
        Self {
            data,
            predictions,
            probabilities,
        }
    }

    pub fn data(&self) -> &PreparedData {
        &self.data
    }

    /// Ground truth for the held-out rows
    pub fn y_test(&self) -> &Array1<f64> {
        &self.data.y_test
    }

    pub fn predictions(&self) -> &Array1<f64> {
        &self.predictions
    }

    /// Per-class probabilities; `None` for regression pipelines
    pub fn probabilities(&self) -> Option<&ClassProbabilities> {
        self.probabilities.as_ref()
    }

    /// The same run with the probabilities dropped
    pub fn without_probabilities(mut self) -> Self {
        self.probabilities = None;
        self
    }
}

/// Shared capability of every concrete pipeline
pub trait Pipeline: Send {
    fn base(&self) -> &BasePipeline;

    fn base_mut(&mut self) -> &mut BasePipeline;

    fn metric_handler(&self) -> &dyn MetricHandler;

    /// Fit the owned model on the training rows and predict the test rows
    fn fit_predict(&mut self, data: &PreparedData) -> Result<(Array1<f64>, Option<ClassProbabilities>)>;

    /// Snapshot of the fitted model, `None` before the first fit
    fn trained_model(&self) -> Option<TrainedModel>;

    fn config(&self) -> &PipelineConfig {
        self.base().config()
    }

    fn algorithm(&self) -> AlgorithmType {
        self.config().algorithm
    }

    fn model_type(&self) -> ModelType {
        self.metric_handler().model_type()
    }

    /// Load, split, preprocess, fit and predict.
    ///
    /// Calling it again repeats the whole cycle and replaces the fitted state.
    fn predict(&mut self) -> Result<PredictionRun> {
        let data = {
            let base = self.base();
            let split = base.load_and_split(TEST_FRACTION)?;
            base.prepare(&split)?
        };

        let (predictions, probabilities) = self.fit_predict(&data)?;
        self.base_mut().set_preprocessor(data.preprocessor.clone());
        Ok(PredictionRun::new(data, predictions, probabilities))
    }

    /// Evaluate a run against its held-out targets
    fn compute_metrics(&self, run: &PredictionRun) -> Result<MetricResult> {
        self.metric_handler()
            .compute_metrics(run.y_test(), run.predictions(), run.probabilities())
    }
}
