//! Pipeline factory

use super::{
    AlgorithmType, DecisionTreeClassifierPipeline, DecisionTreeRegressorPipeline,
    LinearRegressionPipeline, LogisticRegressionPipeline, Pipeline, PipelineConfig,
    RandomForestClassifierPipeline, RandomForestRegressorPipeline,
};
use crate::error::Result;
use crate::metric::MetricFactory;

/// Builds the concrete pipeline for a configuration's algorithm
pub struct PipelineFactory;

impl PipelineFactory {
    /// Validate `config` and wire a pipeline with a fresh model and the
    /// metric handler for the algorithm's model type.
    pub fn build(config: PipelineConfig) -> Result<Box<dyn Pipeline>> {
        config.validate()?;
        let handler = MetricFactory::get_handler(config.algorithm.model_type());

        let pipeline: Box<dyn Pipeline> = match config.algorithm {
            AlgorithmType::LinearRegression => Box::new(LinearRegressionPipeline::new(config, handler)),
            AlgorithmType::LogisticRegression => {
                Box::new(LogisticRegressionPipeline::new(config, handler))
            }
            AlgorithmType::DecisionTreeClassifier => {
                Box::new(DecisionTreeClassifierPipeline::new(config, handler))
            }
            AlgorithmType::DecisionTreeRegressor => {
                Box::new(DecisionTreeRegressorPipeline::new(config, handler))
            }
            AlgorithmType::RandomForest => Box::new(RandomForestClassifierPipeline::new(config, handler)),
            AlgorithmType::RandomForestRegressor => {
                Box::new(RandomForestRegressorPipeline::new(config, handler))
            }
        };
        Ok(pipeline)
    }

    /// Parse `tag` into the configuration's algorithm, then build.
    ///
    /// Fails with [`crate::PipelineError::UnsupportedAlgorithm`] naming the tag.
    pub fn build_with_tag(tag: &str, mut config: PipelineConfig) -> Result<Box<dyn Pipeline>> {
        config.algorithm = tag.parse()?;
        Self::build(config)
    }
}
