//! Regression pipelines

use super::{BasePipeline, Pipeline, PipelineConfig, PreparedData};
use crate::error::Result;
use crate::metric::{ClassProbabilities, MetricHandler};
use crate::training::{DecisionTree, LinearRegression, RandomForest, TrainedModel};
use ndarray::Array1;

/// Ordinary least squares
#[derive(Debug)]
pub struct LinearRegressionPipeline {
    base: BasePipeline,
    model: LinearRegression,
    metric_handler: Box<dyn MetricHandler>,
}

impl LinearRegressionPipeline {
    pub fn new(config: PipelineConfig, metric_handler: Box<dyn MetricHandler>) -> Self {
        Self {
            base: BasePipeline::new(config),
            model: LinearRegression::new(),
            metric_handler,
        }
    }

    pub fn model(&self) -> &LinearRegression {
        &self.model
    }
}

impl Pipeline for LinearRegressionPipeline {
    fn base(&self) -> &BasePipeline {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePipeline {
        &mut self.base
    }

    fn metric_handler(&self) -> &dyn MetricHandler {
        self.metric_handler.as_ref()
    }

    fn fit_predict(&mut self, data: &PreparedData) -> Result<(Array1<f64>, Option<ClassProbabilities>)> {
        self.model.fit(&data.x_train, &data.y_train)?;
        Ok((self.model.predict(&data.x_test)?, None))
    }

    fn trained_model(&self) -> Option<TrainedModel> {
        self.model
            .is_fitted()
            .then(|| TrainedModel::LinearRegression(self.model.clone()))
    }
}

/// CART regressor with MSE splits
#[derive(Debug)]
pub struct DecisionTreeRegressorPipeline {
    base: BasePipeline,
    model: DecisionTree,
    metric_handler: Box<dyn MetricHandler>,
    is_fitted: bool,
}

impl DecisionTreeRegressorPipeline {
    pub fn new(config: PipelineConfig, metric_handler: Box<dyn MetricHandler>) -> Self {
        let model = DecisionTree::new_regressor().with_random_state(config.random_state);
        Self {
            base: BasePipeline::new(config),
            model,
            metric_handler,
            is_fitted: false,
        }
    }

    pub fn model(&self) -> &DecisionTree {
        &self.model
    }
}

impl Pipeline for DecisionTreeRegressorPipeline {
    fn base(&self) -> &BasePipeline {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePipeline {
        &mut self.base
    }

    fn metric_handler(&self) -> &dyn MetricHandler {
        self.metric_handler.as_ref()
    }

    fn fit_predict(&mut self, data: &PreparedData) -> Result<(Array1<f64>, Option<ClassProbabilities>)> {
        self.model.fit(&data.x_train, &data.y_train)?;
        self.is_fitted = true;
        Ok((self.model.predict(&data.x_test)?, None))
    }

    fn trained_model(&self) -> Option<TrainedModel> {
        self.is_fitted
            .then(|| TrainedModel::DecisionTreeRegressor(self.model.clone()))
    }
}

/// Bagged regression trees; predictions are the mean over trees
#[derive(Debug)]
pub struct RandomForestRegressorPipeline {
    base: BasePipeline,
    model: RandomForest,
    metric_handler: Box<dyn MetricHandler>,
}

impl RandomForestRegressorPipeline {
    pub fn new(config: PipelineConfig, metric_handler: Box<dyn MetricHandler>) -> Self {
        let model = RandomForest::new_regressor(100).with_random_state(config.random_state);
        Self {
            base: BasePipeline::new(config),
            model,
            metric_handler,
        }
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }
}

impl Pipeline for RandomForestRegressorPipeline {
    fn base(&self) -> &BasePipeline {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePipeline {
        &mut self.base
    }

    fn metric_handler(&self) -> &dyn MetricHandler {
        self.metric_handler.as_ref()
    }

    fn fit_predict(&mut self, data: &PreparedData) -> Result<(Array1<f64>, Option<ClassProbabilities>)> {
        self.model.fit(&data.x_train, &data.y_train)?;
        Ok((self.model.predict(&data.x_test)?, None))
    }

    fn trained_model(&self) -> Option<TrainedModel> {
        (self.model.n_trees() > 0).then(|| TrainedModel::RandomForestRegressor(self.model.clone()))
    }
}
