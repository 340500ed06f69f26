//! Classification pipelines
//!
//! Each returns per-class probabilities alongside the predicted labels.

use super::{BasePipeline, Pipeline, PipelineConfig, PreparedData};
use crate::error::Result;
use crate::metric::{ClassProbabilities, MetricHandler};
use crate::training::{DecisionTree, LogisticRegression, RandomForest, TrainedModel};
use ndarray::Array1;

/// Logistic regression, one-vs-rest beyond two classes
#[derive(Debug)]
pub struct LogisticRegressionPipeline {
    base: BasePipeline,
    model: LogisticRegression,
    metric_handler: Box<dyn MetricHandler>,
}

impl LogisticRegressionPipeline {
    pub fn new(config: PipelineConfig, metric_handler: Box<dyn MetricHandler>) -> Self {
        Self {
            base: BasePipeline::new(config),
            model: LogisticRegression::new(),
            metric_handler,
        }
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }
}

impl Pipeline for LogisticRegressionPipeline {
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
        let predictions = self.model.predict(&data.x_test)?;
        let proba = ClassProbabilities::new(
            self.model.classes().to_vec(),
            self.model.predict_proba(&data.x_test)?,
        )?;
        Ok((predictions, Some(proba)))
    }

    fn trained_model(&self) -> Option<TrainedModel> {
        self.model
            .is_fitted()
            .then(|| TrainedModel::LogisticRegression(self.model.clone()))
    }
}

/// CART classifier with Gini splits
#[derive(Debug)]
pub struct DecisionTreeClassifierPipeline {
    base: BasePipeline,
    model: DecisionTree,
    metric_handler: Box<dyn MetricHandler>,
    is_fitted: bool,
}

impl DecisionTreeClassifierPipeline {
    pub fn new(config: PipelineConfig, metric_handler: Box<dyn MetricHandler>) -> Self {
        let model = DecisionTree::new_classifier().with_random_state(config.random_state);
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

impl Pipeline for DecisionTreeClassifierPipeline {
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
        let predictions = self.model.predict(&data.x_test)?;
        let proba = ClassProbabilities::new(
            self.model.classes().to_vec(),
            self.model.predict_proba(&data.x_test)?,
        )?;
        Ok((predictions, Some(proba)))
    }

    fn trained_model(&self) -> Option<TrainedModel> {
        self.is_fitted
            .then(|| TrainedModel::DecisionTreeClassifier(self.model.clone()))
    }
}

/// Bagged classification trees; probabilities are averaged over trees
#[derive(Debug)]
pub struct RandomForestClassifierPipeline {
    base: BasePipeline,
    model: RandomForest,
    metric_handler: Box<dyn MetricHandler>,
}

impl RandomForestClassifierPipeline {
    pub fn new(config: PipelineConfig, metric_handler: Box<dyn MetricHandler>) -> Self {
        let model = RandomForest::new_classifier(100).with_random_state(config.random_state);
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

impl Pipeline for RandomForestClassifierPipeline {
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
        let predictions = self.model.predict(&data.x_test)?;
        let proba = ClassProbabilities::new(
            self.model.classes().to_vec(),
            self.model.predict_proba(&data.x_test)?,
        )?;
        Ok((predictions, Some(proba)))
    }

    fn trained_model(&self) -> Option<TrainedModel> {
        (self.model.n_trees() > 0).then(|| TrainedModel::RandomForestClassifier(self.model.clone()))
    }
}
