//! ml-pipeline - configuration-driven supervised learning pipelines
//!
//! A [`PipelineConfig`] names a dataset, feature columns, a target and an
//! algorithm. The [`PipelineFactory`] turns it into a [`Pipeline`] that
//! loads, splits, scales, fits and predicts, and whose metric handler
//! evaluates the held-out rows.
//!
//! # Modules
//!
//! - [`pipeline`] - configuration, base services, concrete pipelines, factory, cross-validation
//! - [`metric`] - regression and classification metrics
//! - [`preprocessing`] - standard, robust and min-max scaling over column groups
//! - [`training`] - linear models, decision trees, random forests, k-fold
//! - [`io`] - CSV loading and model persistence
//! - [`telemetry`] - tracing setup and run reporting
//! - [`cli`] - command-line interface

pub mod error;

pub mod io;
pub mod metric;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub mod cli;
pub mod telemetry;

pub use error::{ErrorCategory, PipelineError, Result};
pub use metric::{MetricFactory, MetricHandler, MetricResult, ModelType};
pub use pipeline::{AlgorithmType, Pipeline, PipelineConfig, PipelineFactory, PredictionRun};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PipelineError, Result};

    pub use crate::io::{load_model, save_model, DataLoader, ModelArtifact};

    pub use crate::metric::{
        ClassProbabilities, ClassificationMetricResult, MetricFactory, MetricHandler, MetricResult,
        ModelType, RegressionMetricResult,
    };

    pub use crate::pipeline::{
        cross_validate, AlgorithmType, BasePipeline, CrossValidationReport, Pipeline, PipelineConfig,
        PipelineFactory, PredictionRun,
    };

    pub use crate::preprocessing::{ColumnTransformer, ScalerType};

    pub use crate::training::{DecisionTree, LinearRegression, LogisticRegression, RandomForest, TrainedModel};
}
