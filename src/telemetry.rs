//! Logging setup and run reporting
//!
//! Library code does not log. The entry point drives a [`RunReporter`] at
//! each stage of a run.

use crate::error::{ErrorCategory, PipelineError};
use crate::io::DatasetInfo;
use crate::metric::MetricResult;
use crate::pipeline::{CrossValidationReport, FoldResult, PipelineConfig, PredictionRun};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "ml_pipeline=info";

/// Install the global tracing subscriber.
///
/// An explicit `level` wins over `RUST_LOG`; without either the filter is
/// `ml_pipeline=info`. Calling it twice is harmless.
pub fn init_tracing(level: Option<&str>, json: bool) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("ml_pipeline={}", level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Category of the [`PipelineError`] behind `err`, if there is one
pub fn failure_category(err: &anyhow::Error) -> Option<ErrorCategory> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PipelineError>())
        .map(PipelineError::category)
}

/// Emits one structured event per pipeline stage
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReporter;

impl RunReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn config_accepted(&self, config: &PipelineConfig) {
        info!(
            algorithm = %config.algorithm,
            model_type = %config.algorithm.model_type(),
            data_path = %config.data_path.display(),
            target = %config.target_column,
            n_features = config.features.len(),
            random_state = config.random_state,
            "configuration accepted"
        );
        debug!(features = ?config.features, "feature columns");
    }

    pub fn dataset_loaded(&self, path: &Path, info: &DatasetInfo) {
        info!(
            path = %path.display(),
            rows = info.n_rows,
            columns = info.n_cols,
            "dataset loaded"
        );
    }

    pub fn predictions_produced(&self, run: &PredictionRun) {
        let data = run.data();
        info!(
            train_rows = data.x_train.nrows(),
            test_rows = data.x_test.nrows(),
            scaled = data.preprocessor.is_some(),
            "split and preprocessing done"
        );
        info!(
            predictions = run.predictions().len(),
            with_probabilities = run.probabilities().is_some(),
            "predictions produced"
        );
    }

    pub fn metrics_computed(&self, metrics: &MetricResult) {
        let values: Vec<String> = metrics
            .values()
            .iter()
            .map(|(name, value)| format!("{}={:.6}", name, value))
            .collect();
        info!(
            model_type = %metrics.model_type(),
            metrics = %values.join(" "),
            "metrics computed"
        );
    }

    pub fn model_saved(&self, path: &Path) {
        info!(path = %path.display(), "model saved");
    }

    pub fn model_not_saved(&self) {
        debug!("no out_file configured, model not saved");
    }

    pub fn fold_result(&self, fold: &FoldResult) {
        info!(
            fold = fold.fold,
            train_rows = fold.n_train,
            test_rows = fold.n_test,
            result = %fold.metrics,
            "fold evaluated"
        );
    }

    pub fn cv_summary(&self, report: &CrossValidationReport) {
        info!(folds = report.folds.len(), mean = %report.mean, "cross-validation finished");
    }

    pub fn run_failed(&self, err: &anyhow::Error) {
        match failure_category(err) {
            Some(category) => error!(category = ?category, error = %err, "run failed"),
            None => error!(error = %err, "run failed"),
        }
    }
}
