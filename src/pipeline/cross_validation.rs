//! K-fold evaluation of a pipeline

use super::{BasePipeline, Pipeline};
use crate::error::{PipelineError, Result};
use crate::metric::MetricResult;
use crate::training::KFold;
use serde::Serialize;

/// Metrics for one held-out fold
#[derive(Debug, Clone, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub metrics: MetricResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationReport {
    pub folds: Vec<FoldResult>,
    /// Per-metric mean over all folds
    pub mean: MetricResult,
}

/// Evaluate `pipeline` on `num_folds` shuffled folds.
///
/// The dataset is loaded once. For each fold the scalers are fitted on that
/// fold's training rows only. The model left in the pipeline is the one
/// fitted on the last fold.
pub fn cross_validate(pipeline: &mut dyn Pipeline, num_folds: usize) -> Result<CrossValidationReport> {
    if num_folds < 2 {
        return Err(PipelineError::ConfigError(format!(
            "cross-validation needs at least 2 folds, got {}",
            num_folds
        )));
    }

    let (features, target) = pipeline.base().load_dataset()?;
    let features = pipeline.base().select_features(&features)?;
    let splits = KFold::new(num_folds)
        .with_random_state(pipeline.config().random_state)
        .split(features.height())?;

    let mut folds = Vec::with_capacity(splits.len());
    let mut preprocessor = None;
    for cv in &splits {
        let split = BasePipeline::split_by_indices(&features, &target, &cv.train_indices, &cv.test_indices)?;
        let data = pipeline.base().prepare(&split)?;
        let (predictions, probabilities) = pipeline.fit_predict(&data)?;
        let metrics = pipeline
            .metric_handler()
            .compute_metrics(&data.y_test, &predictions, probabilities.as_ref())?;

        folds.push(FoldResult {
            fold: cv.fold_idx,
            n_train: split.n_train(),
            n_test: split.n_test(),
            metrics,
        });
        preprocessor = data.preprocessor;
    }
    pipeline.base_mut().set_preprocessor(preprocessor);

    let per_fold: Vec<MetricResult> = folds.iter().map(|f| f.metrics.clone()).collect();
    let mean = MetricResult::mean(&per_fold)?;
    Ok(CrossValidationReport { folds, mean })
}
