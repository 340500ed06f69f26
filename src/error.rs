//! Error types for the pipeline harness

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Coarse classification of a failure, logged by the entry point when a run fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad configuration: unknown tags, invalid column sets, bad fold counts
    Configuration,
    /// Problems with the loaded dataset
    Data,
    /// A caller broke an API contract
    Contract,
    /// Fitting, prediction or numeric failures
    Model,
    /// Filesystem and serialization failures
    Io,
}

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unsupported algorithm: '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("Invalid model type: '{0}'")]
    InvalidModelType(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Target column '{0}' not found in the dataset")]
    TargetColumnNotFound(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Probabilities are required to compute classification metrics")]
    MissingProbabilities,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PipelineError {
    /// Which part of the error taxonomy this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::UnsupportedAlgorithm(_)
            | PipelineError::InvalidModelType(_)
            | PipelineError::ConfigError(_) => ErrorCategory::Configuration,
            PipelineError::TargetColumnNotFound(_)
            | PipelineError::FeatureNotFound(_)
            | PipelineError::DataError(_) => ErrorCategory::Data,
            PipelineError::MissingProbabilities | PipelineError::ShapeError { .. } => {
                ErrorCategory::Contract
            }
            PipelineError::ModelNotFitted
            | PipelineError::TrainingError(_)
            | PipelineError::ComputationError(_) => ErrorCategory::Model,
            PipelineError::IoError(_) | PipelineError::SerializationError(_) => ErrorCategory::Io,
        }
    }

    pub(crate) fn length_mismatch(expected: usize, actual: usize) -> Self {
        PipelineError::ShapeError {
            expected: format!("length = {}", expected),
            actual: format!("length = {}", actual),
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
