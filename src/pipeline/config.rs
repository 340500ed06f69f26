//! Pipeline configuration

use super::AlgorithmType;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn default_random_state() -> u64 {
    42
}

fn default_num_folds() -> usize {
    5
}

/// Everything needed to build and run one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delimited text file with a header row
    pub data_path: PathBuf,

    /// Feature columns, in the order the model sees them
    pub features: Vec<String>,

    pub target_column: String,

    pub algorithm: AlgorithmType,

    /// Where the fitted model is saved; empty means not saved
    #[serde(default)]
    pub out_file: String,

    /// Seed for the train/test split and every stochastic model
    #[serde(default = "default_random_state")]
    pub random_state: u64,

    /// Folds used by cross-validation
    #[serde(default = "default_num_folds")]
    pub num_folds: usize,

    /// Columns scaled to zero mean and unit variance
    #[serde(default)]
    pub scale_standard: Vec<String>,

    /// Columns scaled by median and interquartile range
    #[serde(default)]
    pub scale_robust: Vec<String>,

    /// Columns scaled into [0, 1]
    #[serde(default)]
    pub scale_minmax: Vec<String>,
}

impl PipelineConfig {
    pub fn new(
        data_path: impl Into<PathBuf>,
        features: Vec<String>,
        target_column: impl Into<String>,
        algorithm: AlgorithmType,
    ) -> Self {
        Self {
            data_path: data_path.into(),
            features,
            target_column: target_column.into(),
            algorithm,
            out_file: String::new(),
            random_state: default_random_state(),
            num_folds: default_num_folds(),
            scale_standard: Vec::new(),
            scale_robust: Vec::new(),
            scale_minmax: Vec::new(),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn with_out_file(mut self, out_file: impl Into<String>) -> Self {
        self.out_file = out_file.into();
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_num_folds(mut self, num_folds: usize) -> Self {
        self.num_folds = num_folds;
        self
    }

    pub fn with_scale_standard(mut self, columns: Vec<String>) -> Self {
        self.scale_standard = columns;
        self
    }

    pub fn with_scale_robust(mut self, columns: Vec<String>) -> Self {
        self.scale_robust = columns;
        self
    }

    pub fn with_scale_minmax(mut self, columns: Vec<String>) -> Self {
        self.scale_minmax = columns;
        self
    }

    /// True when at least one scaling group is configured
    pub fn has_scaling(&self) -> bool {
        !(self.scale_standard.is_empty() && self.scale_robust.is_empty() && self.scale_minmax.is_empty())
    }

    /// Check the invariants the pipelines rely on
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(PipelineError::ConfigError("at least one feature is required".to_string()));
        }

        let mut features = HashSet::new();
        for feature in &self.features {
            if !features.insert(feature.as_str()) {
                return Err(PipelineError::ConfigError(format!("feature '{}' is listed twice", feature)));
            }
        }

        if self.num_folds == 0 {
            return Err(PipelineError::ConfigError("num_folds must be at least 1".to_string()));
        }

        let mut scaled = HashSet::new();
        let groups = [
            ("scale_standard", &self.scale_standard),
            ("scale_robust", &self.scale_robust),
            ("scale_minmax", &self.scale_minmax),
        ];
        for (group, columns) in groups {
            for column in columns {
                if !features.contains(column.as_str()) {
                    return Err(PipelineError::ConfigError(format!(
                        "{} column '{}' is not one of the features",
                        group, column
                    )));
                }
                if !scaled.insert(column.as_str()) {
                    return Err(PipelineError::ConfigError(format!(
                        "column '{}' appears in more than one scaling group",
                        column
                    )));
                }
            }
        }

        Ok(())
    }
}
