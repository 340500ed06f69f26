//! Supported algorithms

use crate::error::{PipelineError, Result};
use crate::metric::ModelType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Algorithm a pipeline is built around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum AlgorithmType {
    LinearRegression,
    LogisticRegression,
    DecisionTreeClassifier,
    DecisionTreeRegressor,
    /// Random forest classifier
    RandomForest,
    RandomForestRegressor,
}

impl AlgorithmType {
    pub const ALL: [AlgorithmType; 6] = [
        AlgorithmType::LinearRegression,
        AlgorithmType::LogisticRegression,
        AlgorithmType::DecisionTreeClassifier,
        AlgorithmType::DecisionTreeRegressor,
        AlgorithmType::RandomForest,
        AlgorithmType::RandomForestRegressor,
    ];

    /// The configuration tag for this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::LinearRegression => "linear_regression",
            AlgorithmType::LogisticRegression => "logistic_regression",
            AlgorithmType::DecisionTreeClassifier => "decision_tree_classifier",
            AlgorithmType::DecisionTreeRegressor => "decision_tree_regressor",
            AlgorithmType::RandomForest => "random_forest",
            AlgorithmType::RandomForestRegressor => "random_forest_regressor",
        }
    }

    /// Which kind of task, and therefore which metrics, the algorithm serves
    pub fn model_type(&self) -> ModelType {
        match self {
            AlgorithmType::LinearRegression
            | AlgorithmType::DecisionTreeRegressor
            | AlgorithmType::RandomForestRegressor => ModelType::Regression,
            AlgorithmType::LogisticRegression
            | AlgorithmType::DecisionTreeClassifier
            | AlgorithmType::RandomForest => ModelType::Classification,
        }
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        if tag == "decision_tree" {
            return Ok(AlgorithmType::DecisionTreeClassifier);
        }
        AlgorithmType::ALL
            .into_iter()
            .find(|algo| algo.as_str() == tag)
            .ok_or_else(|| PipelineError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl TryFrom<String> for AlgorithmType {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
