//! Model training module
//!
//! Numeric models behind the pipelines:
//! - Linear models (OLS, logistic regression with one-vs-rest)
//! - CART decision trees (classifier and regressor)
//! - Random forests built from seeded bootstrap samples
//! - K-fold splitting for cross-validation

pub mod cross_validation;
pub mod decision_tree;
pub mod linear_models;
pub mod random_forest;

pub use cross_validation::{CVSplit, KFold};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use linear_models::{LinearRegression, LogisticRegression};
pub use random_forest::{MaxFeatures, RandomForest};

use crate::error::Result;
use crate::metric::ClassProbabilities;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Enum to hold trained model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    LogisticRegression(LogisticRegression),
    DecisionTreeClassifier(DecisionTree),
    DecisionTreeRegressor(DecisionTree),
    RandomForestClassifier(RandomForest),
    RandomForestRegressor(RandomForest),
}

impl TrainedModel {
    /// Point predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::LinearRegression(m) => m.predict(x),
            TrainedModel::LogisticRegression(m) => m.predict(x),
            TrainedModel::DecisionTreeClassifier(m) | TrainedModel::DecisionTreeRegressor(m) => {
                m.predict(x)
            }
            TrainedModel::RandomForestClassifier(m) | TrainedModel::RandomForestRegressor(m) => {
                m.predict(x)
            }
        }
    }

    /// Class probabilities for classifiers, `None` for regressors
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<ClassProbabilities>> {
        let (classes, values) = match self {
            TrainedModel::LogisticRegression(m) => (m.classes(), m.predict_proba(x)?),
            TrainedModel::DecisionTreeClassifier(m) => (m.classes(), m.predict_proba(x)?),
            TrainedModel::RandomForestClassifier(m) => (m.classes(), m.predict_proba(x)?),
            TrainedModel::LinearRegression(_)
            | TrainedModel::DecisionTreeRegressor(_)
            | TrainedModel::RandomForestRegressor(_) => return Ok(None),
        };
        ClassProbabilities::new(classes.to_vec(), values).map(Some)
    }

    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            TrainedModel::LogisticRegression(_)
                | TrainedModel::DecisionTreeClassifier(_)
                | TrainedModel::RandomForestClassifier(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regressors_have_no_probabilities() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut lr = LinearRegression::new();
        lr.fit(&x, &y).unwrap();
        let model = TrainedModel::LinearRegression(lr);

        assert!(!model.is_classifier());
        assert!(model.predict_proba(&x).unwrap().is_none());
        assert_eq!(model.predict(&x).unwrap().len(), 3);
    }

    #[test]
    fn test_classifier_probabilities_follow_classes() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![3.0, 3.0, 5.0, 5.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();
        let model = TrainedModel::DecisionTreeClassifier(tree);

        let proba = model.predict_proba(&x).unwrap().unwrap();
        assert_eq!(proba.classes(), &[3.0, 5.0]);
        assert_eq!(proba.argmax_labels(), y);
    }

    #[test]
    fn test_serde_round_trip_keeps_predictions() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [3.0, 1.0]];
        let y = array![0.5, 1.5, 4.0, 4.5];

        let mut forest = RandomForest::new_regressor(5).with_random_state(3);
        forest.fit(&x, &y).unwrap();
        let model = TrainedModel::RandomForestRegressor(forest);

        let json = serde_json::to_string(&model).unwrap();
        let restored: TrainedModel = serde_json::from_str(&json).unwrap();
        let before = model.predict(&x).unwrap();
        let after = restored.predict(&x).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
