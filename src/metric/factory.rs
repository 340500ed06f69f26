//! Metric handler factory

use super::{ClassificationMetricHandler, MetricHandler, ModelType, RegressionMetricHandler};
use crate::error::Result;

/// Maps a [`ModelType`] to the handler that evaluates it
pub struct MetricFactory;

impl MetricFactory {
    /// Handler for the given model type
    pub fn get_handler(model_type: ModelType) -> Box<dyn MetricHandler> {
        match model_type {
            ModelType::Regression => Box::new(RegressionMetricHandler::new()),
            ModelType::Classification => Box::new(ClassificationMetricHandler::new()),
        }
    }

    /// Handler for a model type tag such as `"regression"`.
    ///
    /// Fails with [`crate::PipelineError::InvalidModelType`] for unknown tags.
    pub fn from_tag(tag: &str) -> Result<Box<dyn MetricHandler>> {
        let model_type: ModelType = tag.parse()?;
        Ok(Self::get_handler(model_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_handler_per_model_type() {
        for model_type in ModelType::ALL {
            let handler = MetricFactory::get_handler(model_type);
            assert_eq!(handler.model_type(), model_type);
        }
    }

    #[test]
    fn test_handler_from_tag() {
        let handler = MetricFactory::from_tag("regression").unwrap();
        assert_eq!(handler.model_type(), ModelType::Regression);

        let handler = MetricFactory::from_tag("classification").unwrap();
        assert_eq!(handler.model_type(), ModelType::Classification);
    }

    #[test]
    fn test_invalid_tag() {
        let err = MetricFactory::from_tag("forecasting").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidModelType(_)));
    }
}
