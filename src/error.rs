//! Error types.
//!
//! - `PipelineError`: typed failures raised by the feature pipeline and the predictor call.
//! - `AppError`: what the binary reports, carrying the process exit code.
//!
//! Exit codes:
//! - `2`: caller input problems (bad fields, unreadable files, bad model file)
//! - `3`: no predictor loaded
//! - `4`: internal pipeline or prediction failure

use crate::domain::FeatureName;

/// Failures raised while turning a raw record into a prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// A scaling bound was requested for a name the table does not know.
    #[error("no scaling bound registered for attribute '{0}'")]
    UnknownAttribute(String),

    /// A scaling bound violates `max >= min` or has a non-finite endpoint.
    #[error("invalid scaling bound for '{name}': min={min}, max={max}")]
    InvalidBound { name: String, min: f64, max: f64 },

    /// A raw field is missing (`value: None`) or failed to parse.
    #[error("{}", describe_invalid_input(.field, .value.as_deref()))]
    InvalidInput { field: String, value: Option<String> },

    /// The processed values handed to the assembler lack a canonical feature.
    #[error("missing feature '{0}' in processed values")]
    MissingFeature(FeatureName),

    #[error("no predictor loaded; prediction requests are refused")]
    PredictorUnavailable,

    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl PipelineError {
    pub(crate) fn invalid_input(field: &str, value: &str) -> Self {
        PipelineError::InvalidInput {
            field: field.to_string(),
            value: Some(value.to_string()),
        }
    }

    pub(crate) fn missing_input(field: &str) -> Self {
        PipelineError::InvalidInput {
            field: field.to_string(),
            value: None,
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InvalidInput { .. } => 2,
            PipelineError::PredictorUnavailable => 3,
            PipelineError::UnknownAttribute(_)
            | PipelineError::InvalidBound { .. }
            | PipelineError::MissingFeature(_)
            | PipelineError::Prediction(_) => 4,
        }
    }
}

fn describe_invalid_input(field: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("invalid value for '{field}': {value:?}"),
        None => format!("missing required field '{field}'"),
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_names_field_and_value() {
        let err = PipelineError::invalid_input("age", "not-a-number");
        assert_eq!(err.to_string(), "invalid value for 'age': \"not-a-number\"");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_input_message() {
        let err = PipelineError::missing_input("gender");
        assert_eq!(err.to_string(), "missing required field 'gender'");
    }

    #[test]
    fn pipeline_error_converts_with_exit_code() {
        let app: AppError = PipelineError::PredictorUnavailable.into();
        assert_eq!(app.exit_code(), 3);

        let app: AppError = PipelineError::MissingFeature(FeatureName::Class).into();
        assert_eq!(app.exit_code(), 4);
        assert_eq!(app.to_string(), "missing feature 'Class' in processed values");
    }
}
