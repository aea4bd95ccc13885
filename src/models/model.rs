//! Predictor contract and the built-in linear model.
//!
//! The pipeline treats a model as a black box with one capability:
//! take an `[n, FEATURE_COUNT]` batch and return `n` scalars. The concrete
//! model is chosen at startup and shared read-only between requests.

use nalgebra::{DMatrix, DVector};

/// A predictor call that failed (shape mismatch, backend error, ...).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct PredictorError(pub String);

/// Batch regression model.
pub trait Predictor: Send + Sync {
    /// One output per input row.
    fn predict(&self, batch: &DMatrix<f64>) -> Result<Vec<f64>, PredictorError>;

    /// Short human-readable description for reports.
    fn describe(&self) -> String {
        "opaque predictor".to_string()
    }
}

/// `y = intercept + x · coefficients`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: DVector<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients: DVector::from_vec(coefficients),
        }
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice()
    }
}

impl Predictor for LinearModel {
    fn predict(&self, batch: &DMatrix<f64>) -> Result<Vec<f64>, PredictorError> {
        if batch.ncols() != self.coefficients.len() {
            return Err(PredictorError(format!(
                "expected {} input columns, got {}",
                self.coefficients.len(),
                batch.ncols()
            )));
        }
        let y = batch * &self.coefficients;
        Ok(y.iter().map(|v| v + self.intercept).collect())
    }

    fn describe(&self) -> String {
        format!("linear ({} coefficients)", self.coefficients.len())
    }
}
