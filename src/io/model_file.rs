//! Read model JSON files.
//!
//! A model file carries the trained parameters plus the layout they were trained
//! against:
//!
//! ```json
//! {
//!   "kind": "linear",
//!   "feature_version": 1,
//!   "features": ["Age", "Flight Distance", "..."],
//!   "intercept": 0.42,
//!   "coefficients": [0.1, 0.2, "..."],
//!   "trained_at": "2025-03-01T12:00:00Z",
//!   "description": "satisfaction regression"
//! }
//! ```
//!
//! Loading refuses any file whose feature list is not the canonical order verbatim.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::layout::{CANONICAL_ORDER, FEATURE_COUNT, FEATURE_VERSION};
use crate::models::{LinearModel, Predictor};

/// On-disk model schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub kind: ModelFileKind,
    pub feature_version: u8,
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFileKind {
    Linear,
}

/// Metadata about the model currently serving predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub path: PathBuf,
    pub description: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub loaded_at: DateTime<Utc>,
}

/// A validated, ready-to-share predictor.
#[derive(Clone)]
pub struct LoadedModel {
    pub predictor: Arc<dyn Predictor>,
    pub info: ModelInfo,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel").field("info", &self.info).finish()
    }
}

/// Read a model JSON file without validating it.
pub fn read_model_file(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model file '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid model file '{}': {e}", path.display())))
}

/// Read and validate a model file, returning a shareable predictor.
pub fn load_model(path: &Path) -> Result<LoadedModel, AppError> {
    let file = read_model_file(path)?;
    validate_model_file(&file).map_err(|msg| {
        AppError::new(2, format!("Model file '{}' rejected: {msg}", path.display()))
    })?;

    let predictor: Arc<dyn Predictor> = match file.kind {
        ModelFileKind::Linear => Arc::new(LinearModel::new(file.intercept, file.coefficients)),
    };

    let description = file.description.unwrap_or_else(|| predictor.describe());
    Ok(LoadedModel {
        predictor,
        info: ModelInfo {
            path: path.to_path_buf(),
            description,
            trained_at: file.trained_at,
            loaded_at: Utc::now(),
        },
    })
}

/// Check the file was trained against the current layout.
pub fn validate_model_file(file: &ModelFile) -> Result<(), String> {
    if file.feature_version != FEATURE_VERSION {
        return Err(format!(
            "feature_version {} does not match layout version {FEATURE_VERSION}",
            file.feature_version
        ));
    }

    if file.features.len() != FEATURE_COUNT {
        return Err(format!(
            "expected {FEATURE_COUNT} features, found {}",
            file.features.len()
        ));
    }

    for (i, (declared, expected)) in file.features.iter().zip(CANONICAL_ORDER).enumerate() {
        if declared != expected.label() {
            return Err(format!(
                "feature {i} is '{declared}', expected '{}'",
                expected.label()
            ));
        }
    }

    if file.coefficients.len() != FEATURE_COUNT {
        return Err(format!(
            "expected {FEATURE_COUNT} coefficients, found {}",
            file.coefficients.len()
        ));
    }

    if !file.intercept.is_finite() || file.coefficients.iter().any(|c| !c.is_finite()) {
        return Err("parameters must be finite".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn canonical_labels() -> Vec<String> {
        CANONICAL_ORDER.iter().map(|n| n.label().to_string()).collect()
    }

    fn sample_file() -> ModelFile {
        ModelFile {
            kind: ModelFileKind::Linear,
            feature_version: FEATURE_VERSION,
            features: canonical_labels(),
            intercept: 1.0,
            coefficients: vec![0.5; FEATURE_COUNT],
            trained_at: None,
            description: None,
        }
    }

    fn write_json(value: &ModelFile) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut tmp, value).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn valid_file_loads() {
        let tmp = write_json(&sample_file());
        let loaded = load_model(tmp.path()).unwrap();
        assert_eq!(loaded.info.path, tmp.path());
        assert_eq!(loaded.info.description, "linear (21 coefficients)");

        let batch = nalgebra::DMatrix::from_element(1, FEATURE_COUNT, 2.0);
        let y = loaded.predictor.predict(&batch).unwrap();
        assert_eq!(y, vec![1.0 + 21.0]);
    }

    #[test]
    fn reordered_features_are_rejected() {
        let mut file = sample_file();
        file.features.swap(0, 1);
        let err = validate_model_file(&file).unwrap_err();
        assert_eq!(err, "feature 0 is 'Flight Distance', expected 'Age'");
    }

    #[test]
    fn version_and_width_are_checked() {
        let mut file = sample_file();
        file.feature_version = FEATURE_VERSION + 1;
        assert!(validate_model_file(&file).is_err());

        let mut file = sample_file();
        file.coefficients.pop();
        assert!(validate_model_file(&file).is_err());

        let mut file = sample_file();
        file.features.pop();
        assert!(validate_model_file(&file).is_err());
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_model(Path::new("/definitely/not/here/model.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "{{ not json").unwrap();
        tmp.flush().unwrap();
        let err = load_model(tmp.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Invalid model file"));
    }

    #[test]
    fn optional_metadata_round_trips() {
        let json = serde_json::json!({
            "kind": "linear",
            "feature_version": FEATURE_VERSION,
            "features": canonical_labels(),
            "intercept": 0.0,
            "coefficients": vec![0.0; FEATURE_COUNT],
            "trained_at": "2025-03-01T12:00:00Z",
            "description": "satisfaction regression"
        });
        let file: ModelFile = serde_json::from_value(json).unwrap();
        assert!(file.trained_at.is_some());
        assert_eq!(file.description.as_deref(), Some("satisfaction regression"));
    }
}
