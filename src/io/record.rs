//! Build `RawInputRecord`s from command-line pairs or JSON files.

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::domain::RawInputRecord;
use crate::error::AppError;

/// Parse `key=value` pairs. The first `=` splits; later ones stay in the value.
pub fn record_from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<RawInputRecord, AppError> {
    let mut record = RawInputRecord::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::new(2, format!("Expected key=value, got '{pair}'.")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::new(2, format!("Empty field name in '{pair}'.")));
        }
        record.insert(key, value);
    }
    Ok(record)
}

/// Read a JSON object of field -> value.
///
/// Numbers are accepted and kept in their JSON text form; the pipeline does the
/// real parsing.
pub fn read_record_json(path: &Path) -> Result<RawInputRecord, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input JSON '{}': {e}", path.display())))?;
    let value: Value = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid input JSON '{}': {e}", path.display())))?;
    record_from_json(&value)
}

pub fn record_from_json(value: &Value) -> Result<RawInputRecord, AppError> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::new(2, "Input JSON must be an object of field names to values."))?;

    let mut record = RawInputRecord::new();
    for (key, v) in object {
        let text = match v {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(AppError::new(
                    2,
                    format!("Field '{key}' must be a string or number, got {other}."),
                ));
            }
        };
        record.insert(key.as_str(), text);
    }
    Ok(record)
}
