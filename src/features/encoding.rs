//! Raw record -> processed feature values.
//!
//! Continuous fields are parsed as floats and min-max scaled. Rating and
//! categorical fields must already be integer strings; they are parsed and passed
//! through numerically. The label -> code mapping for categories belongs to
//! whoever builds the record.

use std::collections::HashMap;

use crate::domain::{FeatureName, RATING_MAX, RATING_MIN, RatingPolicy, RawInputRecord};
use crate::error::PipelineError;

use super::layout::{CATEGORICAL_FEATURES, CONTINUOUS_FEATURES, RATING_FEATURES};
use super::scaling::ScalingTable;

/// Numeric value per feature, ready for assembly.
pub type ProcessedValues = HashMap<FeatureName, f64>;

/// Process every feature of `record`. Stops at the first bad field.
pub fn encode_record(
    record: &RawInputRecord,
    table: &ScalingTable,
    policy: RatingPolicy,
) -> Result<ProcessedValues, PipelineError> {
    let mut values = ProcessedValues::with_capacity(
        CONTINUOUS_FEATURES.len() + RATING_FEATURES.len() + CATEGORICAL_FEATURES.len(),
    );

    for name in CONTINUOUS_FEATURES {
        let raw = parse_continuous(record, name)?;
        values.insert(name, table.scale_attribute(name.label(), raw)?);
    }

    for name in RATING_FEATURES {
        values.insert(name, parse_rating(record, name, policy)? as f64);
    }

    for name in CATEGORICAL_FEATURES {
        values.insert(name, parse_integer(record, name)? as f64);
    }

    Ok(values)
}

/// Parse a continuous field as a finite float.
pub fn parse_continuous(record: &RawInputRecord, name: FeatureName) -> Result<f64, PipelineError> {
    let (key, raw) = lookup(record, name)?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PipelineError::invalid_input(key, raw)),
    }
}

/// Parse a rating, applying the range check `policy` asks for.
pub fn parse_rating(
    record: &RawInputRecord,
    name: FeatureName,
    policy: RatingPolicy,
) -> Result<i64, PipelineError> {
    let value = parse_integer(record, name)?;
    match policy {
        RatingPolicy::PassThrough => Ok(value),
        RatingPolicy::Strict if (RATING_MIN..=RATING_MAX).contains(&value) => Ok(value),
        RatingPolicy::Strict => {
            let (key, raw) = lookup(record, name)?;
            Err(PipelineError::invalid_input(key, raw))
        }
    }
}

/// Parse an integer-coded field. `"3.0"` is not an integer.
pub fn parse_integer(record: &RawInputRecord, name: FeatureName) -> Result<i64, PipelineError> {
    let (key, raw) = lookup(record, name)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PipelineError::invalid_input(key, raw))
}

fn lookup(record: &RawInputRecord, name: FeatureName) -> Result<(&'static str, &str), PipelineError> {
    let key = name.input_key();
    record
        .get(key)
        .map(|raw| (key, raw))
        .ok_or_else(|| PipelineError::missing_input(key))
}
