//! Processed values -> `FeatureVector`.

use super::encoding::ProcessedValues;
use super::layout::{CANONICAL_ORDER, FEATURE_COUNT};
use super::vector::FeatureVector;
use crate::error::PipelineError;

/// Lay the processed values out in `CANONICAL_ORDER`.
///
/// Fails on the first canonical feature missing from `values`; extra entries are
/// ignored. Iteration order of `values` never affects the result.
pub fn assemble(values: &ProcessedValues) -> Result<FeatureVector, PipelineError> {
    let mut out = [0.0; FEATURE_COUNT];
    for (slot, name) in out.iter_mut().zip(CANONICAL_ORDER) {
        *slot = values
            .get(&name)
            .copied()
            .ok_or(PipelineError::MissingFeature(name))?;
    }
    Ok(FeatureVector::from_values(out))
}
