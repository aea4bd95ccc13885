//! The ordered model input.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use super::layout::{CANONICAL_ORDER, FEATURE_COUNT, FEATURE_VERSION, feature_index, layout_hash};
use crate::domain::FeatureName;

/// 21 values in `CANONICAL_ORDER`, tagged with the layout they were built for.
///
/// Only the assembler creates these, so every slot is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub(crate) fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, name: FeatureName) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    /// `(feature, value)` pairs in model order.
    pub fn named_values(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        CANONICAL_ORDER.iter().copied().zip(self.values.iter().copied())
    }

    /// Reshape into a single-row `[1, FEATURE_COUNT]` batch for the predictor.
    pub fn to_batch(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(1, FEATURE_COUNT, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64;
        }
        FeatureVector::from_values(values)
    }

    #[test]
    fn batch_is_one_row_in_model_order() {
        let batch = ramp().to_batch();
        assert_eq!(batch.nrows(), 1);
        assert_eq!(batch.ncols(), FEATURE_COUNT);
        for j in 0..FEATURE_COUNT {
            assert_eq!(batch[(0, j)], j as f64);
        }
    }

    #[test]
    fn lookup_by_name() {
        let v = ramp();
        assert_eq!(v.get(FeatureName::Age), Some(0.0));
        assert_eq!(v.get(FeatureName::Class), Some(20.0));
        assert_eq!(v.len(), FEATURE_COUNT);
    }

    #[test]
    fn named_values_follow_canonical_order() {
        let names: Vec<FeatureName> = ramp().named_values().map(|(n, _)| n).collect();
        assert_eq!(names, CANONICAL_ORDER.to_vec());
    }

    #[test]
    fn carries_current_layout() {
        let v = ramp();
        assert_eq!(v.version, FEATURE_VERSION);
        assert_eq!(v.layout_hash, layout_hash());
    }
}
