//! Min-max scaling of the continuous inputs.
//!
//! The bounds are the training-set extremes; they are fixed at startup and only
//! read afterwards.

use std::collections::HashMap;

use crate::domain::FeatureName;
use crate::error::PipelineError;

/// Value returned by [`scale`] when `min == max`.
pub const DEGENERATE_SCALE: f64 = 0.5;

/// `{min, max}` for one continuous attribute. Always `max >= min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingBound {
    min: f64,
    max: f64,
}

impl ScalingBound {
    pub fn new(name: &str, min: f64, max: f64) -> Result<Self, PipelineError> {
        if !(min.is_finite() && max.is_finite()) || max < min {
            return Err(PipelineError::InvalidBound {
                name: name.to_string(),
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    const fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

const STANDARD_BOUNDS: [(FeatureName, ScalingBound); 3] = [
    (FeatureName::Age, ScalingBound::fixed(7.0, 85.0)),
    (FeatureName::FlightDistance, ScalingBound::fixed(31.0, 3739.0)),
    (FeatureName::ArrivalDelay, ScalingBound::fixed(0.0, 32.5)),
];

/// Bounds per continuous attribute, keyed by model column label.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingTable {
    bounds: HashMap<String, ScalingBound>,
}

impl ScalingTable {
    /// Bounds the shipped model was trained with.
    pub fn standard() -> Self {
        Self {
            bounds: STANDARD_BOUNDS
                .iter()
                .map(|(name, bound)| (name.label().to_string(), *bound))
                .collect(),
        }
    }

    /// Build a table from explicit entries. Later duplicates replace earlier ones.
    pub fn new<I, S>(entries: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let mut bounds = HashMap::new();
        for (name, min, max) in entries {
            let name = name.into();
            let bound = ScalingBound::new(&name, min, max)?;
            bounds.insert(name, bound);
        }
        Ok(Self { bounds })
    }

    pub fn bounds_for(&self, attribute: &str) -> Result<ScalingBound, PipelineError> {
        self.bounds
            .get(attribute)
            .copied()
            .ok_or_else(|| PipelineError::UnknownAttribute(attribute.to_string()))
    }

    /// Scale `raw` with the bound registered for `attribute`.
    pub fn scale_attribute(&self, attribute: &str, raw: f64) -> Result<f64, PipelineError> {
        Ok(scale(raw, self.bounds_for(attribute)?))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl Default for ScalingTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// `(raw - min) / (max - min)`, unclamped.
///
/// A degenerate bound (`min == max`) yields [`DEGENERATE_SCALE`] for every input.
pub fn scale(raw: f64, bound: ScalingBound) -> f64 {
    if bound.is_degenerate() {
        return DEGENERATE_SCALE;
    }
    (raw - bound.min) / (bound.max - bound.min)
}
