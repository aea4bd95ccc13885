//! Canonical feature layout.
//!
//! `CANONICAL_ORDER` is the column order the regression model was trained with.
//! The predictor only sees positions, so any change here silently changes what
//! every coefficient multiplies.
//!
//! Rules:
//! 1. Add, remove or reorder a feature -> increment `FEATURE_VERSION`.
//! 2. Never derive the order from a map or from `FeatureName`'s declaration order.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureKind, FeatureName};

/// Current layout version. Model files must declare the same version.
pub const FEATURE_VERSION: u8 = 1;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 21;

/// Model input order.
pub const CANONICAL_ORDER: [FeatureName; FEATURE_COUNT] = [
    FeatureName::Age,
    FeatureName::FlightDistance,
    FeatureName::ArrivalDelay,
    FeatureName::DepartureArrivalTimeConvenience,
    FeatureName::EaseOfOnlineBooking,
    FeatureName::CheckInService,
    FeatureName::OnlineBoarding,
    FeatureName::GateLocation,
    FeatureName::OnBoardService,
    FeatureName::SeatComfort,
    FeatureName::LegRoomService,
    FeatureName::Cleanliness,
    FeatureName::FoodAndDrink,
    FeatureName::InFlightService,
    FeatureName::InFlightWifiService,
    FeatureName::InFlightEntertainment,
    FeatureName::BaggageHandling,
    FeatureName::Gender,
    FeatureName::CustomerType,
    FeatureName::TypeOfTravel,
    FeatureName::Class,
];

/// Min-max scaled inputs.
pub const CONTINUOUS_FEATURES: [FeatureName; 3] = [
    FeatureName::Age,
    FeatureName::FlightDistance,
    FeatureName::ArrivalDelay,
];

/// 0–5 survey scores.
pub const RATING_FEATURES: [FeatureName; 14] = [
    FeatureName::DepartureArrivalTimeConvenience,
    FeatureName::EaseOfOnlineBooking,
    FeatureName::CheckInService,
    FeatureName::OnlineBoarding,
    FeatureName::GateLocation,
    FeatureName::OnBoardService,
    FeatureName::SeatComfort,
    FeatureName::LegRoomService,
    FeatureName::Cleanliness,
    FeatureName::FoodAndDrink,
    FeatureName::InFlightService,
    FeatureName::InFlightWifiService,
    FeatureName::InFlightEntertainment,
    FeatureName::BaggageHandling,
];

/// Integer-coded categories.
pub const CATEGORICAL_FEATURES: [FeatureName; 4] = [
    FeatureName::Gender,
    FeatureName::CustomerType,
    FeatureName::TypeOfTravel,
    FeatureName::Class,
];

/// CRC32 over the version byte and the ordered labels.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in CANONICAL_ORDER {
        hasher.update(name.label().as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Position of a feature in the model input.
pub fn feature_index(name: FeatureName) -> Option<usize> {
    CANONICAL_ORDER.iter().position(|&n| n == name)
}

/// Feature at a model input position.
pub fn feature_name(index: usize) -> Option<FeatureName> {
    CANONICAL_ORDER.get(index).copied()
}

/// Look a feature up by its model column label (e.g. `"Flight Distance"`).
pub fn feature_by_label(label: &str) -> Option<FeatureName> {
    CANONICAL_ORDER.iter().copied().find(|n| n.label() == label)
}

/// Layout description for logs and `sat layout --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub features: Vec<LayoutEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub index: usize,
    pub name: String,
    pub kind: FeatureKind,
    pub input_key: String,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            features: CANONICAL_ORDER
                .iter()
                .enumerate()
                .map(|(index, name)| LayoutEntry {
                    index,
                    name: name.label().to_string(),
                    kind: name.kind(),
                    input_key: name.input_key().to_string(),
                })
                .collect(),
        }
    }
}
