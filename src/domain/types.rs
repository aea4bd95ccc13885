//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed through the pipeline by value
//! - printed as JSON by the CLI
//! - compared exactly in tests

use std::collections::HashMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a feature is turned from a raw string into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Parsed as a float, then min-max scaled against the scaling table.
    Continuous,
    /// Ordinal survey score, expected in 0–5.
    Rating,
    /// Integer category code chosen by the caller (e.g. the form layer).
    Categorical,
}

impl FeatureKind {
    pub fn display_name(self) -> &'static str {
        match self {
            FeatureKind::Continuous => "continuous",
            FeatureKind::Rating => "rating",
            FeatureKind::Categorical => "categorical",
        }
    }
}

/// One of the 21 model inputs.
///
/// The declaration order here is not the model order; see
/// `features::layout::CANONICAL_ORDER` for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureName {
    Age,
    FlightDistance,
    ArrivalDelay,
    DepartureArrivalTimeConvenience,
    EaseOfOnlineBooking,
    CheckInService,
    OnlineBoarding,
    GateLocation,
    OnBoardService,
    SeatComfort,
    LegRoomService,
    Cleanliness,
    FoodAndDrink,
    InFlightService,
    InFlightWifiService,
    InFlightEntertainment,
    BaggageHandling,
    Gender,
    CustomerType,
    TypeOfTravel,
    Class,
}

impl FeatureName {
    /// Column name the model was trained with.
    pub fn label(self) -> &'static str {
        match self {
            FeatureName::Age => "Age",
            FeatureName::FlightDistance => "Flight Distance",
            FeatureName::ArrivalDelay => "Arrival Delay",
            FeatureName::DepartureArrivalTimeConvenience => "Departure and Arrival Time Convenience",
            FeatureName::EaseOfOnlineBooking => "Ease of Online Booking",
            FeatureName::CheckInService => "Check-in Service",
            FeatureName::OnlineBoarding => "Online Boarding",
            FeatureName::GateLocation => "Gate Location",
            FeatureName::OnBoardService => "On-board Service",
            FeatureName::SeatComfort => "Seat Comfort",
            FeatureName::LegRoomService => "Leg Room Service",
            FeatureName::Cleanliness => "Cleanliness",
            FeatureName::FoodAndDrink => "Food and Drink",
            FeatureName::InFlightService => "In-flight Service",
            FeatureName::InFlightWifiService => "In-flight Wifi Service",
            FeatureName::InFlightEntertainment => "In-flight Entertainment",
            FeatureName::BaggageHandling => "Baggage Handling",
            FeatureName::Gender => "Gender",
            FeatureName::CustomerType => "Customer Type",
            FeatureName::TypeOfTravel => "Type of Travel",
            FeatureName::Class => "Class",
        }
    }

    /// Key the raw input record uses for this feature.
    pub fn input_key(self) -> &'static str {
        match self {
            FeatureName::Age => "age",
            FeatureName::FlightDistance => "flight_distance",
            FeatureName::ArrivalDelay => "arrival_delay",
            FeatureName::DepartureArrivalTimeConvenience => "departure_arrival_time_convenience",
            FeatureName::EaseOfOnlineBooking => "ease_of_online_booking",
            FeatureName::CheckInService => "check_in_service",
            FeatureName::OnlineBoarding => "online_boarding",
            FeatureName::GateLocation => "gate_location",
            FeatureName::OnBoardService => "on_board_service",
            FeatureName::SeatComfort => "seat_comfort",
            FeatureName::LegRoomService => "leg_room_service",
            FeatureName::Cleanliness => "cleanliness",
            FeatureName::FoodAndDrink => "food_and_drink",
            FeatureName::InFlightService => "in_flight_service",
            FeatureName::InFlightWifiService => "in_flight_wifi_service",
            FeatureName::InFlightEntertainment => "in_flight_entertainment",
            FeatureName::BaggageHandling => "baggage_handling",
            FeatureName::Gender => "gender",
            FeatureName::CustomerType => "customer_type",
            FeatureName::TypeOfTravel => "type_of_travel",
            FeatureName::Class => "class_type",
        }
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            FeatureName::Age | FeatureName::FlightDistance | FeatureName::ArrivalDelay => {
                FeatureKind::Continuous
            }
            FeatureName::Gender
            | FeatureName::CustomerType
            | FeatureName::TypeOfTravel
            | FeatureName::Class => FeatureKind::Categorical,
            _ => FeatureKind::Rating,
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw field values exactly as submitted, keyed by input key (`age`, `gender`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputRecord {
    fields: HashMap<String, String>,
}

impl RawInputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Insert every field of `other`, replacing existing values.
    pub fn merge(&mut self, other: RawInputRecord) {
        self.fields.extend(other.fields);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawInputRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Number of decimal places a prediction is rounded to for presentation.
pub const PREDICTION_DECIMALS: i32 = 2;

/// A single model output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Rounded to `PREDICTION_DECIMALS` places.
    pub value: f64,
    /// What the predictor actually returned.
    pub raw: f64,
}

impl PredictionResult {
    pub fn from_raw(raw: f64) -> Self {
        Self {
            value: round_to(raw, PREDICTION_DECIMALS),
            raw,
        }
    }
}

/// Round half away from zero at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// How rating inputs are checked beyond parsing as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RatingPolicy {
    /// Any integer is accepted and passed to the model unchanged.
    #[default]
    #[value(name = "passthrough")]
    #[serde(rename = "passthrough")]
    PassThrough,
    /// Ratings outside `RATING_MIN..=RATING_MAX` are rejected as invalid input.
    Strict,
}

pub const RATING_MIN: i64 = 0;
pub const RATING_MAX: i64 = 5;

/// Startup configuration for the prediction service.
///
/// Built from `.env`, environment variables and CLI flags (in that order).
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub rating_policy: RatingPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_kinds_partition() {
        use crate::features::layout::CANONICAL_ORDER;

        let count = |kind: FeatureKind| CANONICAL_ORDER.iter().filter(|n| n.kind() == kind).count();
        assert_eq!(count(FeatureKind::Continuous), 3);
        assert_eq!(count(FeatureKind::Rating), 14);
        assert_eq!(count(FeatureKind::Categorical), 4);
    }

    #[test]
    fn class_uses_class_type_key() {
        assert_eq!(FeatureName::Class.input_key(), "class_type");
        assert_eq!(FeatureName::Class.label(), "Class");
    }

    #[test]
    fn prediction_rounds_half_away_from_zero() {
        assert_eq!(PredictionResult::from_raw(7.345).value, 7.35);
        assert_eq!(PredictionResult::from_raw(-1.005001).value, -1.01);
        assert_eq!(PredictionResult::from_raw(3.0).value, 3.0);
        assert_eq!(PredictionResult::from_raw(7.345).raw, 7.345);
    }

    #[test]
    fn raw_record_collects_pairs() {
        let record: RawInputRecord = [("age", "46"), ("gender", "1")].into_iter().collect();
        assert_eq!(record.get("age"), Some("46"));
        assert_eq!(record.get("class_type"), None);
        assert_eq!(record.len(), 2);
    }
}
