//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - feature identity (`FeatureName`, `FeatureKind`)
//! - the raw request record (`RawInputRecord`)
//! - prediction output (`PredictionResult`) and service configuration

pub mod types;

pub use types::*;
