//! Feature preparation.
//!
//! Responsibilities:
//!
//! - define the canonical model input layout (`layout`)
//! - min-max scale continuous inputs (`scaling`)
//! - parse rating/categorical inputs (`encoding`)
//! - order everything into a `FeatureVector` (`assembler`)

pub mod assembler;
pub mod encoding;
pub mod layout;
pub mod scaling;
pub mod vector;

pub use assembler::assemble;
pub use encoding::{ProcessedValues, encode_record};
pub use layout::{CANONICAL_ORDER, FEATURE_COUNT, FEATURE_VERSION, LayoutInfo, layout_hash};
pub use scaling::{ScalingBound, ScalingTable, scale};
pub use vector::FeatureVector;
