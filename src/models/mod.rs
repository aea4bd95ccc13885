//! Model implementations behind the `Predictor` contract.

pub mod model;

pub use model::*;
