//! Input/output helpers.
//!
//! - model JSON loading + validation (`model_file`)
//! - single-record input from flags or JSON (`record`)
//! - batch CSV ingest and result export (`batch`)

pub mod batch;
pub mod model_file;
pub mod record;

pub use batch::*;
pub use model_file::*;
pub use record::*;
