//! Reporting utilities: terminal formatting for predictions, vectors and batches.

pub mod format;

pub use format::*;
