//! `airline-satisfaction` library crate.
//!
//! The binary (`sat`) is a thin wrapper around this library so that:
//!
//! - the feature pipeline is testable without spawning processes
//! - the pipeline can be embedded behind other front-ends (HTTP, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod report;
