//! Command-line parsing for the satisfaction predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the feature pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::RatingPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sat", version, about = "Airline passenger satisfaction predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict for a single passenger.
    Predict(RecordArgs),
    /// Show the feature vector a passenger record turns into (no model needed).
    Features(RecordArgs),
    /// Predict for every row of a CSV file.
    Batch(BatchArgs),
    /// Print the canonical feature layout the model must be trained with.
    Layout(LayoutArgs),
}

/// Startup options shared by commands that build a pipeline.
#[derive(Debug, Args, Clone)]
pub struct ServiceArgs {
    /// Model JSON file (overrides SAT_MODEL_PATH).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// How rating fields are checked (overrides SAT_RATING_POLICY).
    #[arg(long, value_enum)]
    pub rating_policy: Option<RatingPolicy>,
}

/// A single raw record, from flags and/or a JSON file.
#[derive(Debug, Args, Clone)]
pub struct RecordArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Field as key=value (repeatable), e.g. `-f age=46 -f class_type=1`.
    #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// JSON object of field -> value. `--field` entries override it.
    #[arg(long, value_name = "JSON")]
    pub input: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Batch prediction over a CSV file.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// CSV with a header row of input keys and an optional `id` column.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write per-row results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct LayoutArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}
