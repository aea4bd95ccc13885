//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - resolves configuration (.env -> environment -> flags)
//! - loads the model once at startup
//! - dispatches to the requested command

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::cli::{BatchArgs, Command, LayoutArgs, RecordArgs, ServiceArgs};
use crate::domain::{RatingPolicy, RawInputRecord, ServiceConfig};
use crate::error::AppError;
use crate::features::{LayoutInfo, ScalingTable};
use crate::io::model_file::{ModelInfo, load_model};

pub mod pipeline;

use pipeline::{PipelineContext, PredictionService};

pub const MODEL_PATH_ENV: &str = "SAT_MODEL_PATH";
pub const RATING_POLICY_ENV: &str = "SAT_RATING_POLICY";
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Failures listed in the batch summary before the rest are elided.
const MAX_REPORTED_ERRORS: usize = 10;

/// Entry point for the `sat` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Features(args) => handle_features(args),
        Command::Batch(args) => handle_batch(args),
        Command::Layout(args) => handle_layout(args),
    }
}

fn handle_predict(args: RecordArgs) -> Result<(), AppError> {
    let config = service_config_from_env(&args.service)?;
    let (service, model) = build_service(&config);
    if !service.is_ready() {
        return Err(crate::error::PipelineError::PredictorUnavailable.into());
    }

    let record = record_from_args(&args)?;
    let result = service.predict_record(record)?;

    if args.json {
        let body = serde_json::json!({ "prediction": result.value, "raw": result.raw, "model": model });
        println!("{body}");
    } else {
        print!("{}", crate::report::format_prediction(&result, model.as_ref()));
    }
    Ok(())
}

fn handle_features(args: RecordArgs) -> Result<(), AppError> {
    let config = service_config_from_env(&args.service)?;
    // Preparing a vector does not need the model, so none is loaded.
    let service = PredictionService::new(PipelineContext::new(
        ScalingTable::standard(),
        config.rating_policy,
        None,
    ));

    let record = record_from_args(&args)?;
    let vector = service.prepare(&record)?;

    if args.json {
        let body = serde_json::to_string_pretty(&vector)
            .map_err(|e| AppError::new(4, format!("Failed to serialize feature vector: {e}")))?;
        println!("{body}");
    } else {
        print!("{}", crate::report::format_feature_table(&vector));
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = service_config_from_env(&args.service)?;
    let (service, _model) = build_service(&config);
    if !service.is_ready() {
        return Err(crate::error::PipelineError::PredictorUnavailable.into());
    }

    let input = crate::io::batch::read_batch_csv(&args.input)?;
    let outcomes = service.predict_batch(input.rows)?;

    print!(
        "{}",
        crate::report::format_batch_summary(&outcomes, &input.row_errors, MAX_REPORTED_ERRORS)
    );

    if let Some(path) = &args.export {
        crate::io::batch::write_batch_csv(path, &outcomes)?;
    }
    Ok(())
}

fn handle_layout(args: LayoutArgs) -> Result<(), AppError> {
    let info = LayoutInfo::current();
    if args.json {
        let body = serde_json::to_string_pretty(&info)
            .map_err(|e| AppError::new(4, format!("Failed to serialize layout: {e}")))?;
        println!("{body}");
    } else {
        print!("{}", crate::report::format_layout(&info));
    }
    Ok(())
}

/// Load the model and build the service. A model that fails to load is logged
/// and leaves the service without a predictor.
pub fn build_service(config: &ServiceConfig) -> (PredictionService, Option<ModelInfo>) {
    let (predictor, info) = match load_model(&config.model_path) {
        Ok(loaded) => {
            log::info!(
                "loaded model '{}' from {}",
                loaded.info.description,
                loaded.info.path.display()
            );
            (Some(loaded.predictor), Some(loaded.info))
        }
        Err(e) => {
            log::error!("model not loaded: {e}");
            (None, None)
        }
    };

    let context = PipelineContext::new(ScalingTable::standard(), config.rating_policy, predictor);
    (PredictionService::new(context), info)
}

fn service_config_from_env(args: &ServiceArgs) -> Result<ServiceConfig, AppError> {
    resolve_service_config(args, |key| std::env::var(key).ok())
}

/// Flags win over environment variables, which win over defaults.
pub fn resolve_service_config(
    args: &ServiceArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServiceConfig, AppError> {
    let model_path = match &args.model {
        Some(path) => path.clone(),
        None => env(MODEL_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
    };

    let rating_policy = match args.rating_policy {
        Some(policy) => policy,
        None => match env(RATING_POLICY_ENV) {
            Some(raw) if !raw.trim().is_empty() => RatingPolicy::from_str(raw.trim(), true)
                .map_err(|_| {
                    AppError::new(
                        2,
                        format!("Invalid {RATING_POLICY_ENV} '{raw}' (expected passthrough or strict)."),
                    )
                })?,
            _ => RatingPolicy::default(),
        },
    };

    Ok(ServiceConfig {
        model_path,
        rating_policy,
    })
}

/// Merge `--input` JSON and `--field` pairs; pairs override JSON keys.
fn record_from_args(args: &RecordArgs) -> Result<RawInputRecord, AppError> {
    let mut record = match &args.input {
        Some(path) => crate::io::record::read_record_json(path)?,
        None => RawInputRecord::new(),
    };
    let overrides = crate::io::record::record_from_pairs(&args.fields)?;
    record.merge(overrides);

    if record.is_empty() {
        return Err(AppError::new(2, "No input fields given. Use --field key=value or --input <JSON>."));
    }
    Ok(record)
}
