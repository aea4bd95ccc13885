//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use crate::domain::PredictionResult;
use crate::features::{FeatureVector, LayoutInfo};
use crate::io::batch::{BatchOutcome, RowError};
use crate::io::model_file::ModelInfo;

/// Prediction plus the model that produced it.
pub fn format_prediction(result: &PredictionResult, model: Option<&ModelInfo>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Prediction: {:.2}\n", result.value));
    out.push_str(&format!("Raw output: {}\n", result.raw));
    if let Some(info) = model {
        out.push_str(&format_model_info(info));
    }
    out
}

pub fn format_model_info(info: &ModelInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("Model: {} ({})\n", info.description, info.path.display()));
    if let Some(trained_at) = info.trained_at {
        out.push_str(&format!("Trained: {}\n", trained_at.to_rfc3339()));
    }
    out.push_str(&format!("Loaded: {}\n", info.loaded_at.to_rfc3339()));
    out
}

/// One line per feature, in model order.
pub fn format_feature_table(vector: &FeatureVector) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Feature vector (layout v{}, hash {:08x}):\n",
        vector.version, vector.layout_hash
    ));
    out.push_str(&format!("{:>3}  {:<40} {:<12} {:>12}\n", "#", "feature", "kind", "value"));
    for (i, (name, value)) in vector.named_values().enumerate() {
        out.push_str(&format!(
            "{i:>3}  {:<40} {:<12} {:>12.6}\n",
            name.label(),
            name.kind().display_name(),
            value
        ));
    }
    out
}

pub fn format_layout(info: &LayoutInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Feature layout v{} (hash {:08x}, {} features)\n",
        info.version,
        info.hash,
        info.features.len()
    ));
    out.push_str(&format!("{:>3}  {:<40} {:<12} {}\n", "#", "feature", "kind", "input key"));
    for entry in &info.features {
        out.push_str(&format!(
            "{:>3}  {:<40} {:<12} {}\n",
            entry.index,
            entry.name,
            entry.kind.display_name(),
            entry.input_key
        ));
    }
    out
}

/// Counts plus the first few failures.
pub fn format_batch_summary(outcomes: &[BatchOutcome], row_errors: &[RowError], max_errors: usize) -> String {
    let ok: Vec<f64> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|r| r.value))
        .collect();
    let failed: Vec<&BatchOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "Rows: {} read | {} predicted | {} failed | {} unreadable\n",
        outcomes.len() + row_errors.len(),
        ok.len(),
        failed.len(),
        row_errors.len()
    ));

    if !ok.is_empty() {
        let min = ok.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ok.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = ok.iter().sum::<f64>() / ok.len() as f64;
        out.push_str(&format!("Predictions: min={min:.2} mean={mean:.2} max={max:.2}\n"));
    }

    let mut shown = 0;
    for e in row_errors {
        if shown == max_errors {
            break;
        }
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        shown += 1;
    }
    for o in &failed {
        if shown == max_errors {
            break;
        }
        if let Err(e) = &o.result {
            out.push_str(&format!("  line {}: {e}\n", o.line));
            shown += 1;
        }
    }
    let total_errors = failed.len() + row_errors.len();
    if total_errors > shown {
        out.push_str(&format!("  ... {} more\n", total_errors - shown));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn prediction_shows_two_decimals() {
        let text = format_prediction(&PredictionResult::from_raw(7.345), None);
        assert!(text.starts_with("Prediction: 7.35\n"));
    }

    #[test]
    fn layout_lists_every_feature() {
        let text = format_layout(&LayoutInfo::current());
        assert_eq!(text.lines().count(), 2 + 21);
        assert!(text.contains("class_type"));
        assert!(text.contains("Departure and Arrival Time Convenience"));
    }

    #[test]
    fn batch_summary_counts_and_truncates() {
        let outcomes: Vec<BatchOutcome> = (0..4)
            .map(|i| BatchOutcome {
                line: i + 2,
                id: None,
                result: if i % 2 == 0 {
                    Ok(PredictionResult::from_raw(i as f64))
                } else {
                    Err(PipelineError::missing_input("age"))
                },
            })
            .collect();
        let row_errors = vec![RowError { line: 9, message: "CSV parse error".to_string() }];

        let text = format_batch_summary(&outcomes, &row_errors, 2);
        assert!(text.contains("Rows: 5 read | 2 predicted | 2 failed | 1 unreadable"));
        assert!(text.contains("Predictions: min=0.00 mean=1.00 max=2.00"));
        assert!(text.contains("line 9: CSV parse error"));
        assert!(text.contains("line 3: missing required field 'age'"));
        assert!(text.contains("... 1 more"));
    }
}
