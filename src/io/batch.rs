//! Batch CSV ingest and result export.
//!
//! Input: a header row of input keys (`age`, `flight_distance`, ...) and one
//! passenger per row. An optional `id` column is carried through to the output.
//!
//! Output columns: `line,id,prediction,raw_prediction,error`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{PredictionResult, RawInputRecord};
use crate::error::{AppError, PipelineError};

const ID_COLUMN: &str = "id";

/// One CSV row, still raw.
#[derive(Debug, Clone)]
pub struct BatchRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub id: Option<String>,
    pub record: RawInputRecord,
}

/// Per-row outcome of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub line: usize,
    pub id: Option<String>,
    pub result: Result<PredictionResult, PipelineError>,
}

/// A row the CSV reader itself could not decode.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub rows: Vec<BatchRow>,
    pub row_errors: Vec<RowError>,
}

/// Load every row of a batch CSV.
pub fn read_batch_csv(path: &Path) -> Result<BatchInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open batch CSV '{}': {e}", path.display())))?;
    read_batch(file)
}

pub fn read_batch<R: std::io::Read>(reader: R) -> Result<BatchInput, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::new(2, "Batch CSV has no header row."));
    }

    let mut input = BatchInput::default();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, CSV lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(record) => input.rows.push(row_from_record(line, &headers, &record)),
            Err(e) => input.row_errors.push(RowError {
                line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }
    Ok(input)
}

fn row_from_record(line: usize, headers: &[String], record: &StringRecord) -> BatchRow {
    let mut id = None;
    let mut raw = RawInputRecord::new();
    for (name, value) in headers.iter().zip(record.iter()) {
        if name == ID_COLUMN {
            id = Some(value.to_string()).filter(|v| !v.is_empty());
        } else if !name.is_empty() {
            raw.insert(name.as_str(), value);
        }
    }
    BatchRow { line, id, record: raw }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

/// Write batch outcomes to CSV.
pub fn write_batch_csv(path: &Path, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_batch(file, outcomes)
}

pub fn write_batch<W: Write>(out: W, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["line", "id", "prediction", "raw_prediction", "error"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for o in outcomes {
        let line = o.line.to_string();
        let id = o.id.as_deref().unwrap_or("");
        let row = match &o.result {
            Ok(r) => [line, id.to_string(), format!("{:.2}", r.value), format!("{:.10}", r.raw), String::new()],
            Err(e) => [line, id.to_string(), String::new(), String::new(), e.to_string()],
        };
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
