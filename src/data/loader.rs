use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{fields, CellValue, Column, FlightTable};
use super::timestamp::{self, ResolvedFormat, TimestampPolicy};

/// Knobs for a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub timestamp_policy: TimestampPolicy,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a flight table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one flight per line (also the fallback)
/// * `.json`    – `[{ "FlightID": 1, "Airline": "AA", ... }, ...]`
/// * `.parquet` – flat columns of strings, numbers, booleans or timestamps
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<FlightTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, options),
        "json" => load_json(path, options),
        _ => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file, options)
        }
    }
    .with_context(|| format!("loading flight data from {}", path.display()))?;

    log::info!(
        "Loaded {} flights with columns {:?} from {}",
        table.len(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV from any reader: header row, then one flight per record.
pub fn read_csv<R: Read>(reader: R, options: &LoadOptions) -> Result<FlightTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }
        for (col_idx, value) in record.iter().enumerate() {
            let cell = if fields::TIMESTAMPS.contains(&headers[col_idx].as_str()) {
                raw_text(value)
            } else {
                CellValue::guess(value)
            };
            columns[col_idx].push(cell);
        }
    }

    build_table(headers, columns, options)
}

/// Timestamp columns keep their text until the whole column is resolved.
fn raw_text(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "FlightID": 1, "Airline": "AA", "ScheduledDeparture": "01-03-2024 08:00" },
///   ...
/// ]
/// ```
///
/// Keys missing from a record become nulls.
fn load_json(path: &Path, options: &LoadOptions) -> Result<FlightTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<CellValue>> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (key, val) in obj {
            let col_idx = match headers.iter().position(|h| h == key) {
                Some(idx) => idx,
                None => {
                    headers.push(key.clone());
                    columns.push(vec![CellValue::Null; i]);
                    headers.len() - 1
                }
            };
            columns[col_idx].push(json_to_cell(val));
        }
        for col in &mut columns {
            if col.len() < i + 1 {
                col.push(CellValue::Null);
            }
        }
    }

    build_table(headers, columns, options)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one flight per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Timestamp and date columns are cast to
/// text and go through the same resolution as CSV input.
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<FlightTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, col) in batch.columns().iter().enumerate() {
            let col = text_if_temporal(col)
                .with_context(|| format!("casting column '{}'", headers[col_idx]))?;
            for row in 0..batch.num_rows() {
                columns[col_idx].push(extract_cell(&col, row));
            }
        }
    }

    build_table(headers, columns, options)
}

// -- Parquet / Arrow helpers --

fn text_if_temporal(col: &Arc<dyn Array>) -> Result<Arc<dyn Array>> {
    match col.data_type() {
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            Ok(cast(col.as_ref(), &DataType::Utf8)?)
        }
        _ => Ok(Arc::clone(col)),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|arr| CellValue::Integer(arr.value(row) as i64))
            .unwrap_or(CellValue::Null),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|arr| CellValue::Integer(arr.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|arr| CellValue::Float(arr.value(row) as f64))
            .unwrap_or(CellValue::Null),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|arr| CellValue::Float(arr.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| CellValue::Bool(arr.value(row)))
            .unwrap_or(CellValue::Null),
        other => {
            log::debug!("Unsupported parquet type {other:?}, reading as null");
            CellValue::Null
        }
    }
}

// ---------------------------------------------------------------------------
// Shared: timestamp resolution and table assembly
// ---------------------------------------------------------------------------

fn build_table(
    headers: Vec<String>,
    columns: Vec<Vec<CellValue>>,
    options: &LoadOptions,
) -> Result<FlightTable> {
    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| {
            if fields::TIMESTAMPS.contains(&name.as_str()) {
                let parsed = timestamp::parse_column(&cells, options.timestamp_policy);
                report_timestamp_column(&name, &parsed);
                Column::new(name, parsed.cells)
            } else {
                Column::new(name, cells)
            }
        })
        .collect();
    FlightTable::from_columns(columns)
}

fn report_timestamp_column(name: &str, parsed: &timestamp::ParsedColumn) {
    let label = match parsed.format {
        ResolvedFormat::DayFirst => timestamp::DAY_FIRST,
        ResolvedFormat::MonthFirst => timestamp::MONTH_FIRST,
        ResolvedFormat::Inferred => "inferred",
    };
    log::debug!("Column '{name}' parsed as {label}");
    if parsed.ambiguous {
        log::warn!(
            "Column '{name}' reads validly as both day-first and month-first; using day-first"
        );
    }
    if parsed.failures > 0 {
        log::warn!(
            "Column '{name}': {} value(s) could not be parsed and were set to null",
            parsed.failures
        );
    }
}
