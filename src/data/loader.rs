use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{RiskLabel, SensorDataset, SensorRecord, REQUIRED_COLUMNS};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the sensor table, mapping every failure to
/// [`DashboardError::DatasetUnavailable`].
pub fn load_dataset(path: &Path) -> Result<SensorDataset, DashboardError> {
    match load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} sensors from {} with labels {:?}",
                dataset.len(),
                path.display(),
                dataset.labels().iter().map(|l| l.as_str()).collect::<Vec<_>>()
            );
            if dataset.is_empty() {
                log::warn!("{} contains no sensors", path.display());
            }
            let unplaced = dataset.records().iter().filter(|r| !r.has_position()).count();
            if unplaced > 0 {
                log::warn!("{unplaced} sensors have no usable coordinates and will not be drawn");
            }
            for label in dataset.labels().iter().filter(|l| !l.is_known()) {
                log::warn!("Unrecognised risk label '{label}' will use the default colour");
            }
            Ok(dataset)
        }
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", path.display());
            Err(DashboardError::DatasetUnavailable {
                path: path.to_path_buf(),
                reason: format!("{e:#}"),
            })
        }
    }
}

/// Load a sensor dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the nine sensor columns (notebook export)
/// * `.json`    – `[{ "detid": "...", "lat": 53.5, ... }, ...]`
/// * `.parquet` – one column per field, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<SensorDataset> {
    if !path.exists() {
        bail!("file '{}' does not exist", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    SensorDataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Row shape shared by the CSV and JSON loaders
// ---------------------------------------------------------------------------

/// One row as it appears on disk. Numeric cells may be empty / null.
#[derive(Debug, Deserialize)]
struct RawRow {
    detid: String,
    lat: Option<f64>,
    long: Option<f64>,
    fclass: String,
    avg_speed: Option<f64>,
    limit: Option<f64>,
    speed_gap: Option<f64>,
    avg_flow: Option<f64>,
    risk_label: String,
}

impl From<RawRow> for SensorRecord {
    fn from(row: RawRow) -> Self {
        let nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
        SensorRecord {
            detid: row.detid,
            lat: nan(row.lat),
            long: nan(row.long),
            fclass: row.fclass,
            avg_speed: nan(row.avg_speed),
            limit: nan(row.limit),
            speed_gap: nan(row.speed_gap),
            avg_flow: nan(row.avg_flow),
            risk_label: RiskLabel::parse(&row.risk_label),
        }
    }
}

fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>, source: &str) -> Result<()> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();
    if !missing.is_empty() {
        bail!("{source} missing required column(s): {}", missing.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<SensorRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    check_columns(headers.iter(), "CSV")?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(row.into());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// `NaN` cells arrive as `null`.
fn load_json(path: &Path) -> Result<Vec<SensorRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        check_columns(obj.keys().map(String::as_str), &format!("JSON row {i}"))?;

        let raw: RawRow =
            serde_json::from_value(row.clone()).with_context(|| format!("JSON row {i}"))?;
        records.push(raw.into());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per sensor field.
///
/// Text columns must be Utf8 / LargeUtf8; numeric columns may be any of
/// Int32, Int64, Float32 or Float64 (pandas writes integer limits as Int64).
fn load_parquet(path: &Path) -> Result<Vec<SensorRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        records.extend(records_from_batch(&batch)?);
    }
    Ok(records)
}

fn records_from_batch(batch: &RecordBatch) -> Result<Vec<SensorRecord>> {
    let schema = batch.schema();
    check_columns(schema.fields().iter().map(|f| f.name().as_str()), "Parquet file")?;

    let detid = column(batch, "detid")?;
    let lat = column(batch, "lat")?;
    let long = column(batch, "long")?;
    let fclass = column(batch, "fclass")?;
    let avg_speed = column(batch, "avg_speed")?;
    let limit = column(batch, "limit")?;
    let speed_gap = column(batch, "speed_gap")?;
    let avg_flow = column(batch, "avg_flow")?;
    let risk_label = column(batch, "risk_label")?;

    (0..batch.num_rows())
        .map(|row| {
            let detid = extract_string(detid, row)
                .with_context(|| format!("Row {row}: failed to read 'detid'"))?;
            Ok(SensorRecord {
                detid,
                lat: extract_f64(lat, row).with_context(|| format!("Row {row}: 'lat'"))?,
                long: extract_f64(long, row).with_context(|| format!("Row {row}: 'long'"))?,
                fclass: extract_string(fclass, row)
                    .with_context(|| format!("Row {row}: 'fclass'"))?,
                avg_speed: extract_f64(avg_speed, row)
                    .with_context(|| format!("Row {row}: 'avg_speed'"))?,
                limit: extract_f64(limit, row).with_context(|| format!("Row {row}: 'limit'"))?,
                speed_gap: extract_f64(speed_gap, row)
                    .with_context(|| format!("Row {row}: 'speed_gap'"))?,
                avg_flow: extract_f64(avg_flow, row)
                    .with_context(|| format!("Row {row}: 'avg_flow'"))?,
                risk_label: RiskLabel::parse(
                    &extract_string(risk_label, row)
                        .with_context(|| format!("Row {row}: 'risk_label'"))?,
                ),
            })
        })
        .collect()
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in text column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

/// Numeric cell as `f64`; nulls become `NaN`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64,
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64,
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as f64,
        other => bail!("Expected numeric column, got {other:?}"),
    };
    Ok(value)
}
