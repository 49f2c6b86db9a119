//! Catalog rows in, chart-ready series out.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aggregate::{
    capture_month, normalize_capture_times, normalize_focal_lengths, FocalLength, FormatError,
    FormatErrorKind, Series, YearMonth,
};
use crate::db::{ColumnRef, RowSource, SqliteCatalog, Value};
use crate::error::Result;

/// What to do with a capture time that is not `YYYY-MM-DDT...`.
///
/// Missing focal lengths are always dropped quietly, but a malformed
/// capture time usually means the wrong column was configured, so the
/// default is to stop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedDatePolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub capture_times: ColumnRef,
    /// `None` aggregates capture months only.
    pub focal_lengths: Option<ColumnRef>,
    pub malformed_dates: MalformedDatePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub capture_months: Series<YearMonth>,
    pub focal_lengths: Option<Series<FocalLength>>,
    /// Capture times dropped under [`MalformedDatePolicy::Skip`].
    pub skipped_capture_times: usize,
}

/// Rows as read from storage, before any normalization.
struct RawRows {
    capture_times: Vec<Value>,
    focal_lengths: Option<Vec<Value>>,
}

/// Open the catalog at `path`, read what `options` asks for, release the
/// connection, then aggregate.
pub fn aggregate_catalog(path: &Path, options: &PipelineOptions) -> Result<CatalogReport> {
    let raw = {
        let catalog = SqliteCatalog::open(path)?;
        let raw = read_rows(&catalog, options)?;
        if let Err(e) = catalog.close() {
            tracing::warn!("Failed to close catalog cleanly: {}", e);
        }
        raw
    };

    tracing::info!("Read catalog {:?}", path);
    aggregate_rows(raw, options.malformed_dates)
}

/// Aggregate straight from any row source.
pub fn aggregate<S: RowSource + ?Sized>(source: &S, options: &PipelineOptions) -> Result<CatalogReport> {
    let raw = read_rows(source, options)?;
    aggregate_rows(raw, options.malformed_dates)
}

fn read_rows<S: RowSource + ?Sized>(source: &S, options: &PipelineOptions) -> Result<RawRows> {
    let capture_times = options.capture_times.read(source)?;
    let focal_lengths = options
        .focal_lengths
        .as_ref()
        .map(|column| column.read(source))
        .transpose()?;

    Ok(RawRows {
        capture_times,
        focal_lengths,
    })
}

fn aggregate_rows(raw: RawRows, policy: MalformedDatePolicy) -> Result<CatalogReport> {
    let (months, rejected) = capture_months(&raw.capture_times, policy)?;
    let capture_months = Series::from_keys(&months);
    tracing::info!(
        "Aggregated {} capture times into {} months",
        capture_months.total(),
        capture_months.len()
    );

    let focal_lengths = raw.focal_lengths.map(|rows| {
        let lengths = normalize_focal_lengths(&focal_length_values(&rows));
        let series = Series::from_keys(&lengths);
        tracing::info!(
            "Aggregated {} focal lengths into {} buckets",
            series.total(),
            series.len()
        );
        series
    });

    Ok(CatalogReport {
        capture_months,
        focal_lengths,
        skipped_capture_times: rejected.len(),
    })
}

/// Months that parsed, plus the rows skipped under [`MalformedDatePolicy::Skip`].
fn capture_months(
    rows: &[Value],
    policy: MalformedDatePolicy,
) -> Result<(Vec<YearMonth>, Vec<FormatError>)> {
    match policy {
        MalformedDatePolicy::Abort => {
            let texts = rows
                .iter()
                .enumerate()
                .map(|(i, value)| capture_time_text(i, value))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((normalize_capture_times(&texts)?, Vec::new()))
        }
        MalformedDatePolicy::Skip => {
            let mut months = Vec::with_capacity(rows.len());
            let mut rejected = Vec::new();
            for (i, value) in rows.iter().enumerate() {
                match capture_time_text(i, value).and_then(|text| capture_month(i, text)) {
                    Ok(month) => months.push(month),
                    Err(e) => {
                        tracing::warn!("Skipping {}", e);
                        rejected.push(e);
                    }
                }
            }
            Ok((months, rejected))
        }
    }
}

fn capture_time_text(row: usize, value: &Value) -> std::result::Result<&str, FormatError> {
    match value {
        Value::Text(text) => Ok(text.as_str()),
        Value::Null => Err(FormatError::new(row, "NULL", FormatErrorKind::NotText)),
        Value::Integer(n) => Err(FormatError::new(row, n.to_string(), FormatErrorKind::NotText)),
        Value::Real(x) => Err(FormatError::new(row, x.to_string(), FormatErrorKind::NotText)),
        Value::Blob(bytes) => Err(FormatError::new(
            row,
            format!("<{} byte blob>", bytes.len()),
            FormatErrorKind::NotText,
        )),
    }
}

/// Numeric focal lengths; anything else counts as absent.
///
/// Only finite, positive values are lengths. `NaN`, infinities, zero and
/// negatives are treated like any other non-numeric value.
fn focal_length_values(rows: &[Value]) -> Vec<Option<f64>> {
    rows.iter()
        .map(|value| match value {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(x) => Some(*x),
            Value::Text(text) => text.trim().parse().ok(),
            Value::Null | Value::Blob(_) => None,
        })
        .map(|length| length.filter(|mm: &f64| mm.is_finite() && *mm > 0.0))
        .collect()
}
