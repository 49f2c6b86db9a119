use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pipeline::CatalogReport;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(Error::Export(format!(
                "cannot tell export format of {}; use .csv or .json",
                path.display()
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }
}

/// One bucket of one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedBucket {
    pub series: &'static str,
    pub key: String,
    pub count: usize,
}

/// Flatten the report into export rows, capture months first.
pub fn buckets(report: &CatalogReport) -> Vec<ExportedBucket> {
    let months = report.capture_months.iter().map(|(month, count)| ExportedBucket {
        series: "capture_month",
        key: month.to_string(),
        count,
    });

    let focal = report
        .focal_lengths
        .iter()
        .flat_map(|series| series.iter())
        .map(|(length, count)| ExportedBucket {
            series: "focal_length",
            key: length.to_string(),
            count,
        });

    months.chain(focal).collect()
}

/// Write the report's series to `output_path`; the extension picks the
/// format. Returns the number of rows written.
pub fn export_report(report: &CatalogReport, output_path: &Path) -> Result<usize> {
    let format = ExportFormat::from_path(output_path)?;
    let rows = buckets(report);

    match format {
        ExportFormat::Json => export_json(&rows, output_path)?,
        ExportFormat::Csv => export_csv(&rows, output_path)?,
    }

    tracing::info!(
        "Exported {} rows as {} to {}",
        rows.len(),
        format.name(),
        output_path.display()
    );
    Ok(rows.len())
}

fn export_json(rows: &[ExportedBucket], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(rows: &[ExportedBucket], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
