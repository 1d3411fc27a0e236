use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::csv_writer::{self, CsvExporter};
use crate::excel_writer::ExcelExporter;
use crate::extractor::extract_funds;
use crate::models::{FundRecord, OutputLayout};

/// Where the extracted funds end up.
#[derive(Debug, Clone, PartialEq)]
pub enum Sink {
    /// Timestamped CSV file inside a directory.
    Csv { dir: PathBuf },
    /// Fresh workbook with a single named worksheet.
    Excel { path: PathBuf, sheet: String },
}

#[derive(Debug)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub funds: usize,
}

/// Extracts funds from `html` and writes them to `sink`.
///
/// Nothing is written unless extraction succeeds for every tile.
pub fn export(
    html: &str,
    layout: OutputLayout,
    sink: &Sink,
    now: NaiveDateTime,
) -> Result<ExportSummary> {
    info!("Starting conversion");
    let funds = extract_funds(html).context("Failed to extract funds from listing")?;
    info!("Conversion successful: {} funds", funds.len());

    let path = match sink {
        Sink::Csv { dir } => {
            let path = csv_writer::timestamped_path(dir, now);
            write_csv(&path, layout, &funds)?;
            info!("Written to CSV file: {}", path.display());
            path
        }
        Sink::Excel { path, sheet } => {
            let mut exporter = ExcelExporter::new()?;
            exporter.write_funds(sheet, layout, &funds)?;
            exporter
                .save(path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            info!("Written to worksheet '{}' in {}", sheet, path.display());
            path.clone()
        }
    };

    Ok(ExportSummary {
        path,
        funds: funds.len(),
    })
}

/// Writes the CSV beside `path` and renames it into place once complete.
///
/// A failed write leaves no file behind.
fn write_csv(path: &Path, layout: OutputLayout, funds: &[FundRecord]) -> Result<()> {
    let partial = path.with_extension("csv.part");

    let written = write_rows(&partial, layout, funds).and_then(|()| {
        std::fs::rename(&partial, path)
            .with_context(|| format!("Failed to move CSV into place at {}", path.display()))
    });

    if written.is_err() && partial.exists() {
        if let Err(e) = std::fs::remove_file(&partial) {
            warn!("Failed to remove partial file {}: {}", partial.display(), e);
        }
    }
    written
}

fn write_rows(path: &Path, layout: OutputLayout, funds: &[FundRecord]) -> Result<()> {
    let mut exporter = CsvExporter::new(path, layout)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    exporter.write_header()?;
    for fund in funds {
        exporter.write_fund(fund)?;
    }
    exporter.finalize()
}

/// Reads saved listing markup from disk.
pub fn read_listing(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
