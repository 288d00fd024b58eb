// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of WattLens.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Production-Data Ingestor.
//!
//! Turns an uploaded CSV/TSV/XLSX/XLS file into production samples sorted by time.
//! Parsing is permissive: unknown headers fall back to the first two columns and
//! unreadable production values count as zero. Rows whose timestamp cannot be read, or
//! whose production is negative, are dropped.

pub mod columns;
mod delimited;
mod spreadsheet;
pub mod values;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};
use wattlens_types::{Granularity, ProductionSample};

use crate::config::UploadConfig;
use crate::error::IngestError;

pub use columns::{ColumnMatch, DetectedColumns, detect_columns};
pub use delimited::sniff_delimiter;
pub use values::{normalize_number, parse_timestamp, serial_to_datetime};

/// Template users can model their own export on
pub const SAMPLE_PRODUCTION_CSV: &str = include_str!("../../assets/sample-production.csv");
pub const SAMPLE_FILE_NAME: &str = "sample-production.csv";

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["csv", "txt", "xlsx", "xls"];

/// Raw cell before it is interpreted as a timestamp or a quantity
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn header_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(value) => value.to_string(),
            Self::DateTime(dt) => dt.to_string(),
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Empty => None,
            Self::Text(text) => parse_timestamp(text),
            Self::Number(serial) => serial_to_datetime(*serial),
            Self::DateTime(dt) => Some(*dt),
        }
    }

    fn quantity(&self) -> f64 {
        match self {
            Self::Text(text) => normalize_number(text),
            Self::Number(value) if value.is_finite() => *value,
            Self::Number(_) | Self::Empty | Self::DateTime(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// `.csv` / `.txt`
    Delimited,
    /// `.xlsx` / `.xls`
    Spreadsheet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedUpload {
    /// Ascending by timestamp
    pub samples: Vec<ProductionSample>,
    pub columns: DetectedColumns,
    pub parsed_rows: usize,
    pub dropped_rows: usize,
    pub granularity: Granularity,
}

impl ParsedUpload {
    pub fn total_production_kwh(&self) -> f64 {
        self.samples.iter().map(|s| s.production_kwh).sum()
    }
}

fn upload_kind(name: &str) -> Result<UploadKind, IngestError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => Ok(UploadKind::Delimited),
        "xlsx" | "xls" => Ok(UploadKind::Spreadsheet),
        _ => Err(IngestError::UnsupportedExtension(extension)),
    }
}

/// Reject a file by name and size before any bytes are parsed
pub fn validate_upload(name: &str, size: u64, max_bytes: u64) -> Result<UploadKind, IngestError> {
    let kind = upload_kind(name)?;
    if size > max_bytes {
        return Err(IngestError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }
    Ok(kind)
}

/// Parse file contents, dispatching on the file name's extension
pub fn parse_production_file(name: &str, bytes: &[u8]) -> Result<ParsedUpload, IngestError> {
    let rows = match upload_kind(name)? {
        UploadKind::Delimited => delimited::read_rows(bytes)?,
        UploadKind::Spreadsheet => spreadsheet::read_rows(bytes)?,
    };
    build_upload(rows)
}

/// Validate and parse a file from disk
pub fn read_upload(path: &Path, config: &UploadConfig) -> Result<ParsedUpload, IngestError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let size = std::fs::metadata(path)?.len();
    validate_upload(name, size, config.max_bytes)?;

    let bytes = std::fs::read(path)?;
    info!("📄 Reading production data from {}", path.display());
    parse_production_file(name, &bytes)
}

fn build_upload(rows: Vec<Vec<Cell>>) -> Result<ParsedUpload, IngestError> {
    let mut rows = rows.into_iter().peekable();
    let Some(first_row) = rows.peek() else {
        return Err(IngestError::NoRows);
    };

    let headers: Vec<String> = first_row.iter().map(Cell::header_text).collect();
    let columns = detect_columns(&headers);

    // A file without a header row starts straight away with a readable timestamp
    let headerless = !columns.timestamp.by_keyword
        && !columns.production.by_keyword
        && first_row
            .get(columns.timestamp.index)
            .and_then(Cell::timestamp)
            .is_some();
    if headerless {
        debug!("No header row detected, first row is data");
    } else {
        rows.next();
    }

    debug!(
        "Timestamp column {} ({:?}), production column {} ({:?})",
        columns.timestamp.index,
        columns.timestamp.header,
        columns.production.index,
        columns.production.header
    );

    let mut samples = Vec::new();
    let mut dropped_rows = 0;
    for (idx, row) in rows.enumerate() {
        let Some(timestamp) = row.get(columns.timestamp.index).and_then(Cell::timestamp) else {
            debug!("Dropping data row {}: unreadable timestamp", idx + 1);
            dropped_rows += 1;
            continue;
        };

        let production_kwh = row
            .get(columns.production.index)
            .map_or(0.0, Cell::quantity);
        if production_kwh < 0.0 {
            debug!("Dropping data row {}: negative production {}", idx + 1, production_kwh);
            dropped_rows += 1;
            continue;
        }

        samples.push(ProductionSample {
            timestamp,
            production_kwh,
        });
    }

    if samples.is_empty() {
        warn!("No production rows could be parsed ({} dropped)", dropped_rows);
        return Err(IngestError::NoRows);
    }

    samples.sort_by_key(|s| s.timestamp);
    let granularity = Granularity::detect(&samples);
    info!(
        "Parsed {} production rows ({} dropped), {:?} data",
        samples.len(),
        dropped_rows,
        granularity
    );

    Ok(ParsedUpload {
        parsed_rows: samples.len(),
        samples,
        columns,
        dropped_rows,
        granularity,
    })
}
