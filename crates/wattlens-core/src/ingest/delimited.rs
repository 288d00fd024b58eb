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

use tracing::debug;

use super::Cell;
use crate::error::IngestError;

/// Pick the delimiter used by the header line: semicolon, then tab, then comma
pub fn sniff_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') {
        b';'
    } else if header_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

/// Decode as UTF-8, falling back to Latin-1 for older exports
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_owned(),
        Err(_) => {
            debug!("Upload is not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Read every non-empty line of a CSV/TSV file as cells, header row included
pub(crate) fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, IngestError> {
    let text = decode(bytes);
    let header_line = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let delimiter = sniff_delimiter(header_line);
    debug!("Delimited upload uses {:?} as delimiter", char::from(delimiter));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_owned())
                }
            })
            .collect();
        if row.iter().all(|cell| matches!(cell, Cell::Empty)) {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}
