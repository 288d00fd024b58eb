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

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::debug;

use super::Cell;
use super::values::serial_to_datetime;
use crate::error::IngestError;

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            if text.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(text.clone())
            }
        }
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64()).map_or(Cell::Empty, Cell::DateTime),
        Data::Bool(_) | Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// Read the first worksheet of an `.xlsx`/`.xls` workbook, header row included
pub(crate) fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(first_sheet) = sheet_names.first() else {
        return Err(IngestError::Spreadsheet("workbook has no sheets".to_owned()));
    };
    debug!("Reading worksheet '{}'", first_sheet);

    let range = workbook
        .worksheet_range(first_sheet)
        .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

    let rows = range
        .rows()
        .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)))
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    Ok(rows)
}
