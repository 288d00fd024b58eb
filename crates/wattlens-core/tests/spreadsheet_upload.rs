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

use chrono::{NaiveDate, Timelike};
use wattlens_core::{UploadKind, parse_production_file, validate_upload};
use wattlens_types::Granularity;

// Sheet "Produktion": header `Datum | Produktion kWh`, then
//   45658.5 (date-formatted cell) | "2,5"
//   45658.458333 (plain serial)   | 1.5
//   "2025-01-01 13:00"            | -1
// Sheet "Arkiv": one 2025-02-01 row with 99 kWh that must never be read.
const WORKBOOK: &[u8] = include_bytes!("fixtures/production.xlsx");

#[test]
fn test_workbook_reads_first_sheet_only() {
    let kind = validate_upload("export.xlsx", WORKBOOK.len() as u64, 10 * 1024 * 1024).unwrap();
    assert_eq!(kind, UploadKind::Spreadsheet);

    let upload = parse_production_file("export.xlsx", WORKBOOK).unwrap();

    assert_eq!(upload.parsed_rows, 2);
    assert_eq!(upload.dropped_rows, 1);
    assert_eq!(upload.granularity, Granularity::Hourly);
    assert!(upload.columns.timestamp.by_keyword);
    assert!(upload.columns.production.by_keyword);
    assert!(upload.samples.iter().all(|s| s.production_kwh < 99.0));
    assert!(
        upload
            .samples
            .iter()
            .all(|s| s.timestamp.date() == NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    );
}

#[test]
fn test_workbook_rows_are_sorted_with_serials_and_date_cells() {
    let upload = parse_production_file("EXPORT.XLSX", WORKBOOK).unwrap();

    // Plain serial row comes second in the sheet but first in time
    let first = &upload.samples[0];
    assert_eq!(first.timestamp.hour(), 11);
    assert_eq!(first.timestamp.minute(), 0);
    assert!((first.production_kwh - 1.5).abs() < 1e-9);

    // Date-formatted cell with a decimal-comma text value
    let second = &upload.samples[1];
    assert_eq!(second.timestamp.hour(), 12);
    assert!((second.production_kwh - 2.5).abs() < 1e-9);

    assert!((upload.total_production_kwh() - 4.0).abs() < 1e-9);
}
