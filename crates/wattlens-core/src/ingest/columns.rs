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

use serde::{Deserialize, Serialize};

/// Header words that mark the timestamp column (English, Swedish, Norwegian, Danish,
/// Finnish, German)
const TIMESTAMP_KEYWORDS: [&str; 14] = [
    "date", "time", "timestamp", "datum", "dato", "tid", "zeit", "uhrzeit", "päivä", "aika",
    "period", "hour", "timme", "stunde",
];

/// Header words that mark the production column
const PRODUCTION_KEYWORDS: [&str; 16] = [
    "kwh",
    "production",
    "produktion",
    "produksjon",
    "tuotanto",
    "energy",
    "energi",
    "energie",
    "yield",
    "ertrag",
    "generation",
    "erzeugung",
    "output",
    "solar",
    "pv",
    "wh",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub index: usize,
    /// Header text of the column, empty when the file has fewer columns
    pub header: String,
    /// False when no header matched and the positional default was used
    pub by_keyword: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedColumns {
    pub timestamp: ColumnMatch,
    pub production: ColumnMatch,
}

fn find_keyword(headers: &[String], keywords: &[&str], skip: Option<usize>) -> Option<usize> {
    headers.iter().enumerate().find_map(|(idx, header)| {
        if Some(idx) == skip {
            return None;
        }
        let lower = header.to_lowercase();
        keywords
            .iter()
            .any(|keyword| lower.contains(keyword))
            .then_some(idx)
    })
}

fn column(headers: &[String], index: usize, by_keyword: bool) -> ColumnMatch {
    ColumnMatch {
        index,
        header: headers.get(index).cloned().unwrap_or_default(),
        by_keyword,
    }
}

/// Locate the timestamp and production columns in a header row.
///
/// Unmatched roles fall back to column 0 for the timestamp and column 1 for production.
pub fn detect_columns(headers: &[String]) -> DetectedColumns {
    let ts_match = find_keyword(headers, &TIMESTAMP_KEYWORDS, None);
    let ts_index = ts_match.unwrap_or(0);

    let prod_match = find_keyword(headers, &PRODUCTION_KEYWORDS, Some(ts_index));
    let prod_index = prod_match.unwrap_or(if ts_index == 1 { 0 } else { 1 });

    DetectedColumns {
        timestamp: column(headers, ts_index, ts_match.is_some()),
        production: column(headers, prod_index, prod_match.is_some()),
    }
}
