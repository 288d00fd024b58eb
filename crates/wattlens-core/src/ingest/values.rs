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

//! Locale-tolerant cell value parsing.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Largest serial a spreadsheet can hold (9999-12-31)
const MAX_SPREADSHEET_SERIAL: f64 = 2_958_465.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse a number the way people type them in Nordic and German spreadsheets.
///
/// Spaces (including non-breaking and narrow ones) are thousands separators. A lone
/// comma is a decimal comma; when both `,` and `.` appear, the rightmost one is the
/// decimal separator. Anything else that is not a digit, a leading sign or the first
/// decimal point is dropped. Values that still do not parse are `0.0`.
#[must_use]
pub fn normalize_number(raw: &str) -> f64 {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{00A0}' | '\u{202F}' | '\u{2009}'))
        .collect();

    let with_point = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(point)) if comma > point => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };

    let mut cleaned = String::with_capacity(with_point.len());
    let mut seen_point = false;
    for c in with_point.chars() {
        match c {
            '0'..='9' => cleaned.push(c),
            '-' | '+' if cleaned.is_empty() => cleaned.push(c),
            '.' if !seen_point => {
                seen_point = true;
                cleaned.push(c);
            }
            _ => {}
        }
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Convert a spreadsheet date serial (days since 1899-12-30) to a wall-clock time.
///
/// Fractions of a day are rounded to the nearest second.
#[must_use]
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_SPREADSHEET_SERIAL).contains(&serial) {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc();
    let seconds = ((serial - days) * SECONDS_PER_DAY).round();

    epoch
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds as i64))
}

/// Parse a timestamp cell given as text.
///
/// Plain numbers are spreadsheet serials. Otherwise RFC 3339 (kept in its own offset),
/// the common date-time layouts, date-only layouts (midnight), and finally any
/// `YYYY-MM-DD HH:MM[:SS]` embedded in longer text.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(serial) = text.parse::<f64>() {
        return serial_to_datetime(serial);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    find_embedded_datetime(text)
}

fn find_embedded_datetime(text: &str) -> Option<NaiveDateTime> {
    (0..text.len()).find_map(|start| {
        let parse = |len: usize, format: &str| {
            text.get(start..start + len)
                .and_then(|candidate| NaiveDateTime::parse_from_str(candidate, format).ok())
        };
        parse(19, "%Y-%m-%d %H:%M:%S").or_else(|| parse(16, "%Y-%m-%d %H:%M"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_swedish_thousands_and_decimal_comma() {
        assert!((normalize_number("1 234,56") - 1234.56).abs() < 1e-9);
        assert!((normalize_number("1\u{00A0}234,56") - 1234.56).abs() < 1e-9);
        assert!((normalize_number("0,75") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_rightmost_separator_is_decimal() {
        assert!((normalize_number("1.234,5") - 1234.5).abs() < 1e-9);
        assert!((normalize_number("1,234.5") - 1234.5).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_numbers_become_zero() {
        assert!(normalize_number("abc").abs() < f64::EPSILON);
        assert!(normalize_number("").abs() < f64::EPSILON);
        assert!(normalize_number("-").abs() < f64::EPSILON);
    }

    #[test]
    fn test_units_and_signs() {
        assert!((normalize_number("12.5 kWh") - 12.5).abs() < 1e-9);
        assert!((normalize_number("-3,2") + 3.2).abs() < 1e-9);
        assert!((normalize_number("1.2.3") - 1.23).abs() < 1e-9);
    }

    #[test]
    fn test_serial_uses_1899_epoch() {
        let dt = serial_to_datetime(45658.0).unwrap();
        assert!(dt.date() >= NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert_eq!(dt, at(2025, 1, 1, 0, 0));

        let noon = serial_to_datetime(45658.5).unwrap();
        assert_eq!(noon.hour(), 12);

        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_iso_like_timestamps() {
        assert_eq!(parse_timestamp("2025-03-04 13:00"), Some(at(2025, 3, 4, 13, 0)));
        assert_eq!(parse_timestamp("2025-03-04T13:00:00"), Some(at(2025, 3, 4, 13, 0)));
        assert_eq!(
            parse_timestamp("2025-03-04T13:00:00+01:00"),
            Some(at(2025, 3, 4, 13, 0))
        );
        assert_eq!(parse_timestamp("2025/03/04 13:00"), Some(at(2025, 3, 4, 13, 0)));
    }

    #[test]
    fn test_european_and_date_only_timestamps() {
        assert_eq!(parse_timestamp("04.03.2025 13:00"), Some(at(2025, 3, 4, 13, 0)));
        assert_eq!(parse_timestamp("2025-03-04"), Some(at(2025, 3, 4, 0, 0)));
    }

    #[test]
    fn test_numeric_text_is_a_serial() {
        let dt = parse_timestamp("45658").unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.ordinal(), 1);
    }

    #[test]
    fn test_embedded_timestamp_fallback() {
        assert_eq!(
            parse_timestamp("Mon 2025-03-04 13:00 CET"),
            Some(at(2025, 3, 4, 13, 0))
        );
    }

    #[test]
    fn test_garbage_timestamps_are_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }
}
