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

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// One reading from an uploaded production file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSample {
    /// Local wall-clock time of the reading
    pub timestamp: NaiveDateTime,

    /// Energy produced in the interval starting at `timestamp` (kWh, never negative)
    pub production_kwh: f64,
}

/// One hourly spot price as returned by the price API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// ISO 8601 timestamp exactly as delivered upstream
    pub timestamp_iso: String,

    /// Price in the caller's display currency per kWh
    pub price_per_kwh: f64,
}

impl PriceSample {
    /// Wall-clock time in the offset the API reported.
    ///
    /// Timestamps without an offset are taken as local already.
    pub fn local_timestamp(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp_iso) {
            return Some(dt.naive_local());
        }
        NaiveDateTime::parse_from_str(&self.timestamp_iso, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp_iso, "%Y-%m-%dT%H:%M"))
            .ok()
    }
}

/// Resolution of an uploaded production series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    /// One total per day, stamped at midnight
    Daily,
}

impl Granularity {
    pub fn detect(samples: &[ProductionSample]) -> Self {
        if !samples.is_empty() && samples.iter().all(|s| s.timestamp.hour() == 0) {
            Self::Daily
        } else {
            Self::Hourly
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(day: u32, hour: u32) -> ProductionSample {
        ProductionSample {
            timestamp: NaiveDate::from_ymd_opt(2025, 6, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            production_kwh: 1.0,
        }
    }

    #[test]
    fn test_granularity_daily_when_all_midnight() {
        let samples = vec![sample(1, 0), sample(2, 0), sample(3, 0)];
        assert_eq!(Granularity::detect(&samples), Granularity::Daily);
    }

    #[test]
    fn test_granularity_hourly_with_any_daytime_hour() {
        let samples = vec![sample(1, 0), sample(1, 1)];
        assert_eq!(Granularity::detect(&samples), Granularity::Hourly);
        assert_eq!(Granularity::detect(&[]), Granularity::Hourly);
    }

    #[test]
    fn test_price_sample_keeps_reported_offset() {
        let price = PriceSample {
            timestamp_iso: "2025-03-04T13:00:00+01:00".to_owned(),
            price_per_kwh: 0.5,
        };
        let local = price.local_timestamp().unwrap();
        assert_eq!(local.hour(), 13);

        let naive = PriceSample {
            timestamp_iso: "2025-03-04T13:00".to_owned(),
            price_per_kwh: 0.5,
        };
        assert_eq!(naive.local_timestamp().unwrap().hour(), 13);

        let garbage = PriceSample {
            timestamp_iso: "yesterday".to_owned(),
            price_per_kwh: 0.5,
        };
        assert!(garbage.local_timestamp().is_none());
    }
}
