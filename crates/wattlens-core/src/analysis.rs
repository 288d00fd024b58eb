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

//! Reconciliation of spot prices against production, and run management for the
//! negative-price calculator.

use chrono::{Datelike, NaiveDate, Timelike};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wattlens_types::{Currency, Granularity, PriceSample, PriceZone};

use crate::calculators::negative_prices::{
    MonthlyBreakdown, NegativePriceSummary, POTENTIAL_SAVINGS_SHARE, loss_factor,
};
use crate::error::{CalculationError, PriceError};
use crate::ingest::ParsedUpload;
use crate::pricing::{FetchProgress, PriceClient};
use crate::rounding::{percentage, round_two_decimals};
use crate::tables::{SOLAR_HOURLY_CURVE, SOLAR_MONTHLY_SHARE, zone_profile};

/// Where hourly production comes from
#[derive(Debug, Clone)]
pub enum ProductionSource {
    Uploaded(ParsedUpload),
    /// Modelled from the zone's specific yield
    Estimated { system_kwp: f64, zone: PriceZone },
}

type HourKey = (NaiveDate, u32);

/// Production lookup by local date and hour
enum ProductionProfile {
    Hourly(HashMap<HourKey, f64>),
    /// Daily totals spread over the day with the solar curve
    Daily(HashMap<NaiveDate, f64>),
    Estimated { annual_kwh: f64 },
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

fn curve_share(hour: u32) -> f64 {
    SOLAR_HOURLY_CURVE.get(hour as usize).copied().unwrap_or(0.0)
}

impl ProductionProfile {
    fn from_source(source: &ProductionSource) -> Self {
        match source {
            ProductionSource::Uploaded(upload) => match upload.granularity {
                Granularity::Hourly => {
                    let mut hours = HashMap::new();
                    for sample in &upload.samples {
                        let key = (sample.timestamp.date(), sample.timestamp.hour());
                        *hours.entry(key).or_insert(0.0) += sample.production_kwh;
                    }
                    Self::Hourly(hours)
                }
                Granularity::Daily => {
                    let mut days = HashMap::new();
                    for sample in &upload.samples {
                        *days.entry(sample.timestamp.date()).or_insert(0.0) +=
                            sample.production_kwh;
                    }
                    Self::Daily(days)
                }
            },
            ProductionSource::Estimated { system_kwp, zone } => Self::Estimated {
                annual_kwh: system_kwp.max(0.0) * zone_profile(*zone).solar_yield_kwh_per_kwp,
            },
        }
    }

    fn production_at(&self, (date, hour): HourKey) -> f64 {
        match self {
            Self::Hourly(hours) => hours.get(&(date, hour)).copied().unwrap_or(0.0),
            Self::Daily(days) => days.get(&date).copied().unwrap_or(0.0) * curve_share(hour),
            Self::Estimated { annual_kwh } => {
                let month_share = SOLAR_MONTHLY_SHARE
                    .get(date.month0() as usize)
                    .copied()
                    .unwrap_or(0.0);
                let days = f64::from(days_in_month(date.year(), date.month()));
                let daily = annual_kwh * month_share / days;
                daily * curve_share(hour)
            }
        }
    }
}

#[derive(Default)]
struct MonthTotals {
    negative_hours: u32,
    production_during_negative_kwh: f64,
    lost_revenue: f64,
}

/// Join prices with production hour by hour and summarize the negative hours.
///
/// Prices must already be in `currency` per kWh. Samples whose timestamp cannot be read
/// are ignored.
#[must_use]
pub fn analyze(
    prices: &[PriceSample],
    production: &ProductionSource,
    has_battery: bool,
    currency: Currency,
) -> NegativePriceSummary {
    let profile = ProductionProfile::from_source(production);
    let factor = loss_factor(has_battery);

    let mut total_hours = 0_u32;
    let mut negative_hours = 0_u32;
    let mut total_production = 0.0;
    let mut production_negative = 0.0;
    let mut lost_revenue = 0.0;
    let mut negative_price_sum = 0.0;
    let mut worst_price = 0.0_f64;
    let mut first_day: Option<NaiveDate> = None;
    let mut last_day: Option<NaiveDate> = None;
    let mut months: BTreeMap<(i32, u32), MonthTotals> = BTreeMap::new();

    for sample in prices {
        let Some(timestamp) = sample.local_timestamp() else {
            debug!("Ignoring price with unreadable timestamp {:?}", sample.timestamp_iso);
            continue;
        };
        let date = timestamp.date();
        first_day = Some(first_day.map_or(date, |d| d.min(date)));
        last_day = Some(last_day.map_or(date, |d| d.max(date)));

        let produced = profile.production_at((date, timestamp.hour()));
        total_hours += 1;
        total_production += produced;

        let month = months.entry((date.year(), date.month())).or_default();
        let price = sample.price_per_kwh;
        if price < 0.0 {
            let loss = produced * price.abs() * factor;
            negative_hours += 1;
            production_negative += produced;
            lost_revenue += loss;
            negative_price_sum += price;
            worst_price = worst_price.min(price);

            month.negative_hours += 1;
            month.production_during_negative_kwh += produced;
            month.lost_revenue += loss;
        }
    }

    let avg_negative_price = if negative_hours > 0 {
        negative_price_sum / f64::from(negative_hours)
    } else {
        0.0
    };

    let monthly = months
        .into_iter()
        .map(|((year, month), totals)| MonthlyBreakdown {
            month: format!("{year:04}-{month:02}"),
            negative_hours: totals.negative_hours,
            production_during_negative_kwh: round_two_decimals(
                totals.production_during_negative_kwh,
            ),
            lost_revenue: round_two_decimals(totals.lost_revenue),
        })
        .collect();

    info!(
        "Analyzed {} priced hours, {} negative, lost revenue {:.2} {}",
        total_hours, negative_hours, lost_revenue, currency
    );

    NegativePriceSummary {
        currency,
        total_hours,
        negative_price_hours: negative_hours,
        negative_percentage: percentage(f64::from(negative_hours), f64::from(total_hours)),
        total_production_kwh: round_two_decimals(total_production),
        production_during_negative_kwh: round_two_decimals(production_negative),
        lost_revenue: round_two_decimals(lost_revenue),
        avg_negative_price: round_two_decimals(avg_negative_price),
        worst_negative_price: round_two_decimals(worst_price),
        potential_savings: round_two_decimals(lost_revenue * POTENTIAL_SAVINGS_SHARE),
        potential_exposure: round_two_decimals(production_negative * worst_price.abs()),
        monthly,
        analyzed_from: first_day,
        analyzed_to: last_day,
    }
}

/// Hands out one cancellation token per calculation run.
///
/// Starting a run cancels the one before it, so a superseded fetch stops at its next
/// page instead of racing the newer run.
#[derive(Debug, Default)]
pub struct RunTracker {
    current: Mutex<Option<CancellationToken>>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.replace(token.clone()) {
            debug!("Cancelling superseded calculation run");
            previous.cancel();
        }
        token
    }

    /// Cancel the active run, if any
    pub fn cancel_current(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = current.take() {
            token.cancel();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativePriceRequest {
    pub zone: PriceZone,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub currency: Currency,
    pub has_battery: bool,
}

/// Fetch prices for the request and reconcile them with production under one run token
pub async fn run_negative_price_analysis(
    client: &PriceClient,
    request: &NegativePriceRequest,
    production: &ProductionSource,
    cancel: &CancellationToken,
    on_progress: impl FnMut(FetchProgress),
) -> Result<NegativePriceSummary, CalculationError> {
    let series = client
        .fetch_range(
            request.zone,
            request.from,
            request.to,
            request.currency,
            cancel,
            on_progress,
        )
        .await?;

    if cancel.is_cancelled() {
        return Err(PriceError::Cancelled.into());
    }

    Ok(analyze(
        &series.samples,
        production,
        request.has_battery,
        request.currency,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{ColumnMatch, DetectedColumns};
    use chrono::NaiveDateTime;
    use wattlens_types::ProductionSample;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn price(day: u32, hour: u32, price_per_kwh: f64) -> PriceSample {
        PriceSample {
            timestamp_iso: format!("2025-06-{day:02}T{hour:02}:00:00+02:00"),
            price_per_kwh,
        }
    }

    fn upload(samples: Vec<ProductionSample>) -> ProductionSource {
        let column = |index| ColumnMatch {
            index,
            header: String::new(),
            by_keyword: true,
        };
        ProductionSource::Uploaded(ParsedUpload {
            granularity: Granularity::detect(&samples),
            parsed_rows: samples.len(),
            dropped_rows: 0,
            columns: DetectedColumns {
                timestamp: column(0),
                production: column(1),
            },
            samples,
        })
    }

    fn hourly_upload() -> ProductionSource {
        upload(vec![
            ProductionSample {
                timestamp: at(1, 12),
                production_kwh: 4.0,
            },
            ProductionSample {
                timestamp: at(1, 13),
                production_kwh: 3.0,
            },
        ])
    }

    #[test]
    fn test_one_negative_hour_of_two() {
        let prices = vec![price(1, 12, -0.5), price(1, 13, 0.8)];
        let summary = analyze(&prices, &hourly_upload(), false, Currency::Sek);

        assert_eq!(summary.total_hours, 2);
        assert_eq!(summary.negative_price_hours, 1);
        assert!((summary.negative_percentage - 50.0).abs() < f64::EPSILON);
        assert!((summary.production_during_negative_kwh - 4.0).abs() < 1e-9);
        assert!((summary.lost_revenue - 2.0).abs() < 1e-9);
        assert!((summary.potential_savings - 1.4).abs() < 1e-9);
        assert!((summary.total_production_kwh - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_battery_attenuates_loss_but_not_exposure() {
        let prices = vec![price(1, 12, -0.5), price(1, 13, -0.1)];
        let without = analyze(&prices, &hourly_upload(), false, Currency::Eur);
        let with = analyze(&prices, &hourly_upload(), true, Currency::Eur);

        // 4 * 0.5 + 3 * 0.1
        assert!((without.lost_revenue - 2.3).abs() < 1e-9);
        assert!((with.lost_revenue - 0.69).abs() < 1e-9);
        // 7 kWh at the worst price of -0.5
        assert!((with.potential_exposure - 3.5).abs() < 1e-9);
        assert!((with.potential_exposure - without.potential_exposure).abs() < f64::EPSILON);
        assert!((with.worst_negative_price + 0.5).abs() < 1e-9);
        assert!((with.avg_negative_price + 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_daily_totals_follow_solar_curve() {
        let daily = upload(vec![ProductionSample {
            timestamp: at(1, 0),
            production_kwh: 10.0,
        }]);
        let prices = vec![price(1, 12, -1.0), price(1, 2, -1.0)];
        let summary = analyze(&prices, &daily, false, Currency::Eur);

        assert_eq!(summary.negative_price_hours, 2);
        let expected = 10.0 * SOLAR_HOURLY_CURVE[12];
        assert!((summary.production_during_negative_kwh - expected).abs() < 1e-9);
    }

    #[test]
    fn test_estimated_production_is_zero_at_night() {
        let source = ProductionSource::Estimated {
            system_kwp: 10.0,
            zone: PriceZone::Se3,
        };
        let night = analyze(&[price(1, 2, -0.1)], &source, false, Currency::Eur);
        let noon = analyze(&[price(1, 12, -0.1)], &source, false, Currency::Eur);

        assert!(night.production_during_negative_kwh.abs() < f64::EPSILON);
        assert!(noon.production_during_negative_kwh > 0.0);
        assert!(noon.lost_revenue > 0.0);
    }

    #[test]
    fn test_hours_without_production_still_count() {
        let prices = vec![price(5, 12, -0.2), price(5, 13, 0.1)];
        let summary = analyze(&prices, &hourly_upload(), false, Currency::Eur);

        assert_eq!(summary.negative_price_hours, 1);
        assert!(summary.lost_revenue.abs() < f64::EPSILON);
        assert!(summary.total_production_kwh.abs() < f64::EPSILON);
    }

    #[test]
    fn test_monthly_breakdown_and_period() {
        let prices = vec![
            price(30, 12, -0.2),
            PriceSample {
                timestamp_iso: "2025-07-01T12:00:00+02:00".to_owned(),
                price_per_kwh: 0.3,
            },
        ];
        let summary = analyze(&prices, &hourly_upload(), false, Currency::Eur);

        let keys: Vec<&str> = summary.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2025-06", "2025-07"]);
        assert_eq!(summary.monthly[0].negative_hours, 1);
        assert_eq!(summary.monthly[1].negative_hours, 0);
        assert_eq!(summary.analyzed_from, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(summary.analyzed_to, NaiveDate::from_ymd_opt(2025, 7, 1));
    }

    #[test]
    fn test_no_prices_is_all_zero() {
        let summary = analyze(&[], &hourly_upload(), false, Currency::Eur);
        assert_eq!(summary.total_hours, 0);
        assert!(summary.negative_percentage.abs() < f64::EPSILON);
        assert!(summary.avg_negative_price.abs() < f64::EPSILON);
        assert!(summary.analyzed_from.is_none());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_new_run_cancels_previous() {
        let tracker = RunTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        tracker.cancel_current();
        assert!(second.is_cancelled());
    }
}
