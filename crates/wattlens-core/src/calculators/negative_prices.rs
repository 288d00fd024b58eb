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

//! Negative electricity prices.
//!
//! The summary types here are shared by the table-driven estimate below and by the
//! reconciliation of fetched prices against real or modelled production.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wattlens_types::{Country, Currency, PriceZone};

use crate::rounding::{percentage, round_two_decimals};
use crate::tables::{NEGATIVE_HOURS_MONTHLY_SHARE, zone_profile};

/// Share of negative-hour losses still incurred when a battery absorbs the surplus
pub const BATTERY_LOSS_ATTENUATION: f64 = 0.3;

/// Share of lost revenue a controller that curtails or shifts production can recover
pub const POTENTIAL_SAVINGS_SHARE: f64 = 0.7;

const HOURS_PER_YEAR: f64 = 8760.0;

/// Average PV output during negative hours, per kWp installed (kW)
const NEGATIVE_HOUR_OUTPUT_PER_KWP: f64 = 0.55;

/// Ratio of the deepest negative price of a year to its average negative price
const WORST_TO_AVERAGE_RATIO: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    /// `YYYY-MM` for analyzed data, `MM` for a typical-year estimate
    pub month: String,
    pub negative_hours: u32,
    pub production_during_negative_kwh: f64,
    pub lost_revenue: f64,
}

/// Outcome of a negative-price analysis in the caller's currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativePriceSummary {
    pub currency: Currency,
    pub total_hours: u32,
    pub negative_price_hours: u32,
    pub negative_percentage: f64,
    pub total_production_kwh: f64,
    pub production_during_negative_kwh: f64,
    pub lost_revenue: f64,
    /// Average price over negative hours (per kWh, zero when there were none)
    pub avg_negative_price: f64,
    /// Most negative price seen (per kWh, zero when there were none)
    pub worst_negative_price: f64,
    pub potential_savings: f64,
    /// Loss if every negative hour had been priced at the worst price, without a battery
    pub potential_exposure: f64,
    pub monthly: Vec<MonthlyBreakdown>,
    pub analyzed_from: Option<NaiveDate>,
    pub analyzed_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativePricesInput {
    pub country: Country,
    pub zone: PriceZone,
    pub currency: Currency,
    pub system_kwp: f64,
    pub has_battery: bool,
}

impl Default for NegativePricesInput {
    fn default() -> Self {
        Self {
            country: Country::Sweden,
            zone: PriceZone::Se3,
            currency: Currency::Sek,
            system_kwp: 10.0,
            has_battery: false,
        }
    }
}

pub(crate) fn loss_factor(has_battery: bool) -> f64 {
    if has_battery {
        BATTERY_LOSS_ATTENUATION
    } else {
        1.0
    }
}

/// Spread whole negative hours over the calendar months.
///
/// Largest-remainder rounding, so the months always add up to `total`.
fn split_hours_by_month(total: u32) -> [u32; 12] {
    let exact = NEGATIVE_HOURS_MONTHLY_SHARE.map(|share| f64::from(total) * share);
    let mut hours = exact.map(|value| value.floor() as u32);

    let assigned: u32 = hours.iter().sum();
    let mut by_remainder: Vec<usize> = (0..hours.len()).collect();
    by_remainder.sort_by(|&a, &b| exact[b].fract().total_cmp(&exact[a].fract()));
    for &idx in by_remainder.iter().take(total.saturating_sub(assigned) as usize) {
        hours[idx] += 1;
    }
    hours
}

/// Typical-year estimate from the zone tables, without any price history
#[must_use]
pub fn estimate(input: &NegativePricesInput) -> NegativePriceSummary {
    let profile = zone_profile(input.country.resolve_zone(input.zone));
    let currency = input.currency;
    let system_kwp = input.system_kwp.max(0.0);

    let negative_hours = profile.negative_hours_per_year;
    let total_production = system_kwp * profile.solar_yield_kwh_per_kwp;
    let production_negative = system_kwp * NEGATIVE_HOUR_OUTPUT_PER_KWP * negative_hours;

    let avg_price = currency.from_eur(profile.avg_negative_price_eur);
    let worst_price = avg_price * WORST_TO_AVERAGE_RATIO;

    let lost_revenue = production_negative * avg_price.abs() * loss_factor(input.has_battery);
    let potential_exposure = production_negative * worst_price.abs();

    let negative_price_hours = negative_hours.round() as u32;
    let monthly_hours = split_hours_by_month(negative_price_hours);

    let monthly = NEGATIVE_HOURS_MONTHLY_SHARE
        .iter()
        .zip(monthly_hours)
        .enumerate()
        .map(|(idx, (share, hours))| MonthlyBreakdown {
            month: format!("{:02}", idx + 1),
            negative_hours: hours,
            production_during_negative_kwh: round_two_decimals(production_negative * share),
            lost_revenue: round_two_decimals(lost_revenue * share),
        })
        .collect();

    NegativePriceSummary {
        currency,
        total_hours: HOURS_PER_YEAR as u32,
        negative_price_hours,
        negative_percentage: percentage(negative_hours, HOURS_PER_YEAR),
        total_production_kwh: round_two_decimals(total_production),
        production_during_negative_kwh: round_two_decimals(production_negative),
        lost_revenue: round_two_decimals(lost_revenue),
        avg_negative_price: round_two_decimals(avg_price),
        worst_negative_price: round_two_decimals(worst_price),
        potential_savings: round_two_decimals(lost_revenue * POTENTIAL_SAVINGS_SHARE),
        potential_exposure: round_two_decimals(potential_exposure),
        monthly,
        analyzed_from: None,
        analyzed_to: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_for_default_input() {
        let result = estimate(&NegativePricesInput::default());

        assert_eq!(result.negative_price_hours, 300);
        assert_eq!(result.total_hours, 8760);
        assert!((result.negative_percentage - 3.4).abs() < 1e-9);
        // 10 kWp * 0.55 kW * 300 h
        assert!((result.production_during_negative_kwh - 1650.0).abs() < 1e-9);
        assert!(result.lost_revenue > 0.0);
        assert!(result.worst_negative_price < result.avg_negative_price);
        assert_eq!(result.monthly.len(), 12);
        assert_eq!(result.monthly[0].month, "01");
    }

    #[test]
    fn test_battery_attenuates_losses_only() {
        let without = estimate(&NegativePricesInput::default());
        let with = estimate(&NegativePricesInput {
            has_battery: true,
            ..NegativePricesInput::default()
        });

        assert!(with.lost_revenue < without.lost_revenue);
        assert!((with.lost_revenue - without.lost_revenue * BATTERY_LOSS_ATTENUATION).abs() < 0.05);
        assert!((with.potential_exposure - without.potential_exposure).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_system_size() {
        let result = estimate(&NegativePricesInput {
            system_kwp: 0.0,
            ..NegativePricesInput::default()
        });

        assert!(result.total_production_kwh.abs() < f64::EPSILON);
        assert!(result.lost_revenue.abs() < f64::EPSILON);
        assert!(result.potential_savings.abs() < f64::EPSILON);
        assert_eq!(result.negative_price_hours, 300);
    }

    #[test]
    fn test_germany_sees_more_negative_hours_than_northern_sweden() {
        let de = estimate(&NegativePricesInput {
            country: Country::Germany,
            zone: PriceZone::De,
            currency: Currency::Eur,
            ..NegativePricesInput::default()
        });
        let se1 = estimate(&NegativePricesInput {
            zone: PriceZone::Se1,
            currency: Currency::Eur,
            ..NegativePricesInput::default()
        });

        assert!(de.negative_price_hours > se1.negative_price_hours);
        assert!(de.lost_revenue > se1.lost_revenue);
    }

    #[test]
    fn test_monthly_hours_add_up_to_the_year() {
        for zone in [PriceZone::Se1, PriceZone::Se3, PriceZone::No4, PriceZone::Dk2] {
            let result = estimate(&NegativePricesInput {
                country: zone.country(),
                zone,
                ..NegativePricesInput::default()
            });
            let monthly_total: u32 = result.monthly.iter().map(|m| m.negative_hours).sum();
            assert_eq!(monthly_total, result.negative_price_hours, "{zone}");
        }

        assert_eq!(split_hours_by_month(220).iter().sum::<u32>(), 220);
        assert_eq!(split_hours_by_month(0), [0; 12]);
    }

    #[test]
    fn test_zone_outside_country_uses_country_default() {
        let mismatched = estimate(&NegativePricesInput {
            country: Country::Germany,
            zone: PriceZone::Se3,
            currency: Currency::Eur,
            ..NegativePricesInput::default()
        });
        let german = estimate(&NegativePricesInput {
            country: Country::Germany,
            zone: PriceZone::De,
            currency: Currency::Eur,
            ..NegativePricesInput::default()
        });

        assert_eq!(mismatched, german);
    }
}
