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

//! Vehicle-to-home / vehicle-to-grid savings.

use serde::{Deserialize, Serialize};
use wattlens_types::{Country, Currency, PriceZone};

use crate::rounding::{payback_years, round_one_decimal, round_whole};
use crate::tables::{
    EXPORT_PRICE_FACTOR, SOLAR_STORAGE_CYCLES_PER_YEAR, V2X_ROUND_TRIP_EFFICIENCY,
    country_profile, find_ev_preset, zone_profile,
};

const DRIVING_KWH_PER_KM: f64 = 0.18;

/// Share of household demand in the evening peak a car can cover
const EVENING_DEMAND_SHARE: f64 = 0.4;

/// Share of solar production consumed directly by the house
const DIRECT_USE: f64 = 0.30;

/// Spot price gap between charging on arrival and price-following charging
const SMART_CHARGING_SPOT_GAP: f64 = 0.6;

/// Battery wear per discharged kWh (EUR)
const DEGRADATION_EUR_PER_KWH: f64 = 0.02;

const WEEKS_PER_YEAR: f64 = 52.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum V2xMode {
    SmartChargingOnly,
    V2h,
    V2g,
}

impl V2xMode {
    pub const ALL: [V2xMode; 3] = [Self::SmartChargingOnly, Self::V2h, Self::V2g];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2xInput {
    pub country: Country,
    pub zone: PriceZone,
    pub currency: Currency,
    /// Known model whose battery size replaces `ev_battery_kwh`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_model: Option<String>,
    pub ev_battery_kwh: f64,
    pub daily_km: f64,
    /// 0-7
    pub days_home_per_week: f64,
    /// Minimum state of charge kept for driving, 0-100
    pub reserve_soc_pct: f64,
    pub mode: V2xMode,
    pub annual_consumption_kwh: f64,
    pub has_solar: bool,
    pub solar_size_kwp: f64,
}

impl Default for V2xInput {
    fn default() -> Self {
        Self {
            country: Country::Sweden,
            zone: PriceZone::Se3,
            currency: Currency::Sek,
            ev_model: None,
            ev_battery_kwh: 75.0,
            daily_km: 40.0,
            days_home_per_week: 5.0,
            reserve_soc_pct: 30.0,
            mode: V2xMode::V2h,
            annual_consumption_kwh: 15_000.0,
            has_solar: false,
            solar_size_kwp: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2xScenario {
    pub mode: V2xMode,
    pub annual_discharge_kwh: f64,
    pub annual_savings: f64,
    pub investment: f64,
    pub payback_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2xResult {
    pub currency: Currency,
    pub usable_daily_kwh: f64,
    pub selected: V2xMode,
    pub scenarios: Vec<V2xScenario>,
    pub annual_savings: f64,
    pub investment: f64,
    pub payback_years: f64,
    pub equivalent_cycles_per_year: f64,
}

#[must_use]
pub fn estimate(input: &V2xInput) -> V2xResult {
    let battery = input
        .ev_model
        .as_deref()
        .and_then(find_ev_preset)
        .map_or(input.ev_battery_kwh, |preset| preset.battery_kwh)
        .max(0.0);
    let reserve = input.reserve_soc_pct.clamp(0.0, 100.0) / 100.0;
    let driving_kwh = input.daily_km.max(0.0) * DRIVING_KWH_PER_KM;
    let usable_daily = (battery * (1.0 - reserve) - driving_kwh).max(0.0);

    let scenarios: Vec<V2xScenario> = V2xMode::ALL
        .iter()
        .map(|&mode| evaluate(input, mode, usable_daily, driving_kwh))
        .collect();

    let selected = scenarios
        .iter()
        .find(|s| s.mode == input.mode)
        .cloned()
        .unwrap_or_else(|| evaluate(input, input.mode, usable_daily, driving_kwh));

    let equivalent_cycles_per_year = if battery > 0.0 {
        round_one_decimal(selected.annual_discharge_kwh / battery)
    } else {
        0.0
    };

    V2xResult {
        currency: input.currency,
        usable_daily_kwh: round_one_decimal(usable_daily),
        selected: input.mode,
        annual_savings: selected.annual_savings,
        investment: selected.investment,
        payback_years: selected.payback_years,
        equivalent_cycles_per_year,
        scenarios,
    }
}

fn evaluate(input: &V2xInput, mode: V2xMode, usable_daily: f64, driving_kwh: f64) -> V2xScenario {
    let zone = zone_profile(input.country.resolve_zone(input.zone));
    let country = country_profile(input.country);
    let home_days = input.days_home_per_week.clamp(0.0, 7.0) * WEEKS_PER_YEAR;

    // Every mode charges the driving energy when prices are low
    let smart_charging_eur = driving_kwh * home_days * zone.avg_spot_eur * SMART_CHARGING_SPOT_GAP;

    // Peak and off-peak prices straddle the zone average by half the daily spread
    let peak = zone.avg_spot_eur + zone.daily_spread_eur / 2.0;
    let off_peak = (zone.avg_spot_eur - zone.daily_spread_eur / 2.0).max(0.0);

    let (daily_discharge, discharge_eur) = match mode {
        V2xMode::SmartChargingOnly => (0.0, 0.0),
        V2xMode::V2h => {
            let evening_demand =
                input.annual_consumption_kwh.max(0.0) / 365.0 * EVENING_DEMAND_SHARE;
            let discharge = usable_daily.min(evening_demand);

            let solar_surplus = if input.has_solar {
                input.solar_size_kwp.max(0.0) * zone.solar_yield_kwh_per_kwp * (1.0 - DIRECT_USE)
                    / SOLAR_STORAGE_CYCLES_PER_YEAR
            } else {
                0.0
            };
            let from_solar = discharge.min(solar_surplus);

            // Discharging avoids a peak purchase including grid fees
            let avoided = peak + country.grid_fee_eur;
            let grid_value = (avoided
                - (off_peak + country.grid_fee_eur) / V2X_ROUND_TRIP_EFFICIENCY
                - DEGRADATION_EUR_PER_KWH)
                .max(0.0);
            let solar_value = (avoided
                - zone.avg_spot_eur * EXPORT_PRICE_FACTOR / V2X_ROUND_TRIP_EFFICIENCY
                - DEGRADATION_EUR_PER_KWH)
                .max(grid_value);

            let daily_eur = from_solar * solar_value + (discharge - from_solar) * grid_value;
            (discharge, daily_eur * home_days)
        }
        V2xMode::V2g => {
            let export_value = (peak * EXPORT_PRICE_FACTOR
                - off_peak / V2X_ROUND_TRIP_EFFICIENCY
                - DEGRADATION_EUR_PER_KWH)
                .max(0.0);
            (usable_daily, usable_daily * export_value * home_days)
        }
    };

    let investment_eur = match mode {
        V2xMode::SmartChargingOnly => country.smart_controller_eur,
        V2xMode::V2h | V2xMode::V2g => country.bidirectional_charger_eur,
    };

    let annual_savings = round_whole(input.currency.from_eur(smart_charging_eur + discharge_eur));
    let investment = round_whole(input.currency.from_eur(investment_eur));

    V2xScenario {
        mode,
        annual_discharge_kwh: round_whole(daily_discharge * home_days),
        annual_savings,
        investment,
        payback_years: payback_years(investment, annual_savings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rounding::PAYBACK_SENTINEL_YEARS;

    #[test]
    fn test_usable_capacity_respects_reserve_and_driving() {
        let result = estimate(&V2xInput::default());
        // 75 * 0.7 - 40 * 0.18
        assert!((result.usable_daily_kwh - 45.3).abs() < 1e-9);
    }

    #[test]
    fn test_ev_model_sets_battery_size() {
        let leaf = estimate(&V2xInput {
            ev_model: Some("nissan leaf".to_owned()),
            ..V2xInput::default()
        });
        // 40 * 0.7 - 40 * 0.18
        assert!((leaf.usable_daily_kwh - 20.8).abs() < 1e-9);

        let unknown = estimate(&V2xInput {
            ev_model: Some("Trabant".to_owned()),
            ..V2xInput::default()
        });
        assert_eq!(unknown, estimate(&V2xInput::default()));
    }

    #[test]
    fn test_v2h_limited_by_evening_demand() {
        let result = estimate(&V2xInput::default());
        let v2h = result.scenarios.iter().find(|s| s.mode == V2xMode::V2h).unwrap();
        let v2g = result.scenarios.iter().find(|s| s.mode == V2xMode::V2g).unwrap();
        assert!(v2h.annual_discharge_kwh < v2g.annual_discharge_kwh);
        assert!(v2h.annual_discharge_kwh > 0.0);
    }

    #[test]
    fn test_selected_matches_mode() {
        let input = V2xInput {
            mode: V2xMode::V2g,
            ..V2xInput::default()
        };
        let result = estimate(&input);
        let v2g = result.scenarios.iter().find(|s| s.mode == V2xMode::V2g).unwrap();
        assert_eq!(result.selected, V2xMode::V2g);
        assert!((result.annual_savings - v2g.annual_savings).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_reserve_leaves_only_smart_charging() {
        let input = V2xInput {
            reserve_soc_pct: 100.0,
            ..V2xInput::default()
        };
        let result = estimate(&input);
        let smart = &result.scenarios[0];
        assert!(result.usable_daily_kwh.abs() < f64::EPSILON);
        assert!(result.equivalent_cycles_per_year.abs() < f64::EPSILON);
        for scenario in &result.scenarios {
            assert!((scenario.annual_savings - smart.annual_savings).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_never_home_means_sentinel_payback() {
        let input = V2xInput {
            days_home_per_week: 0.0,
            ..V2xInput::default()
        };
        let result = estimate(&input);
        assert!(result.annual_savings.abs() < f64::EPSILON);
        assert!((result.payback_years - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_solar_increases_v2h_savings() {
        let without = estimate(&V2xInput::default());
        let with = estimate(&V2xInput {
            has_solar: true,
            solar_size_kwp: 10.0,
            ..V2xInput::default()
        });
        assert!(with.annual_savings > without.annual_savings);
    }
}
