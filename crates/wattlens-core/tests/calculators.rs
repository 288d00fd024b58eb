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

use wattlens_core::calculators::battery_sizing::{self, BatterySizingInput, PrimaryGoal};
use wattlens_core::calculators::ev_charging::{self, EvChargingInput};
use wattlens_core::calculators::negative_prices::{self, NegativePricesInput};
use wattlens_core::calculators::solar_roi::{self, SolarRoiInput, SolarScenarioKind};
use wattlens_core::calculators::v2x_savings::{self, V2xInput};
use wattlens_core::rounding::PAYBACK_SENTINEL_YEARS;
use wattlens_types::{Country, Currency, PriceZone};

fn is_half_kwh_multiple(value: f64) -> bool {
    ((value * 2.0).round() - value * 2.0).abs() < 1e-9
}

#[test]
fn test_every_calculator_is_deterministic() {
    let solar = SolarRoiInput::default();
    assert_eq!(solar_roi::estimate(&solar), solar_roi::estimate(&solar));

    let battery = BatterySizingInput::default();
    assert_eq!(battery_sizing::estimate(&battery), battery_sizing::estimate(&battery));

    let ev = EvChargingInput::default();
    assert_eq!(ev_charging::estimate(&ev), ev_charging::estimate(&ev));

    let v2x = V2xInput::default();
    assert_eq!(v2x_savings::estimate(&v2x), v2x_savings::estimate(&v2x));

    let negative = NegativePricesInput::default();
    assert_eq!(negative_prices::estimate(&negative), negative_prices::estimate(&negative));
}

#[test]
fn test_battery_sizing_sweden_scenario() {
    let input = BatterySizingInput {
        country: Country::Sweden,
        zone: PriceZone::Se3,
        currency: Currency::Sek,
        annual_consumption_kwh: 15_000.0,
        has_solar: true,
        solar_size_kwp: 10.0,
        primary_goal: PrimaryGoal::SelfConsumption,
        has_ev: false,
    };
    let result = battery_sizing::estimate(&input);

    assert!(result.recommended_size_kwh > 0.0);
    assert!(is_half_kwh_multiple(result.recommended_size_kwh));
    assert!(is_half_kwh_multiple(result.min_viable_kwh));
    assert!(is_half_kwh_multiple(result.max_practical_kwh));
    assert!(result.min_viable_kwh <= result.recommended_size_kwh);
    assert!(result.recommended_size_kwh <= result.max_practical_kwh);
    assert!(result.annual_savings >= 0.0);
    assert_eq!(result.comparison.len(), 5);
}

#[test]
fn test_battery_savings_never_drop_with_size() {
    for goal in [PrimaryGoal::SelfConsumption, PrimaryGoal::All] {
        let result = battery_sizing::estimate(&BatterySizingInput {
            primary_goal: goal,
            ..BatterySizingInput::default()
        });
        for pair in result.comparison.windows(2) {
            assert!(
                pair[1].annual_savings >= pair[0].annual_savings,
                "{goal:?}: {} kWh saves less than {} kWh",
                pair[1].size_kwh,
                pair[0].size_kwh
            );
        }
    }
}

#[test]
fn test_zero_sized_inputs_use_payback_sentinel() {
    let solar = solar_roi::estimate(&SolarRoiInput {
        system_size_kwp: 0.0,
        optimization: false,
        storage: false,
        ..SolarRoiInput::default()
    });
    let base = solar.selected_scenario().unwrap();
    assert_eq!(base.kind, SolarScenarioKind::Base);
    assert!((base.payback_years - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);
    assert!(solar.annual_production_kwh.abs() < f64::EPSILON);

    let v2x = v2x_savings::estimate(&V2xInput {
        days_home_per_week: 0.0,
        ..V2xInput::default()
    });
    assert!((v2x.payback_years - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);

    let battery = battery_sizing::estimate(&BatterySizingInput {
        annual_consumption_kwh: 0.0,
        has_solar: false,
        solar_size_kwp: 0.0,
        ..BatterySizingInput::default()
    });
    assert!(battery.payback_years.is_finite());
    assert!(battery.payback_years >= 0.0);
}

#[test]
fn test_results_contain_no_non_finite_numbers() {
    let result = ev_charging::estimate(&EvChargingInput {
        annual_km: 0.0,
        home_charging_share_pct: 0.0,
        ..EvChargingInput::default()
    });
    let json = serde_json::to_value(&result).unwrap();
    assert!(!json.to_string().contains("null"));
}
