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

//! Solar return-on-investment estimate.
//!
//! Four fixed scenarios are evaluated side by side: plain PV, PV with smart coordination of
//! household loads, PV with storage, and both. The caller's flags pick which one is shown as
//! the headline result.

use serde::{Deserialize, Serialize};
use wattlens_types::{Country, Currency, PriceZone};

use crate::rounding::{payback_years, percentage, round_whole};
use crate::tables::{
    BATTERY_ROUND_TRIP_EFFICIENCY, EXPORT_PRICE_FACTOR, Orientation, SOLAR_STORAGE_CYCLES_PER_YEAR,
    SYSTEM_LIFETIME_YEARS, Shading, country_profile, tilt_derate, zone_profile,
};

/// Share of production used directly by an uncoordinated household
const BASE_DIRECT_USE: f64 = 0.30;

/// Share of production used directly when loads follow the sun
const COORDINATED_DIRECT_USE: f64 = 0.45;

/// Days per year a coordinated battery also arbitrages grid prices (low-sun months)
const WINTER_ARBITRAGE_DAYS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarRoiInput {
    pub country: Country,
    pub zone: PriceZone,
    pub currency: Currency,
    pub system_size_kwp: f64,
    pub orientation: Orientation,
    pub tilt_degrees: f64,
    pub shading: Shading,
    pub annual_consumption_kwh: f64,
    pub battery_size_kwh: f64,
    /// Smart coordination of household loads
    pub optimization: bool,
    /// Home battery included
    pub storage: bool,
}

impl Default for SolarRoiInput {
    fn default() -> Self {
        Self {
            country: Country::Sweden,
            zone: PriceZone::Se3,
            currency: Currency::Sek,
            system_size_kwp: 10.0,
            orientation: Orientation::South,
            tilt_degrees: 35.0,
            shading: Shading::None,
            annual_consumption_kwh: 15_000.0,
            battery_size_kwh: 10.0,
            optimization: true,
            storage: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolarScenarioKind {
    Base,
    Coordinated,
    Storage,
    CoordinatedStorage,
}

impl SolarScenarioKind {
    pub const ALL: [SolarScenarioKind; 4] = [
        Self::Base,
        Self::Coordinated,
        Self::Storage,
        Self::CoordinatedStorage,
    ];

    pub fn select(optimization: bool, storage: bool) -> Self {
        match (optimization, storage) {
            (false, false) => Self::Base,
            (true, false) => Self::Coordinated,
            (false, true) => Self::Storage,
            (true, true) => Self::CoordinatedStorage,
        }
    }

    fn coordinated(self) -> bool {
        matches!(self, Self::Coordinated | Self::CoordinatedStorage)
    }

    fn with_storage(self) -> bool {
        matches!(self, Self::Storage | Self::CoordinatedStorage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarScenario {
    pub kind: SolarScenarioKind,
    pub self_consumed_kwh: f64,
    pub exported_kwh: f64,
    pub self_consumption_pct: f64,
    pub annual_savings: f64,
    pub investment: f64,
    pub payback_years: f64,
    /// Savings over the system lifetime minus the investment
    pub lifetime_net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarRoiResult {
    pub currency: Currency,
    pub annual_production_kwh: f64,
    pub selected: SolarScenarioKind,
    pub scenarios: Vec<SolarScenario>,
}

impl SolarRoiResult {
    pub fn selected_scenario(&self) -> Option<&SolarScenario> {
        self.scenarios.iter().find(|s| s.kind == self.selected)
    }
}

/// Expected annual production after orientation, tilt and shading losses
#[must_use]
pub fn annual_production_kwh(input: &SolarRoiInput) -> f64 {
    let profile = zone_profile(input.country.resolve_zone(input.zone));
    input.system_size_kwp.max(0.0)
        * profile.solar_yield_kwh_per_kwp
        * input.orientation.derate()
        * tilt_derate(input.tilt_degrees)
        * input.shading.derate()
}

#[must_use]
pub fn estimate(input: &SolarRoiInput) -> SolarRoiResult {
    let production = annual_production_kwh(input);

    let scenarios = SolarScenarioKind::ALL
        .iter()
        .map(|kind| evaluate_scenario(input, *kind, production))
        .collect();

    SolarRoiResult {
        currency: input.currency,
        annual_production_kwh: round_whole(production),
        selected: SolarScenarioKind::select(input.optimization, input.storage),
        scenarios,
    }
}

fn evaluate_scenario(
    input: &SolarRoiInput,
    kind: SolarScenarioKind,
    production: f64,
) -> SolarScenario {
    let zone = zone_profile(input.country.resolve_zone(input.zone));
    let country = country_profile(input.country);
    let consumption = input.annual_consumption_kwh.max(0.0);
    let battery_kwh = if kind.with_storage() {
        input.battery_size_kwh.max(0.0)
    } else {
        0.0
    };

    let direct_share = if kind.coordinated() {
        COORDINATED_DIRECT_USE
    } else {
        BASE_DIRECT_USE
    };
    let direct = (production * direct_share).min(consumption);

    // Surplus pushed through the battery, limited by capacity and by remaining demand
    let charged = (battery_kwh * SOLAR_STORAGE_CYCLES_PER_YEAR)
        .min(production - direct)
        .min((consumption - direct) / BATTERY_ROUND_TRIP_EFFICIENCY)
        .max(0.0);
    let delivered = charged * BATTERY_ROUND_TRIP_EFFICIENCY;

    let self_consumed = direct + delivered;
    let exported = (production - direct - charged).max(0.0);

    let retail_eur = zone.avg_spot_eur + country.grid_fee_eur;
    let export_eur = zone.avg_spot_eur * EXPORT_PRICE_FACTOR;

    let mut savings_eur = self_consumed * retail_eur + exported * export_eur;
    if kind == SolarScenarioKind::CoordinatedStorage {
        savings_eur += battery_kwh
            * BATTERY_ROUND_TRIP_EFFICIENCY
            * zone.daily_spread_eur
            * WINTER_ARBITRAGE_DAYS;
    }

    let mut investment_eur = input.system_size_kwp.max(0.0) * country.pv_cost_per_kwp_eur;
    if kind.with_storage() {
        investment_eur += battery_kwh * country.battery_cost_per_kwh_eur;
    }
    if kind.coordinated() {
        investment_eur += country.smart_controller_eur;
    }

    let annual_savings = round_whole(input.currency.from_eur(savings_eur));
    let investment = round_whole(input.currency.from_eur(investment_eur));

    SolarScenario {
        kind,
        self_consumed_kwh: round_whole(self_consumed),
        exported_kwh: round_whole(exported),
        self_consumption_pct: percentage(self_consumed, production),
        annual_savings,
        investment,
        payback_years: payback_years(investment, annual_savings),
        lifetime_net: round_whole(annual_savings * SYSTEM_LIFETIME_YEARS - investment),
    }
}
