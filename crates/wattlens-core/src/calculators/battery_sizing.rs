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

//! Home battery sizing.
//!
//! Recommends a capacity for the household's primary goal and compares a fixed set of
//! candidate sizes. Sizes are always multiples of 0.5 kWh.

use serde::{Deserialize, Serialize};
use wattlens_types::{Country, Currency, PriceZone};

use crate::rounding::{payback_years, round_one_decimal, round_to_half, round_whole};
use crate::tables::{
    ARBITRAGE_DAYS_PER_YEAR, BATTERY_ROUND_TRIP_EFFICIENCY, EXPORT_PRICE_FACTOR,
    SOLAR_STORAGE_CYCLES_PER_YEAR, country_profile, zone_profile,
};

pub const CANDIDATE_SIZES_KWH: [f64; 5] = [5.0, 10.0, 15.0, 20.0, 30.0];

/// Additional household demand from charging an EV at home
const EV_ANNUAL_KWH: f64 = 3000.0;

/// Share of solar production consumed as it is generated
const DIRECT_USE: f64 = 0.30;

/// Share of daily demand falling outside solar hours
const OFF_SOLAR_DEMAND_SHARE: f64 = 0.6;

/// Hours the household should ride through on battery alone
const BACKUP_TARGET_HOURS: f64 = 12.0;

/// Usable share of nominal capacity
const USABLE_DEPTH_OF_DISCHARGE: f64 = 0.9;

const MIN_VIABLE_KWH: f64 = 2.5;
const MAX_PRACTICAL_KWH: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryGoal {
    SelfConsumption,
    Arbitrage,
    Backup,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySizingInput {
    pub country: Country,
    pub zone: PriceZone,
    pub currency: Currency,
    pub annual_consumption_kwh: f64,
    pub has_solar: bool,
    pub solar_size_kwp: f64,
    pub primary_goal: PrimaryGoal,
    pub has_ev: bool,
}

impl Default for BatterySizingInput {
    fn default() -> Self {
        Self {
            country: Country::Sweden,
            zone: PriceZone::Se3,
            currency: Currency::Sek,
            annual_consumption_kwh: 15_000.0,
            has_solar: true,
            solar_size_kwp: 10.0,
            primary_goal: PrimaryGoal::SelfConsumption,
            has_ev: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeComparison {
    pub size_kwh: f64,
    pub annual_savings: f64,
    pub investment: f64,
    pub payback_years: f64,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySizingResult {
    pub currency: Currency,
    pub daily_consumption_kwh: f64,
    pub min_viable_kwh: f64,
    pub recommended_size_kwh: f64,
    pub max_practical_kwh: f64,
    pub annual_savings: f64,
    pub investment: f64,
    pub payback_years: f64,
    pub backup_hours: f64,
    pub comparison: Vec<SizeComparison>,
}

/// Derived household figures reused for every candidate size
#[derive(Debug, Clone, Copy)]
struct Household {
    daily_consumption_kwh: f64,
    /// Solar surplus that can be shifted into the evening on a typical cycle day
    storable_solar_kwh: f64,
}

impl Household {
    fn from_input(input: &BatterySizingInput) -> Self {
        let ev = if input.has_ev { EV_ANNUAL_KWH } else { 0.0 };
        let daily_consumption_kwh = (input.annual_consumption_kwh.max(0.0) + ev) / 365.0;

        let storable_solar_kwh = if input.has_solar {
            let zone = zone_profile(input.country.resolve_zone(input.zone));
            let production = input.solar_size_kwp.max(0.0) * zone.solar_yield_kwh_per_kwp;
            let surplus_per_cycle = production * (1.0 - DIRECT_USE) / SOLAR_STORAGE_CYCLES_PER_YEAR;
            surplus_per_cycle.min(daily_consumption_kwh * OFF_SOLAR_DEMAND_SHARE)
        } else {
            0.0
        };

        Self {
            daily_consumption_kwh,
            storable_solar_kwh,
        }
    }
}

#[must_use]
pub fn estimate(input: &BatterySizingInput) -> BatterySizingResult {
    let household = Household::from_input(input);
    let daily = household.daily_consumption_kwh;

    let min_viable = round_to_half((daily * 0.1).max(MIN_VIABLE_KWH));
    let max_practical = round_to_half((daily * 0.8).min(MAX_PRACTICAL_KWH)).max(min_viable);

    let target = match input.primary_goal {
        PrimaryGoal::SelfConsumption if input.has_solar => household.storable_solar_kwh * 0.5,
        PrimaryGoal::SelfConsumption => daily * 0.3,
        PrimaryGoal::Arbitrage => daily * 0.5,
        PrimaryGoal::Backup => daily / 24.0 * BACKUP_TARGET_HOURS / USABLE_DEPTH_OF_DISCHARGE,
        PrimaryGoal::All => (household.storable_solar_kwh * 0.5).max(daily * 0.5),
    };
    let recommended = round_to_half(target.clamp(min_viable, max_practical));

    let annual_savings = annual_savings_for_size(input, &household, recommended);
    let investment = battery_investment(input, recommended);

    let backup_hours = if daily > 0.0 {
        round_one_decimal(recommended * USABLE_DEPTH_OF_DISCHARGE / (daily / 24.0))
    } else {
        0.0
    };

    let closest = CANDIDATE_SIZES_KWH
        .iter()
        .copied()
        .min_by(|a, b| (a - recommended).abs().total_cmp(&(b - recommended).abs()))
        .unwrap_or(CANDIDATE_SIZES_KWH[0]);

    let comparison = CANDIDATE_SIZES_KWH
        .iter()
        .map(|&size| {
            let savings = annual_savings_for_size(input, &household, size);
            let cost = battery_investment(input, size);
            SizeComparison {
                size_kwh: size,
                annual_savings: savings,
                investment: cost,
                payback_years: payback_years(cost, savings),
                is_recommended: (size - closest).abs() < f64::EPSILON,
            }
        })
        .collect();

    BatterySizingResult {
        currency: input.currency,
        daily_consumption_kwh: round_one_decimal(daily),
        min_viable_kwh: min_viable,
        recommended_size_kwh: recommended,
        max_practical_kwh: max_practical,
        annual_savings,
        investment,
        payback_years: payback_years(investment, annual_savings),
        backup_hours,
        comparison,
    }
}

fn battery_investment(input: &BatterySizingInput, size_kwh: f64) -> f64 {
    let cost_eur = size_kwh.max(0.0) * country_profile(input.country).battery_cost_per_kwh_eur;
    round_whole(input.currency.from_eur(cost_eur))
}

/// Annual savings for one battery size, rounded to whole currency units
fn annual_savings_for_size(
    input: &BatterySizingInput,
    household: &Household,
    size_kwh: f64,
) -> f64 {
    let zone = zone_profile(input.country.resolve_zone(input.zone));
    let country = country_profile(input.country);
    let size = size_kwh.max(0.0);

    // Charging from surplus forgoes export revenue, discharging avoids a retail purchase
    let retail = zone.avg_spot_eur + country.grid_fee_eur;
    let export = zone.avg_spot_eur * EXPORT_PRICE_FACTOR;
    let value_per_stored_kwh = (BATTERY_ROUND_TRIP_EFFICIENCY * retail - export).max(0.0);

    let solar_part = size.min(household.storable_solar_kwh);
    let self_consumption_eur = solar_part * SOLAR_STORAGE_CYCLES_PER_YEAR * value_per_stored_kwh;

    let arbitrage_eur = |capacity: f64| {
        capacity.min(household.daily_consumption_kwh)
            * BATTERY_ROUND_TRIP_EFFICIENCY
            * zone.daily_spread_eur
            * ARBITRAGE_DAYS_PER_YEAR
    };

    let savings_eur = match input.primary_goal {
        PrimaryGoal::SelfConsumption if input.has_solar => self_consumption_eur,
        PrimaryGoal::SelfConsumption => arbitrage_eur(size),
        PrimaryGoal::Arbitrage => arbitrage_eur(size),
        // Half the capacity stays reserved for outages
        PrimaryGoal::Backup => arbitrage_eur(size * 0.5),
        PrimaryGoal::All => self_consumption_eur + arbitrage_eur(size - solar_part),
    };

    round_whole(input.currency.from_eur(savings_eur))
}
