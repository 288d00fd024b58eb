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

//! EV charging cost comparison across charging patterns.

use serde::{Deserialize, Serialize};
use wattlens_types::{Country, Currency, PriceZone};

use crate::rounding::{round_two_decimals, round_whole};
use crate::tables::{
    EV_CHARGING_EFFICIENCY, EXPORT_PRICE_FACTOR, PETROL_LITRES_PER_100KM, country_profile,
    find_ev_preset, zone_profile,
};

/// Consumption assumed when a preset name is not recognised
const FALLBACK_KWH_PER_100KM: f64 = 17.0;

/// Share of annual solar production that can realistically end up in the car
const MAX_SOLAR_SHARE_OF_PRODUCTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Vehicle {
    Preset { name: String },
    Custom { kwh_per_100km: f64 },
}

impl Vehicle {
    pub fn kwh_per_100km(&self) -> f64 {
        match self {
            Self::Preset { name } => {
                find_ev_preset(name).map_or(FALLBACK_KWH_PER_100KM, |p| p.kwh_per_100km)
            }
            Self::Custom { kwh_per_100km } => kwh_per_100km.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargingPattern {
    /// Plug in and charge on arrival, mostly during the evening peak
    Immediate,
    /// Fixed night-time timer
    Scheduled,
    /// Follows spot prices and solar surplus
    Smart,
}

impl ChargingPattern {
    pub const ALL: [ChargingPattern; 3] = [Self::Immediate, Self::Scheduled, Self::Smart];

    /// Average paid spot price relative to the zone average
    fn spot_factor(self) -> f64 {
        match self {
            Self::Immediate => 1.25,
            Self::Scheduled => 0.80,
            Self::Smart => 0.65,
        }
    }

    /// Share of home charging that can come from own solar
    fn solar_share(self) -> f64 {
        match self {
            Self::Immediate => 0.10,
            Self::Scheduled => 0.0,
            Self::Smart => 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvChargingInput {
    pub country: Country,
    pub zone: PriceZone,
    pub currency: Currency,
    pub vehicle: Vehicle,
    pub annual_km: f64,
    pub charging_pattern: ChargingPattern,
    /// 0-100
    pub home_charging_share_pct: f64,
    pub has_solar: bool,
    pub solar_size_kwp: f64,
}

impl Default for EvChargingInput {
    fn default() -> Self {
        Self {
            country: Country::Sweden,
            zone: PriceZone::Se3,
            currency: Currency::Sek,
            vehicle: Vehicle::Preset {
                name: "Tesla Model Y".to_owned(),
            },
            annual_km: 15_000.0,
            charging_pattern: ChargingPattern::Smart,
            home_charging_share_pct: 80.0,
            has_solar: false,
            solar_size_kwp: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCost {
    pub pattern: ChargingPattern,
    pub solar_kwh: f64,
    pub annual_cost: f64,
    pub cost_per_100km: f64,
    pub savings_vs_immediate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvChargingResult {
    pub currency: Currency,
    pub annual_energy_kwh: f64,
    pub home_energy_kwh: f64,
    pub public_energy_kwh: f64,
    pub selected: ChargingPattern,
    pub patterns: Vec<PatternCost>,
    pub selected_annual_cost: f64,
    pub petrol_equivalent_cost: f64,
    pub savings_vs_petrol: f64,
}

#[must_use]
pub fn estimate(input: &EvChargingInput) -> EvChargingResult {
    let zone = zone_profile(input.country.resolve_zone(input.zone));
    let country = country_profile(input.country);
    let currency = input.currency;

    let km = input.annual_km.max(0.0);
    let annual_kwh = km / 100.0 * input.vehicle.kwh_per_100km() / EV_CHARGING_EFFICIENCY;
    let home_share = input.home_charging_share_pct.clamp(0.0, 100.0) / 100.0;
    let home_kwh = annual_kwh * home_share;
    let public_kwh = annual_kwh - home_kwh;

    let solar_production = if input.has_solar {
        input.solar_size_kwp.max(0.0) * zone.solar_yield_kwh_per_kwp
    } else {
        0.0
    };

    let costs: Vec<(ChargingPattern, f64, f64)> = ChargingPattern::ALL
        .iter()
        .map(|&pattern| {
            let solar_kwh = (home_kwh * pattern.solar_share())
                .min(solar_production * MAX_SOLAR_SHARE_OF_PRODUCTION);
            let grid_kwh = home_kwh - solar_kwh;
            let grid_price_eur = zone.avg_spot_eur * pattern.spot_factor() + country.grid_fee_eur;
            let cost_eur = grid_kwh * grid_price_eur
                // Solar used by the car is export revenue forgone
                + solar_kwh * zone.avg_spot_eur * EXPORT_PRICE_FACTOR
                + public_kwh * country.public_charging_eur;
            (pattern, solar_kwh, round_whole(currency.from_eur(cost_eur)))
        })
        .collect();

    let immediate_cost = costs
        .iter()
        .find(|(p, _, _)| *p == ChargingPattern::Immediate)
        .map_or(0.0, |(_, _, cost)| *cost);

    let per_100km = |cost: f64| {
        if km > 0.0 {
            round_two_decimals(cost / km * 100.0)
        } else {
            0.0
        }
    };

    let patterns: Vec<PatternCost> = costs
        .iter()
        .map(|&(pattern, solar_kwh, annual_cost)| PatternCost {
            pattern,
            solar_kwh: round_whole(solar_kwh),
            annual_cost,
            cost_per_100km: per_100km(annual_cost),
            savings_vs_immediate: round_whole(immediate_cost - annual_cost),
        })
        .collect();

    let selected_annual_cost = patterns
        .iter()
        .find(|p| p.pattern == input.charging_pattern)
        .map_or(0.0, |p| p.annual_cost);

    let petrol_eur = km / 100.0 * PETROL_LITRES_PER_100KM * country.petrol_per_litre_eur;
    let petrol_equivalent_cost = round_whole(currency.from_eur(petrol_eur));

    EvChargingResult {
        currency,
        annual_energy_kwh: round_whole(annual_kwh),
        home_energy_kwh: round_whole(home_kwh),
        public_energy_kwh: round_whole(public_kwh),
        selected: input.charging_pattern,
        patterns,
        selected_annual_cost,
        petrol_equivalent_cost,
        savings_vs_petrol: round_whole(petrol_equivalent_cost - selected_annual_cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost_of(result: &EvChargingResult, pattern: ChargingPattern) -> f64 {
        result
            .patterns
            .iter()
            .find(|p| p.pattern == pattern)
            .unwrap()
            .annual_cost
    }

    #[test]
    fn test_smart_charging_is_cheapest() {
        let result = estimate(&EvChargingInput::default());
        let immediate = cost_of(&result, ChargingPattern::Immediate);
        let scheduled = cost_of(&result, ChargingPattern::Scheduled);
        let smart = cost_of(&result, ChargingPattern::Smart);

        assert!(smart < scheduled);
        assert!(scheduled < immediate);
        assert!((result.selected_annual_cost - smart).abs() < f64::EPSILON);
    }

    #[test]
    fn test_annual_energy_includes_charging_losses() {
        let result = estimate(&EvChargingInput::default());
        // 15000 km * 16.9 kWh/100km / 0.9
        assert!((result.annual_energy_kwh - 2817.0).abs() < f64::EPSILON);
        assert!(
            (result.home_energy_kwh + result.public_energy_kwh - result.annual_energy_kwh).abs()
                <= 1.0
        );
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let vehicle = Vehicle::Preset {
            name: "Prototype X".to_owned(),
        };
        assert!((vehicle.kwh_per_100km() - FALLBACK_KWH_PER_100KM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_solar_lowers_smart_cost() {
        let without = estimate(&EvChargingInput::default());
        let with = estimate(&EvChargingInput {
            has_solar: true,
            solar_size_kwp: 8.0,
            ..EvChargingInput::default()
        });
        assert!(
            cost_of(&with, ChargingPattern::Smart) < cost_of(&without, ChargingPattern::Smart)
        );
        // Scheduled charging happens at night and gets nothing from solar
        assert!(
            (cost_of(&with, ChargingPattern::Scheduled)
                - cost_of(&without, ChargingPattern::Scheduled))
            .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_zero_distance_is_all_zero() {
        let result = estimate(&EvChargingInput {
            annual_km: 0.0,
            ..EvChargingInput::default()
        });
        assert!(result.annual_energy_kwh.abs() < f64::EPSILON);
        assert!(result.selected_annual_cost.abs() < f64::EPSILON);
        assert!(result.patterns.iter().all(|p| p.cost_per_100km.abs() < f64::EPSILON));
    }

    #[test]
    fn test_ev_beats_petrol_in_sweden() {
        let result = estimate(&EvChargingInput::default());
        assert!(result.savings_vs_petrol > 0.0);
    }
}
