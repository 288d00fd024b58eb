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

//! Static lookup tables shared by the calculators.
//!
//! Monetary values are stored in EUR and converted with [`Currency::from_eur`] at the edge.

use serde::{Deserialize, Serialize};
use wattlens_types::{Country, PriceZone};

pub const BATTERY_ROUND_TRIP_EFFICIENCY: f64 = 0.90;
pub const V2X_ROUND_TRIP_EFFICIENCY: f64 = 0.85;
pub const EV_CHARGING_EFFICIENCY: f64 = 0.90;

/// Share of spot price received for exported energy
pub const EXPORT_PRICE_FACTOR: f64 = 0.9;

/// Equivalent full battery cycles available for storing solar surplus per year
pub const SOLAR_STORAGE_CYCLES_PER_YEAR: f64 = 250.0;

/// Days per year a home battery realistically performs an arbitrage cycle
pub const ARBITRAGE_DAYS_PER_YEAR: f64 = 300.0;

pub const SYSTEM_LIFETIME_YEARS: f64 = 25.0;

/// Per-zone market data
#[derive(Debug, Clone, Copy)]
pub struct ZoneProfile {
    /// Specific yield of an optimally mounted PV array (kWh/kWp/year)
    pub solar_yield_kwh_per_kwp: f64,
    /// Average day-ahead price (EUR/kWh)
    pub avg_spot_eur: f64,
    /// Average spread between the cheapest and dearest hours of a day (EUR/kWh)
    pub daily_spread_eur: f64,
    /// Expected hours per year with a negative day-ahead price
    pub negative_hours_per_year: f64,
    /// Average price during negative hours (EUR/kWh, negative)
    pub avg_negative_price_eur: f64,
}

pub fn zone_profile(zone: PriceZone) -> ZoneProfile {
    let (yield_, spot, spread, neg_hours, neg_price) = match zone {
        PriceZone::Se1 => (800.0, 0.035, 0.030, 220.0, -0.004),
        PriceZone::Se2 => (850.0, 0.038, 0.035, 230.0, -0.004),
        PriceZone::Se3 => (950.0, 0.065, 0.090, 300.0, -0.006),
        PriceZone::Se4 => (1000.0, 0.085, 0.120, 320.0, -0.008),
        PriceZone::No1 => (900.0, 0.070, 0.070, 120.0, -0.005),
        PriceZone::No2 => (850.0, 0.068, 0.065, 100.0, -0.005),
        PriceZone::No3 => (750.0, 0.032, 0.025, 60.0, -0.003),
        PriceZone::No4 => (700.0, 0.025, 0.020, 50.0, -0.003),
        PriceZone::No5 => (800.0, 0.066, 0.060, 90.0, -0.005),
        PriceZone::Fi => (850.0, 0.055, 0.100, 400.0, -0.007),
        PriceZone::Dk1 => (1000.0, 0.080, 0.110, 350.0, -0.012),
        PriceZone::Dk2 => (1000.0, 0.085, 0.115, 330.0, -0.011),
        PriceZone::De => (1050.0, 0.090, 0.130, 450.0, -0.015),
    };

    ZoneProfile {
        solar_yield_kwh_per_kwp: yield_,
        avg_spot_eur: spot,
        daily_spread_eur: spread,
        negative_hours_per_year: neg_hours,
        avg_negative_price_eur: neg_price,
    }
}

/// Per-country tariffs and installation costs (EUR)
#[derive(Debug, Clone, Copy)]
pub struct CountryProfile {
    /// Grid transfer fee plus energy tax paid on every imported kWh
    pub grid_fee_eur: f64,
    pub pv_cost_per_kwp_eur: f64,
    pub battery_cost_per_kwh_eur: f64,
    pub bidirectional_charger_eur: f64,
    pub smart_controller_eur: f64,
    pub public_charging_eur: f64,
    pub petrol_per_litre_eur: f64,
}

pub fn country_profile(country: Country) -> CountryProfile {
    match country {
        Country::Sweden => CountryProfile {
            grid_fee_eur: 0.075,
            pv_cost_per_kwp_eur: 1400.0,
            battery_cost_per_kwh_eur: 550.0,
            bidirectional_charger_eur: 5500.0,
            smart_controller_eur: 450.0,
            public_charging_eur: 0.55,
            petrol_per_litre_eur: 1.70,
        },
        Country::Norway => CountryProfile {
            grid_fee_eur: 0.060,
            pv_cost_per_kwp_eur: 1500.0,
            battery_cost_per_kwh_eur: 600.0,
            bidirectional_charger_eur: 5800.0,
            smart_controller_eur: 480.0,
            public_charging_eur: 0.50,
            petrol_per_litre_eur: 2.00,
        },
        Country::Finland => CountryProfile {
            grid_fee_eur: 0.065,
            pv_cost_per_kwp_eur: 1300.0,
            battery_cost_per_kwh_eur: 520.0,
            bidirectional_charger_eur: 5200.0,
            smart_controller_eur: 420.0,
            public_charging_eur: 0.45,
            petrol_per_litre_eur: 1.85,
        },
        Country::Denmark => CountryProfile {
            grid_fee_eur: 0.140,
            pv_cost_per_kwp_eur: 1250.0,
            battery_cost_per_kwh_eur: 530.0,
            bidirectional_charger_eur: 5300.0,
            smart_controller_eur: 430.0,
            public_charging_eur: 0.60,
            petrol_per_litre_eur: 1.90,
        },
        Country::Germany => CountryProfile {
            grid_fee_eur: 0.180,
            pv_cost_per_kwp_eur: 1350.0,
            battery_cost_per_kwh_eur: 500.0,
            bidirectional_charger_eur: 5000.0,
            smart_controller_eur: 400.0,
            public_charging_eur: 0.59,
            petrol_per_litre_eur: 1.75,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    South,
    SouthEast,
    SouthWest,
    EastWest,
    North,
}

impl Orientation {
    pub fn derate(self) -> f64 {
        match self {
            Self::South => 1.0,
            Self::SouthEast | Self::SouthWest => 0.95,
            Self::EastWest => 0.85,
            Self::North => 0.60,
        }
    }
}

/// Tilt derate relative to the optimum of roughly 30-45 degrees at Nordic latitudes
pub fn tilt_derate(tilt_degrees: f64) -> f64 {
    match tilt_degrees {
        t if t < 10.0 => 0.87,
        t if t < 20.0 => 0.93,
        t if t <= 45.0 => 1.0,
        t if t <= 60.0 => 0.95,
        _ => 0.85,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shading {
    None,
    Light,
    Moderate,
    Heavy,
}

impl Shading {
    pub fn derate(self) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Light => 0.90,
            Self::Moderate => 0.75,
            Self::Heavy => 0.55,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvPreset {
    pub name: &'static str,
    pub kwh_per_100km: f64,
    pub battery_kwh: f64,
}

pub const EV_PRESETS: [EvPreset; 8] = [
    EvPreset {
        name: "Tesla Model Y",
        kwh_per_100km: 16.9,
        battery_kwh: 75.0,
    },
    EvPreset {
        name: "Tesla Model 3",
        kwh_per_100km: 14.9,
        battery_kwh: 60.0,
    },
    EvPreset {
        name: "Volkswagen ID.4",
        kwh_per_100km: 18.0,
        battery_kwh: 77.0,
    },
    EvPreset {
        name: "Volvo EX30",
        kwh_per_100km: 17.0,
        battery_kwh: 64.0,
    },
    EvPreset {
        name: "Kia EV6",
        kwh_per_100km: 17.5,
        battery_kwh: 77.4,
    },
    EvPreset {
        name: "Hyundai Ioniq 5",
        kwh_per_100km: 17.9,
        battery_kwh: 77.4,
    },
    EvPreset {
        name: "Nissan Leaf",
        kwh_per_100km: 17.1,
        battery_kwh: 40.0,
    },
    EvPreset {
        name: "Polestar 2",
        kwh_per_100km: 18.4,
        battery_kwh: 78.0,
    },
];

pub fn find_ev_preset(name: &str) -> Option<&'static EvPreset> {
    EV_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// Petrol consumption of a comparable combustion car (l/100 km)
pub const PETROL_LITRES_PER_100KM: f64 = 6.5;

/// Share of daily solar production per hour of day (sums to 1.0)
pub const SOLAR_HOURLY_CURVE: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.005, 0.015, 0.035, 0.060, 0.085, 0.105, 0.120, 0.125, 0.120,
    0.105, 0.085, 0.065, 0.040, 0.020, 0.010, 0.005, 0.0, 0.0, 0.0,
];

/// Share of annual solar production per calendar month (sums to 1.0)
pub const SOLAR_MONTHLY_SHARE: [f64; 12] = [
    0.015, 0.035, 0.075, 0.110, 0.145, 0.150, 0.150, 0.125, 0.090, 0.055, 0.030, 0.020,
];

/// Share of a year's negative-price hours falling in each calendar month (sums to 1.0)
pub const NEGATIVE_HOURS_MONTHLY_SHARE: [f64; 12] = [
    0.03, 0.04, 0.07, 0.12, 0.16, 0.15, 0.13, 0.11, 0.08, 0.05, 0.03, 0.03,
];
