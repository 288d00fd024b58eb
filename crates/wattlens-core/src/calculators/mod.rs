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

//! Estimation Engine.
//!
//! Every calculator is a pure function of its input and the static tables in
//! [`crate::tables`]. Results are rounded before they are returned so identical inputs
//! always produce identical results.

pub mod battery_sizing;
pub mod ev_charging;
pub mod negative_prices;
pub mod solar_roi;
pub mod v2x_savings;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calculator {
    SolarRoi,
    BatterySizing,
    EvCharging,
    V2xSavings,
    NegativePrices,
}

impl Calculator {
    pub const ALL: [Calculator; 5] = [
        Calculator::SolarRoi,
        Calculator::BatterySizing,
        Calculator::EvCharging,
        Calculator::V2xSavings,
        Calculator::NegativePrices,
    ];

    /// Discriminator sent as `_source` with leads
    pub fn source(self) -> &'static str {
        match self {
            Self::SolarRoi => "solar-roi",
            Self::BatterySizing => "battery-sizing",
            Self::EvCharging => "ev-charging",
            Self::V2xSavings => "v2x-savings",
            Self::NegativePrices => "negative-prices",
        }
    }
}

impl fmt::Display for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

impl FromStr for Calculator {
    type Err = wattlens_types::UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|calc| calc.source() == wanted)
            .ok_or(wattlens_types::UnknownCode {
                kind: "calculator",
                code: wanted,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_matches_serde_name() {
        for calc in Calculator::ALL {
            let json = serde_json::to_string(&calc).unwrap();
            assert_eq!(json, format!("\"{}\"", calc.source()));
            assert_eq!(calc.source().parse::<Calculator>().unwrap(), calc);
        }
        assert!("mortgage".parse::<Calculator>().is_err());
    }
}
