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

//! Countries, bidding zones and display currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Sweden,
    Norway,
    Finland,
    Denmark,
    Germany,
}

impl Country {
    pub const ALL: [Country; 5] = [
        Country::Sweden,
        Country::Norway,
        Country::Finland,
        Country::Denmark,
        Country::Germany,
    ];

    pub fn default_currency(self) -> Currency {
        match self {
            Self::Sweden => Currency::Sek,
            Self::Norway => Currency::Nok,
            Self::Denmark => Currency::Dkk,
            Self::Finland | Self::Germany => Currency::Eur,
        }
    }

    pub fn zones(self) -> &'static [PriceZone] {
        match self {
            Self::Sweden => &[PriceZone::Se1, PriceZone::Se2, PriceZone::Se3, PriceZone::Se4],
            Self::Norway => &[
                PriceZone::No1,
                PriceZone::No2,
                PriceZone::No3,
                PriceZone::No4,
                PriceZone::No5,
            ],
            Self::Finland => &[PriceZone::Fi],
            Self::Denmark => &[PriceZone::Dk1, PriceZone::Dk2],
            Self::Germany => &[PriceZone::De],
        }
    }

    /// Zone used when the caller only knows the country
    pub fn default_zone(self) -> PriceZone {
        match self {
            Self::Sweden => PriceZone::Se3,
            Self::Norway => PriceZone::No1,
            Self::Finland => PriceZone::Fi,
            Self::Denmark => PriceZone::Dk1,
            Self::Germany => PriceZone::De,
        }
    }

    /// `zone` when it lies in this country, otherwise the country's default zone
    pub fn resolve_zone(self, zone: PriceZone) -> PriceZone {
        if zone.country() == self {
            zone
        } else {
            self.default_zone()
        }
    }
}

impl FromStr for Country {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "se" | "sweden" => Ok(Self::Sweden),
            "no" | "norway" => Ok(Self::Norway),
            "fi" | "finland" => Ok(Self::Finland),
            "dk" | "denmark" => Ok(Self::Denmark),
            "de" | "germany" => Ok(Self::Germany),
            other => Err(UnknownCode {
                kind: "country",
                code: other.to_owned(),
            }),
        }
    }
}

/// Day-ahead bidding zone as understood by the price API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceZone {
    Se1,
    Se2,
    Se3,
    Se4,
    No1,
    No2,
    No3,
    No4,
    No5,
    Fi,
    Dk1,
    Dk2,
    /// DE-LU bidding zone
    De,
}

impl PriceZone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Se1 => "SE1",
            Self::Se2 => "SE2",
            Self::Se3 => "SE3",
            Self::Se4 => "SE4",
            Self::No1 => "NO1",
            Self::No2 => "NO2",
            Self::No3 => "NO3",
            Self::No4 => "NO4",
            Self::No5 => "NO5",
            Self::Fi => "FI",
            Self::Dk1 => "DK1",
            Self::Dk2 => "DK2",
            Self::De => "DE",
        }
    }

    pub fn country(self) -> Country {
        match self {
            Self::Se1 | Self::Se2 | Self::Se3 | Self::Se4 => Country::Sweden,
            Self::No1 | Self::No2 | Self::No3 | Self::No4 | Self::No5 => Country::Norway,
            Self::Fi => Country::Finland,
            Self::Dk1 | Self::Dk2 => Country::Denmark,
            Self::De => Country::Germany,
        }
    }
}

impl fmt::Display for PriceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceZone {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        match code.as_str() {
            "SE1" => Ok(Self::Se1),
            "SE2" => Ok(Self::Se2),
            "SE3" => Ok(Self::Se3),
            "SE4" => Ok(Self::Se4),
            "NO1" => Ok(Self::No1),
            "NO2" => Ok(Self::No2),
            "NO3" => Ok(Self::No3),
            "NO4" => Ok(Self::No4),
            "NO5" => Ok(Self::No5),
            "FI" => Ok(Self::Fi),
            "DK1" => Ok(Self::Dk1),
            "DK2" => Ok(Self::Dk2),
            "DE" | "DE-LU" | "DE_LU" => Ok(Self::De),
            _ => Err(UnknownCode {
                kind: "price zone",
                code,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Sek,
    Nok,
    Dkk,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Sek => "SEK",
            Self::Nok => "NOK",
            Self::Dkk => "DKK",
        }
    }

    /// Static conversion rate: units of this currency per 1 EUR
    pub fn per_eur(self) -> f64 {
        match self {
            Self::Eur => 1.0,
            Self::Sek => 11.5,
            Self::Nok => 11.7,
            Self::Dkk => 7.46,
        }
    }

    pub fn from_eur(self, amount_eur: f64) -> f64 {
        amount_eur * self.per_eur()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::Eur),
            "SEK" => Ok(Self::Sek),
            "NOK" => Ok(Self::Nok),
            "DKK" => Ok(Self::Dkk),
            other => Err(UnknownCode {
                kind: "currency",
                code: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_codes_roundtrip_through_from_str() {
        for country in Country::ALL {
            for zone in country.zones() {
                assert_eq!(zone.as_str().parse::<PriceZone>().unwrap(), *zone);
                assert_eq!(zone.country(), country);
            }
        }
    }

    #[test]
    fn test_zone_parsing_is_case_insensitive() {
        assert_eq!("se3".parse::<PriceZone>().unwrap(), PriceZone::Se3);
        assert_eq!("de-lu".parse::<PriceZone>().unwrap(), PriceZone::De);
        assert!("XX9".parse::<PriceZone>().is_err());
    }

    #[test]
    fn test_default_zone_belongs_to_country() {
        for country in Country::ALL {
            assert!(country.zones().contains(&country.default_zone()));
        }
    }

    #[test]
    fn test_resolve_zone_falls_back_to_default() {
        assert_eq!(Country::Sweden.resolve_zone(PriceZone::Se4), PriceZone::Se4);
        assert_eq!(Country::Germany.resolve_zone(PriceZone::Se3), PriceZone::De);
        assert_eq!(Country::Norway.resolve_zone(PriceZone::Dk1), PriceZone::No1);
    }

    #[test]
    fn test_currency_conversion() {
        assert!((Currency::Eur.from_eur(2.0) - 2.0).abs() < f64::EPSILON);
        assert!((Currency::Sek.from_eur(1.0) - 11.5).abs() < 1e-9);
        assert_eq!(Country::Sweden.default_currency(), Currency::Sek);
        assert_eq!(Country::Germany.default_currency(), Currency::Eur);
    }

    #[test]
    fn test_serde_codes() {
        assert_eq!(serde_json::to_string(&PriceZone::Se3).unwrap(), "\"SE3\"");
        assert_eq!(serde_json::to_string(&Currency::Nok).unwrap(), "\"NOK\"");
        assert_eq!(serde_json::to_string(&Country::Denmark).unwrap(), "\"denmark\"");
    }
}
