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

//! Building calculator inputs from defaults, files and overrides, and running them.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use wattlens_core::Calculator;
use wattlens_core::calculators::battery_sizing::{self, BatterySizingInput, BatterySizingResult};
use wattlens_core::calculators::ev_charging::{self, EvChargingInput, EvChargingResult};
use wattlens_core::calculators::negative_prices::{self, NegativePricesInput};
use wattlens_core::calculators::solar_roi::{self, SolarRoiInput, SolarRoiResult};
use wattlens_core::calculators::v2x_savings::{self, V2xInput, V2xResult};
use wattlens_core::NegativePriceSummary;

use crate::args::CalculatorInputArgs;

/// One finished calculator run
#[derive(Debug)]
pub enum Estimate {
    SolarRoi(SolarRoiInput, SolarRoiResult),
    BatterySizing(BatterySizingInput, BatterySizingResult),
    EvCharging(EvChargingInput, EvChargingResult),
    V2xSavings(V2xInput, V2xResult),
    NegativePrices(NegativePricesInput, NegativePriceSummary),
}

impl Estimate {
    pub fn calculator(&self) -> Calculator {
        match self {
            Self::SolarRoi(..) => Calculator::SolarRoi,
            Self::BatterySizing(..) => Calculator::BatterySizing,
            Self::EvCharging(..) => Calculator::EvCharging,
            Self::V2xSavings(..) => Calculator::V2xSavings,
            Self::NegativePrices(..) => Calculator::NegativePrices,
        }
    }

    /// Input and result as JSON values
    pub fn to_json(&self) -> Result<(Value, Value)> {
        let pair = match self {
            Self::SolarRoi(input, result) => {
                (serde_json::to_value(input)?, serde_json::to_value(result)?)
            }
            Self::BatterySizing(input, result) => {
                (serde_json::to_value(input)?, serde_json::to_value(result)?)
            }
            Self::EvCharging(input, result) => {
                (serde_json::to_value(input)?, serde_json::to_value(result)?)
            }
            Self::V2xSavings(input, result) => {
                (serde_json::to_value(input)?, serde_json::to_value(result)?)
            }
            Self::NegativePrices(input, result) => {
                (serde_json::to_value(input)?, serde_json::to_value(result)?)
            }
        };
        Ok(pair)
    }
}

/// Merge `patch` into `base`, recursing into objects
fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Turn `a.b=value` into `{"a": {"b": value}}`; values that are not JSON become strings
pub fn parse_override(raw: &str) -> Result<Value> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("override '{raw}' must look like key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("override '{raw}' has an empty key");
    }

    let value = value.trim();
    let mut nested =
        serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    for part in key.rsplit('.') {
        let mut object = Map::new();
        object.insert(part.to_owned(), nested);
        nested = Value::Object(object);
    }
    Ok(nested)
}

fn read_input_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
    } else {
        toml::from_str(&text).with_context(|| format!("Invalid TOML in {}", path.display()))
    }
}

/// Defaults, then the input file, then overrides
fn build_input<I>(input_file: Option<&Path>, overrides: &[String]) -> Result<I>
where
    I: Default + Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(I::default())?;
    if let Some(path) = input_file {
        merge(&mut value, read_input_file(path)?);
    }
    for raw in overrides {
        merge(&mut value, parse_override(raw)?);
    }
    serde_json::from_value(value).context("Calculator input is invalid")
}

pub fn run(args: &CalculatorInputArgs) -> Result<Estimate> {
    let file = args.input.as_deref();
    let overrides = args.overrides.as_slice();

    let estimate = match args.calculator {
        Calculator::SolarRoi => {
            let input: SolarRoiInput = build_input(file, overrides)?;
            let result = solar_roi::estimate(&input);
            Estimate::SolarRoi(input, result)
        }
        Calculator::BatterySizing => {
            let input: BatterySizingInput = build_input(file, overrides)?;
            let result = battery_sizing::estimate(&input);
            Estimate::BatterySizing(input, result)
        }
        Calculator::EvCharging => {
            let input: EvChargingInput = build_input(file, overrides)?;
            let result = ev_charging::estimate(&input);
            Estimate::EvCharging(input, result)
        }
        Calculator::V2xSavings => {
            let input: V2xInput = build_input(file, overrides)?;
            let result = v2x_savings::estimate(&input);
            Estimate::V2xSavings(input, result)
        }
        Calculator::NegativePrices => {
            let input: NegativePricesInput = build_input(file, overrides)?;
            let result = negative_prices::estimate(&input);
            Estimate::NegativePrices(input, result)
        }
    };
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use wattlens_types::PriceZone;

    fn args(
        calculator: Calculator,
        input: Option<&Path>,
        overrides: &[&str],
    ) -> CalculatorInputArgs {
        CalculatorInputArgs {
            calculator,
            input: input.map(Path::to_path_buf),
            overrides: overrides.iter().map(|o| (*o).to_owned()).collect(),
        }
    }

    #[test]
    fn test_parse_override_nests_dotted_keys() {
        assert_eq!(parse_override("zone=SE4").unwrap(), json!({"zone": "SE4"}));
        assert_eq!(parse_override("storage=true").unwrap(), json!({"storage": true}));
        assert_eq!(
            parse_override("vehicle.name=Kia EV6").unwrap(),
            json!({"vehicle": {"name": "Kia EV6"}})
        );
        assert!(parse_override("zone").is_err());
        assert!(parse_override("=SE3").is_err());
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let estimate = run(&args(
            Calculator::BatterySizing,
            None,
            &["zone=SE4", "annual_consumption_kwh=20000"],
        ))
        .unwrap();

        let Estimate::BatterySizing(input, _) = estimate else {
            panic!("expected a battery sizing estimate");
        };
        assert_eq!(input.zone, PriceZone::Se4);
        assert!((input.annual_consumption_kwh - 20_000.0).abs() < f64::EPSILON);
        assert!(input.has_solar);
    }

    #[test]
    fn test_toml_input_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("solar.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "system_size_kwp = 6.0\nshading = \"light\"").unwrap();
        drop(file);

        let estimate = run(&args(Calculator::SolarRoi, Some(&path), &[])).unwrap();
        let Estimate::SolarRoi(input, result) = estimate else {
            panic!("expected a solar estimate");
        };
        assert!((input.system_size_kwp - 6.0).abs() < f64::EPSILON);
        assert!(result.annual_production_kwh > 0.0);
    }

    #[test]
    fn test_invalid_override_value_is_an_error() {
        let result = run(&args(Calculator::V2xSavings, None, &["mode=teleport"]));
        assert!(result.is_err());
    }
}
