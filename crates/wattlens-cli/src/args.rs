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

//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wattlens_core::Calculator;
use wattlens_types::{Currency, PriceZone};

#[derive(Parser)]
#[command(name = "wattlens")]
#[command(author, version, about = "WattLens energy savings calculators")]
#[command(
    long_about = "Estimate solar, battery, EV charging and V2X savings, and analyze exposure to\n\
    negative electricity prices from your own production data.\n\
    \nExamples:\n  \
    wattlens estimate battery-sizing\n  \
    wattlens estimate solar-roi --set system_size_kwp=12 --set storage=true\n  \
    wattlens negative-prices --file production.csv --zone SE3 --from 2025-04-01 --to 2025-06-30\n  \
    wattlens sample --output sample-production.csv"
)]
pub struct Cli {
    /// Directory holding wattlens.toml or wattlens.json
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one calculator on default inputs, an input file and/or overrides
    #[command(
        long_about = "Run a calculator and print its result.\n\
        \nInputs start from the calculator defaults, then the optional --input file\n\
        (TOML or JSON), then each --set key=value override. Nested keys use dots.\n\
        \nExamples:\n  \
        wattlens estimate ev-charging --set vehicle.name=\"Tesla Model Y\"\n  \
        wattlens estimate v2x-savings --input v2x.toml --format json"
    )]
    Estimate(EstimateArgs),

    /// Analyze negative-price hours against uploaded or estimated production
    NegativePrices(NegativePricesArgs),

    /// Parse a production file and show what was detected
    Parse(ParseArgs),

    /// Write the sample production CSV
    Sample(SampleArgs),

    /// Send a calculator result to the lead form
    SubmitLead(SubmitLeadArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
pub struct CalculatorInputArgs {
    /// Calculator to run (solar-roi, battery-sizing, ev-charging, v2x-savings, negative-prices)
    pub calculator: Calculator,

    /// TOML or JSON file with input fields
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override one input field, e.g. --set zone=SE4
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

#[derive(Parser)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub input: CalculatorInputArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct NegativePricesArgs {
    /// Production export (.csv, .txt, .xlsx, .xls); estimated production is used without it
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// PV size for estimated production
    #[arg(long, default_value_t = 10.0)]
    pub system_kwp: f64,

    #[arg(long, default_value = "SE3")]
    pub zone: PriceZone,

    /// Defaults to the configured display currency, then the zone's local currency
    #[arg(long)]
    pub currency: Option<Currency>,

    /// First day to analyze (defaults to 30 days before --to)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to analyze (defaults to yesterday)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// A home battery absorbs part of the surplus
    #[arg(long)]
    pub battery: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct ParseArgs {
    pub file: PathBuf,

    /// Also list every parsed sample
    #[arg(long)]
    pub samples: bool,
}

#[derive(Parser)]
pub struct SampleArgs {
    /// Write to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SubmitLeadArgs {
    #[command(flatten)]
    pub input: CalculatorInputArgs,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub name: Option<String>,
}
