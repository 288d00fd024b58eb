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

//! Table output for calculator results.

use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL};
use serde::Serialize;
use wattlens_core::calculators::battery_sizing::BatterySizingResult;
use wattlens_core::calculators::ev_charging::EvChargingResult;
use wattlens_core::calculators::solar_roi::SolarRoiResult;
use wattlens_core::calculators::v2x_savings::V2xResult;
use wattlens_core::{NegativePriceSummary, ParsedUpload};

use crate::estimates::Estimate;

/// Serde name of an enum value, e.g. `coordinated-storage`
fn label(value: &impl Serialize) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::from("?"),
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(names: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header(names));
    table
}

fn name_cell(name: String, selected: bool) -> Cell {
    if selected {
        Cell::new(format!("{name} *"))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(name)
    }
}

fn summary_table(rows: Vec<(&str, String)>) -> Table {
    let mut table = new_table(&["Metric", "Value"]);
    for (metric, value) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }
    table
}

fn solar_roi(result: &SolarRoiResult) -> String {
    let mut table = new_table(&[
        "Scenario",
        "Self-consumed\n(kWh)",
        "Exported\n(kWh)",
        "Self-use\n(%)",
        "Savings\n/ year",
        "Investment",
        "Payback\n(years)",
        "25-year net",
    ]);
    for scenario in &result.scenarios {
        table.add_row(vec![
            name_cell(label(&scenario.kind), scenario.kind == result.selected),
            Cell::new(format!("{:.0}", scenario.self_consumed_kwh)),
            Cell::new(format!("{:.0}", scenario.exported_kwh)),
            Cell::new(format!("{:.1}", scenario.self_consumption_pct)),
            Cell::new(format!("{:.0}", scenario.annual_savings)),
            Cell::new(format!("{:.0}", scenario.investment)),
            Cell::new(format!("{:.1}", scenario.payback_years)),
            Cell::new(format!("{:.0}", scenario.lifetime_net)),
        ]);
    }
    format!(
        "Annual production: {:.0} kWh (amounts in {})\n{table}",
        result.annual_production_kwh, result.currency
    )
}

fn battery_sizing(result: &BatterySizingResult) -> String {
    let summary = summary_table(vec![
        ("Daily consumption", format!("{:.1} kWh", result.daily_consumption_kwh)),
        ("Minimum viable", format!("{:.1} kWh", result.min_viable_kwh)),
        ("Recommended", format!("{:.1} kWh", result.recommended_size_kwh)),
        ("Maximum practical", format!("{:.1} kWh", result.max_practical_kwh)),
        ("Annual savings", format!("{:.0} {}", result.annual_savings, result.currency)),
        ("Investment", format!("{:.0} {}", result.investment, result.currency)),
        ("Payback", format!("{:.1} years", result.payback_years)),
        ("Backup", format!("{:.1} hours", result.backup_hours)),
    ]);

    let mut comparison = new_table(&[
        "Size\n(kWh)",
        "Savings\n/ year",
        "Investment",
        "Payback\n(years)",
    ]);
    for row in &result.comparison {
        comparison.add_row(vec![
            name_cell(format!("{:.0}", row.size_kwh), row.is_recommended),
            Cell::new(format!("{:.0}", row.annual_savings)),
            Cell::new(format!("{:.0}", row.investment)),
            Cell::new(format!("{:.1}", row.payback_years)),
        ]);
    }
    format!("{summary}\n{comparison}")
}

fn ev_charging(result: &EvChargingResult) -> String {
    let mut table = new_table(&[
        "Pattern",
        "Solar\n(kWh)",
        "Cost\n/ year",
        "Cost\n/ 100 km",
        "Savings vs\nimmediate",
    ]);
    for row in &result.patterns {
        table.add_row(vec![
            name_cell(label(&row.pattern), row.pattern == result.selected),
            Cell::new(format!("{:.0}", row.solar_kwh)),
            Cell::new(format!("{:.0}", row.annual_cost)),
            Cell::new(format!("{:.2}", row.cost_per_100km)),
            Cell::new(format!("{:.0}", row.savings_vs_immediate)),
        ]);
    }
    let summary = summary_table(vec![
        ("Energy / year", format!("{:.0} kWh", result.annual_energy_kwh)),
        ("Charged at home", format!("{:.0} kWh", result.home_energy_kwh)),
        ("Charged in public", format!("{:.0} kWh", result.public_energy_kwh)),
        ("Petrol equivalent", format!("{:.0} {}", result.petrol_equivalent_cost, result.currency)),
        ("Savings vs petrol", format!("{:.0} {}", result.savings_vs_petrol, result.currency)),
    ]);
    format!("{table}\n{summary}")
}

fn v2x_savings(result: &V2xResult) -> String {
    let mut table = new_table(&[
        "Mode",
        "Discharged\n(kWh / year)",
        "Savings\n/ year",
        "Investment",
        "Payback\n(years)",
    ]);
    for scenario in &result.scenarios {
        table.add_row(vec![
            name_cell(label(&scenario.mode), scenario.mode == result.selected),
            Cell::new(format!("{:.0}", scenario.annual_discharge_kwh)),
            Cell::new(format!("{:.0}", scenario.annual_savings)),
            Cell::new(format!("{:.0}", scenario.investment)),
            Cell::new(format!("{:.1}", scenario.payback_years)),
        ]);
    }
    format!(
        "Usable per day: {:.1} kWh, {:.1} full cycles / year (amounts in {})\n{table}",
        result.usable_daily_kwh, result.equivalent_cycles_per_year, result.currency
    )
}

pub fn negative_prices(summary: &NegativePriceSummary) -> String {
    let currency = summary.currency;
    let period = match (summary.analyzed_from, summary.analyzed_to) {
        (Some(from), Some(to)) => format!("{from} to {to}"),
        _ => "typical year".to_owned(),
    };
    let overview = summary_table(vec![
        ("Analyzed period", period),
        (
            "Negative hours",
            format!(
                "{} of {} ({:.1}%)",
                summary.negative_price_hours, summary.total_hours, summary.negative_percentage
            ),
        ),
        ("Production", format!("{:.2} kWh", summary.total_production_kwh)),
        (
            "During negative hours",
            format!("{:.2} kWh", summary.production_during_negative_kwh),
        ),
        ("Lost revenue", format!("{:.2} {currency}", summary.lost_revenue)),
        ("Average negative price", format!("{:.2} {currency}/kWh", summary.avg_negative_price)),
        ("Worst negative price", format!("{:.2} {currency}/kWh", summary.worst_negative_price)),
        ("Potential savings", format!("{:.2} {currency}", summary.potential_savings)),
        ("Potential exposure", format!("{:.2} {currency}", summary.potential_exposure)),
    ]);

    let mut monthly = new_table(&[
        "Month",
        "Negative\nhours",
        "Production\n(kWh)",
        "Lost\nrevenue",
    ]);
    for month in &summary.monthly {
        monthly.add_row(vec![
            Cell::new(&month.month),
            Cell::new(month.negative_hours),
            Cell::new(format!("{:.2}", month.production_during_negative_kwh)),
            Cell::new(format!("{:.2}", month.lost_revenue)),
        ]);
    }
    format!("{overview}\n{monthly}")
}

pub fn estimate(estimate: &Estimate) -> String {
    match estimate {
        Estimate::SolarRoi(_, result) => solar_roi(result),
        Estimate::BatterySizing(_, result) => battery_sizing(result),
        Estimate::EvCharging(_, result) => ev_charging(result),
        Estimate::V2xSavings(_, result) => v2x_savings(result),
        Estimate::NegativePrices(_, result) => negative_prices(result),
    }
}

pub fn parsed_upload(upload: &ParsedUpload, with_samples: bool) -> String {
    let columns = &upload.columns;
    let describe = |index: usize, header: &str, by_keyword: bool| {
        let how = if by_keyword { "matched" } else { "default" };
        format!("column {} \"{}\" ({how})", index + 1, header)
    };
    let mut output = summary_table(vec![
        (
            "Timestamp",
            describe(
                columns.timestamp.index,
                &columns.timestamp.header,
                columns.timestamp.by_keyword,
            ),
        ),
        (
            "Production",
            describe(
                columns.production.index,
                &columns.production.header,
                columns.production.by_keyword,
            ),
        ),
        ("Rows parsed", upload.parsed_rows.to_string()),
        ("Rows dropped", upload.dropped_rows.to_string()),
        ("Granularity", label(&upload.granularity)),
        ("Total production", format!("{:.2} kWh", upload.total_production_kwh())),
    ])
    .to_string();

    if with_samples {
        let mut samples = new_table(&["Timestamp", "Production\n(kWh)"]);
        for sample in &upload.samples {
            samples.add_row(vec![
                Cell::new(sample.timestamp),
                Cell::new(format!("{:.3}", sample.production_kwh)),
            ]);
        }
        output.push('\n');
        output.push_str(&samples.to_string());
    }
    output
}
