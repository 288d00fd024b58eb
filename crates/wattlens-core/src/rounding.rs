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

//! Result shaping shared by every calculator.
//!
//! All surfaced figures go through these helpers so identical inputs always produce
//! identical outputs and nothing non-finite ever reaches a result.

/// Payback reported when savings never cover the investment
pub const PAYBACK_SENTINEL_YEARS: f64 = 99.0;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Whole currency units and kWh
#[must_use]
pub fn round_whole(value: f64) -> f64 {
    finite_or_zero(value).round()
}

/// Years and percentages
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (finite_or_zero(value) * 10.0).round() / 10.0
}

/// Per-kWh prices and the small amounts of the negative price analysis
#[must_use]
pub fn round_two_decimals(value: f64) -> f64 {
    (finite_or_zero(value) * 100.0).round() / 100.0
}

/// Battery sizes are offered in 0.5 kWh steps
#[must_use]
pub fn round_to_half(value: f64) -> f64 {
    (finite_or_zero(value) * 2.0).round() / 2.0
}

/// Simple payback in years, one decimal, capped at the sentinel
#[must_use]
pub fn payback_years(investment: f64, annual_savings: f64) -> f64 {
    if !annual_savings.is_finite() || annual_savings <= 0.0 {
        return PAYBACK_SENTINEL_YEARS;
    }
    if investment <= 0.0 {
        return 0.0;
    }
    round_one_decimal((investment / annual_savings).min(PAYBACK_SENTINEL_YEARS))
}

/// `part / whole` in percent with one decimal; zero when `whole` is zero
#[must_use]
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole.abs() < f64::EPSILON {
        return 0.0;
    }
    round_one_decimal(part / whole * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payback_sentinel_for_non_positive_savings() {
        assert!((payback_years(10_000.0, 0.0) - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);
        assert!((payback_years(10_000.0, -50.0) - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);
        assert!((payback_years(10_000.0, f64::NAN) - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_payback_is_capped() {
        assert!((payback_years(1_000_000.0, 1.0) - PAYBACK_SENTINEL_YEARS).abs() < f64::EPSILON);
        assert!((payback_years(10_000.0, 1_500.0) - 6.7).abs() < 1e-9);
        assert!(payback_years(0.0, 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rounding_helpers() {
        assert!((round_whole(1234.5) - 1235.0).abs() < f64::EPSILON);
        assert!((round_one_decimal(12.345) - 12.3).abs() < 1e-9);
        assert!((round_two_decimals(0.125_1) - 0.13).abs() < 1e-9);
        assert!((round_to_half(7.3) - 7.5).abs() < f64::EPSILON);
        assert!((round_to_half(7.2) - 7.0).abs() < f64::EPSILON);
        assert!(round_whole(f64::INFINITY).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_of_zero_whole() {
        assert!(percentage(5.0, 0.0).abs() < f64::EPSILON);
        assert!((percentage(1.0, 2.0) - 50.0).abs() < f64::EPSILON);
    }
}
