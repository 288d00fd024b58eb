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

pub mod analysis;
pub mod calculators;
pub mod config;
pub mod error;
pub mod ingest;
pub mod leads;
pub mod pricing;
pub mod rounding;
pub mod tables;

pub use analysis::{
    NegativePriceRequest, ProductionSource, RunTracker, analyze, run_negative_price_analysis,
};
pub use calculators::Calculator;
pub use calculators::negative_prices::{MonthlyBreakdown, NegativePriceSummary};
pub use config::AppConfig;
pub use error::{CalculationError, ConfigError, IngestError, LeadError, PriceError, Result};
pub use ingest::{
    ParsedUpload, SAMPLE_PRODUCTION_CSV, UploadKind, parse_production_file, read_upload,
    validate_upload,
};
pub use leads::{Lead, LeadClient, LeadOutcome};
pub use pricing::{FetchProgress, PriceClient, PriceSeries};
pub use tokio_util::sync::CancellationToken;
