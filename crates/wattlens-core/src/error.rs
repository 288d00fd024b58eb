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

//! Error types for the calculator core

use thiserror::Error;

/// Failures while accepting or parsing an uploaded production file
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {0}")]
    UnsupportedExtension(String),

    #[error("file is too large: {size} bytes (limit {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("failed to read delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("no production rows could be parsed")]
    NoRows,
}

/// Failures while retrieving spot prices
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid date range: {from} is after {to}")]
    InvalidRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    #[error("no price data available for the selected period")]
    NoPriceData,

    #[error("calculation was superseded by a newer run")]
    Cancelled,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failures while submitting a lead
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("lead form ID is not configured")]
    MissingFormId,

    #[error("failed to build lead snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Anything that can go wrong in the calculate-and-fetch flow
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Price(#[from] PriceError),
}

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while calculating. Please try again in a moment.";

impl CalculationError {
    /// Message suitable for showing next to the calculator
    pub fn user_message(&self) -> String {
        match self {
            Self::Ingest(IngestError::UnsupportedExtension(_)) => {
                "Please upload a CSV, TXT, XLSX or XLS file.".to_owned()
            }
            Self::Ingest(IngestError::FileTooLarge { max, .. }) => {
                format!("The file is too large. Maximum size is {} MB.", max / (1024 * 1024))
            }
            Self::Ingest(_) => {
                concat!(
                    "We could not read any production data from the file. ",
                    "Check the sample file for the expected format."
                )
                .to_owned()
            }
            Self::Price(PriceError::NoPriceData) => {
                "No price data is available for the selected period.".to_owned()
            }
            Self::Price(PriceError::Cancelled) => "Calculation was restarted.".to_owned(),
            Self::Price(_) => GENERIC_FAILURE_MESSAGE.to_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalculationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_distinguish_file_errors() {
        let too_large = CalculationError::from(IngestError::FileTooLarge {
            size: 20 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        });
        assert!(too_large.user_message().contains("10 MB"));

        let no_rows = CalculationError::from(IngestError::NoRows);
        assert!(no_rows.user_message().contains("sample file"));
    }

    #[test]
    fn test_no_price_data_is_distinct_from_generic_failure() {
        let empty = CalculationError::from(PriceError::NoPriceData);
        assert_ne!(empty.user_message(), GENERIC_FAILURE_MESSAGE);

        let upstream = CalculationError::from(PriceError::Api {
            status: 502,
            message: "bad gateway".to_owned(),
        });
        assert_eq!(upstream.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
