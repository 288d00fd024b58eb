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

//! Runtime configuration
//!
//! Loaded from `wattlens.toml` or `wattlens.json` in the working directory, falling back to
//! defaults. Environment variables override whatever was loaded.

use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use wattlens_types::Currency;

pub const MAX_PAGE_DAYS: u32 = 10;

fn default_base_url() -> String {
    "http://localhost:3000".to_owned()
}

fn default_page_days() -> u32 {
    MAX_PAGE_DAYS
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default()
}

fn default_lead_endpoint() -> String {
    "https://submit-form.com".to_owned()
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceApiConfig {
    /// Base URL hosting `/api/electricity-price`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Days requested per page (1-10)
    #[serde(default = "default_page_days")]
    pub page_days: u32,

    /// Per-page request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// First day the price API has data for
    #[serde(default = "default_earliest_date")]
    pub earliest_date: NaiveDate,
}

impl Default for PriceApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_days: default_page_days(),
            timeout_secs: default_timeout_secs(),
            earliest_date: default_earliest_date(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadConfig {
    #[serde(default = "default_lead_endpoint")]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            endpoint: default_lead_endpoint(),
            form_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Files above this size are rejected before parsing
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub price_api: PriceApiConfig,

    #[serde(default)]
    pub leads: LeadConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    /// Overrides the country's default currency when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_currency: Option<Currency>,
}

impl AppConfig {
    /// Load configuration from the working directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let toml_path = dir.join("wattlens.toml");
        let json_path = dir.join("wattlens.json");

        let mut config = if toml_path.exists() {
            let content = std::fs::read_to_string(&toml_path)?;
            let config: AppConfig = toml::from_str(&content)?;
            info!("✅ Loaded configuration from {}", toml_path.display());
            config
        } else if json_path.exists() {
            let content = std::fs::read_to_string(&json_path)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            info!("✅ Loaded configuration from {}", json_path.display());
            config
        } else {
            warn!("No configuration file found, using defaults with environment overrides");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` so tests can inject values
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WATTLENS_PRICE_API_URL") {
            self.price_api.base_url = url;
        }

        if let Some(form_id) = lookup("WATTLENS_LEAD_FORM_ID")
            && !form_id.trim().is_empty()
        {
            self.leads.form_id = Some(form_id.trim().to_owned());
        }

        if let Some(currency) = lookup("WATTLENS_CURRENCY") {
            match currency.parse::<Currency>() {
                Ok(c) => self.display_currency = Some(c),
                Err(e) => warn!("Ignoring WATTLENS_CURRENCY: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PAGE_DAYS).contains(&self.price_api.page_days) {
            return Err(ConfigError::Invalid(format!(
                "price_api.page_days must be between 1 and {MAX_PAGE_DAYS}, got {}",
                self.price_api.page_days
            )));
        }

        if self.price_api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "price_api.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "upload.max_bytes must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.price_api.page_days, 10);
        assert_eq!(config.price_api.timeout_secs, 20);
        assert_eq!(config.leads.endpoint, "https://submit-form.com");
        assert!(config.leads.form_id.is_none());
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_page_days_range() {
        let mut config = AppConfig::default();
        config.price_api.page_days = 0;
        assert!(config.validate().is_err());

        config.price_api.page_days = 11;
        assert!(config.validate().is_err());

        config.price_api.page_days = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "WATTLENS_PRICE_API_URL" => Some("http://prices.test".to_owned()),
            "WATTLENS_LEAD_FORM_ID" => Some(" abc123 ".to_owned()),
            "WATTLENS_CURRENCY" => Some("sek".to_owned()),
            _ => None,
        });

        assert_eq!(config.price_api.base_url, "http://prices.test");
        assert_eq!(config.leads.form_id.as_deref(), Some("abc123"));
        assert_eq!(config.display_currency, Some(Currency::Sek));
    }

    #[test]
    fn test_unknown_currency_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == "WATTLENS_CURRENCY").then(|| "XYZ".to_owned()));
        assert!(config.display_currency.is_none());
    }

    #[test]
    fn test_load_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("wattlens.toml"),
            "display_currency = \"NOK\"\n\n[price_api]\npage_days = 5\n",
        )
        .unwrap();

        let config = AppConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.price_api.page_days, 5);
        assert_eq!(config.price_api.timeout_secs, 20);
        assert_eq!(config.display_currency, Some(Currency::Nok));
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("wattlens.toml"), "[upload]\nmax_bytes = 0\n").unwrap();

        assert!(matches!(
            AppConfig::load_from_dir(dir.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
