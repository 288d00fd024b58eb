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

//! Price-Range Fetcher.
//!
//! Pages through `/api/electricity-price` in windows of at most ten days, strictly in
//! order. Failed or empty pages are logged and skipped. Progress never decreases and the
//! last report is always 100.

use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wattlens_types::{Currency, PriceSample, PriceZone};

use crate::config::{MAX_PAGE_DAYS, PriceApiConfig};
use crate::error::PriceError;

/// Upstream prices are EUR/MWh
pub const MWH_TO_KWH_DIVISOR: f64 = 1000.0;

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    prices: Vec<ApiPrice>,
}

#[derive(Debug, Deserialize)]
struct ApiPrice {
    datetime: String,
    price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchProgress {
    /// 0-100, non-decreasing within a run
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub zone: PriceZone,
    pub currency: Currency,
    /// Chronological, concatenated page by page
    pub samples: Vec<PriceSample>,
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    /// Earliest timestamp actually returned
    pub actual_from: Option<NaiveDateTime>,
    /// Latest timestamp actually returned
    pub actual_to: Option<NaiveDateTime>,
    pub pages: usize,
    pub failed_pages: usize,
}

/// Clamp a requested range to the days the price API can serve
pub fn clamp_range(
    from: NaiveDate,
    to: NaiveDate,
    earliest: NaiveDate,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), PriceError> {
    if from > to {
        return Err(PriceError::InvalidRange { from, to });
    }

    let start = from.max(earliest);
    let end = to.min(today);
    if start > end {
        warn!(
            "Requested range {} to {} lies outside available data ({} to {})",
            from, to, earliest, today
        );
        return Err(PriceError::NoPriceData);
    }
    Ok((start, end))
}

fn percent_done(done_days: i64, total_days: i64) -> u8 {
    if total_days <= 0 {
        return 0;
    }
    (done_days * 100 / total_days).clamp(0, 99) as u8
}

#[derive(Debug, Clone)]
pub struct PriceClient {
    base_url: String,
    client: Client,
    page_days: u32,
    earliest_date: NaiveDate,
}

impl PriceClient {
    pub fn new(config: &PriceApiConfig) -> Result<Self, PriceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PriceError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            client,
            page_days: config.page_days.clamp(1, MAX_PAGE_DAYS),
            earliest_date: config.earliest_date,
        })
    }

    /// Fetch one page of prices starting at `start`, converted to `currency` per kWh
    pub async fn fetch_page(
        &self,
        zone: PriceZone,
        start: NaiveDate,
        days: u32,
        currency: Currency,
    ) -> Result<Vec<PriceSample>, PriceError> {
        let url = format!("{}/api/electricity-price", self.base_url);
        let date = start.format("%Y-%m-%d").to_string();
        let days = days.clamp(1, MAX_PAGE_DAYS).to_string();
        debug!("🔍 Fetching {} prices from {} ({} days)", zone, date, days);

        let response = self
            .client
            .get(&url)
            .query(&[("zone", zone.as_str()), ("date", date.as_str()), ("days", days.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PriceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<PriceResponse>().await?;
        Ok(body
            .prices
            .into_iter()
            .filter(|p| p.price.is_finite())
            .map(|p| PriceSample {
                timestamp_iso: p.datetime,
                price_per_kwh: currency.from_eur(p.price / MWH_TO_KWH_DIVISOR),
            })
            .collect())
    }

    /// Fetch every page covering `[from, to]`, clamped to the days the API can serve.
    ///
    /// `cancel` is checked before each page and aborts an in-flight request.
    pub async fn fetch_range(
        &self,
        zone: PriceZone,
        from: NaiveDate,
        to: NaiveDate,
        currency: Currency,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(FetchProgress),
    ) -> Result<PriceSeries, PriceError> {
        let today = Local::now().date_naive();
        let (start, end) = clamp_range(from, to, self.earliest_date, today)?;
        let total_days = (end - start).num_days() + 1;
        info!("📈 Fetching {} prices from {} to {}", zone, start, end);

        on_progress(FetchProgress {
            percent: 0,
            message: format!("Fetching prices from {start}"),
        });

        let mut samples: Vec<PriceSample> = Vec::new();
        let mut pages = 0;
        let mut failed_pages = 0;
        let mut done_days = 0;
        let mut cursor = start;

        while cursor <= end {
            if cancel.is_cancelled() {
                info!("Price fetch for {} cancelled at {}", zone, cursor);
                return Err(PriceError::Cancelled);
            }

            let remaining = (end - cursor).num_days() + 1;
            let days = remaining.min(i64::from(self.page_days)) as u32;

            let result = tokio::select! {
                () = cancel.cancelled() => {
                    info!("Price fetch for {} cancelled during page {}", zone, cursor);
                    return Err(PriceError::Cancelled);
                }
                result = self.fetch_page(zone, cursor, days, currency) => result,
            };

            pages += 1;
            match result {
                Ok(page) if page.is_empty() => {
                    warn!("No prices returned for {} from {}", zone, cursor);
                    failed_pages += 1;
                }
                Ok(mut page) => {
                    debug!("Received {} prices for {} from {}", page.len(), zone, cursor);
                    samples.append(&mut page);
                }
                Err(e) => {
                    warn!("Failed to fetch prices for {} from {}: {}", zone, cursor, e);
                    failed_pages += 1;
                }
            }

            done_days += i64::from(days);
            on_progress(FetchProgress {
                percent: percent_done(done_days, total_days),
                message: format!("Fetched prices for {cursor}"),
            });

            let Some(next) = cursor.checked_add_days(Days::new(u64::from(days))) else {
                break;
            };
            cursor = next;
        }

        on_progress(FetchProgress {
            percent: 100,
            message: "Price data ready".to_owned(),
        });

        if samples.is_empty() {
            warn!("No prices for {} between {} and {}", zone, start, end);
            return Err(PriceError::NoPriceData);
        }

        let timestamps = samples.iter().filter_map(PriceSample::local_timestamp);
        let (actual_from, actual_to) = timestamps.fold((None, None), |(lo, hi), ts| {
            (
                Some(lo.map_or(ts, |lo: NaiveDateTime| lo.min(ts))),
                Some(hi.map_or(ts, |hi: NaiveDateTime| hi.max(ts))),
            )
        });

        info!(
            "✅ Fetched {} prices for {} in {} pages ({} skipped)",
            samples.len(),
            zone,
            pages,
            failed_pages
        );

        Ok(PriceSeries {
            zone,
            currency,
            samples,
            requested_from: from,
            requested_to: to,
            actual_from,
            actual_to,
            pages,
            failed_pages,
        })
    }
}
