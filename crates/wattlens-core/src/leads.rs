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

//! Lead submission to the external form-collection service.

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{info, warn};

use crate::calculators::Calculator;
use crate::config::LeadConfig;
use crate::error::LeadError;

const SUBMIT_TIMEOUT_SECS: u64 = 10;

/// Minimal shape check: one `@`, a non-empty local part and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(fields) => {
            for (key, nested) in fields {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}_{key}")
                };
                flatten_into(&key, nested, out);
            }
        }
        Value::Array(_) => {}
        scalar => {
            out.insert(prefix.to_owned(), scalar.clone());
        }
    }
}

/// Flatten nested objects into `parent_child` keys, dropping arrays
pub fn flatten_snapshot(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into("", value, &mut out);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub email: String,
    pub name: Option<String>,
    pub source: Calculator,
    /// Calculator input and result as `{"input": .., "result": ..}`
    pub snapshot: Value,
}

impl Lead {
    pub fn new(
        email: impl Into<String>,
        name: Option<String>,
        source: Calculator,
        input: &impl Serialize,
        result: &impl Serialize,
    ) -> Result<Self, LeadError> {
        Ok(Self {
            email: email.into(),
            name,
            source,
            snapshot: json!({
                "input": serde_json::to_value(input)?,
                "result": serde_json::to_value(result)?,
            }),
        })
    }

    /// JSON body as the form service expects it
    pub fn payload(&self) -> Value {
        let mut body = flatten_snapshot(&self.snapshot);
        body.insert("email".to_owned(), Value::String(self.email.trim().to_owned()));
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            body.insert("name".to_owned(), Value::String(name.to_owned()));
        }
        body.insert(
            "_source".to_owned(),
            Value::String(self.source.source().to_owned()),
        );
        Value::Object(body)
    }
}

/// Both outcomes count as submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOutcome {
    Accepted { status: u16 },
    /// The service rejected the lead or could not be reached
    Unconfirmed,
}

#[derive(Debug, Clone)]
pub struct LeadClient {
    url: String,
    client: Client,
}

impl LeadClient {
    pub fn new(config: &LeadConfig) -> Result<Self, LeadError> {
        let form_id = config
            .form_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(LeadError::MissingFormId)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(SUBMIT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeadError::Client(e.to_string()))?;

        Ok(Self {
            url: format!("{}/{}", config.endpoint.trim_end_matches('/'), form_id),
            client,
        })
    }

    /// POST the lead once. Only an invalid email is an error.
    pub async fn submit(&self, lead: &Lead) -> Result<LeadOutcome, LeadError> {
        if !is_valid_email(&lead.email) {
            return Err(LeadError::InvalidEmail(lead.email.clone()));
        }

        let response = self
            .client
            .post(&self.url)
            .header("accept", "application/json")
            .json(&lead.payload())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!("✅ Lead from {} submitted", lead.source);
                Ok(LeadOutcome::Accepted {
                    status: response.status().as_u16(),
                })
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("⚠️ Lead service returned {}: {}", status, body);
                Ok(LeadOutcome::Unconfirmed)
            }
            Err(e) => {
                warn!("⚠️ Failed to reach lead service: {}", e);
                Ok(LeadOutcome::Unconfirmed)
            }
        }
    }
}
