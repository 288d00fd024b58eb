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

//! WattLens CLI - runs the calculators and the negative-price analysis from a terminal

mod args;
mod estimates;
mod formatters;

use anyhow::{Context, Result, bail};
use chrono::{Days, Local};
use clap::Parser;
use serde_json::json;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wattlens_core::ingest::SAMPLE_PRODUCTION_CSV;
use wattlens_core::{
    AppConfig, CalculationError, Lead, LeadClient, LeadError, LeadOutcome, NegativePriceRequest,
    PriceClient, ProductionSource, RunTracker, read_upload, run_negative_price_analysis,
};

use crate::args::{
    Cli, Commands, EstimateArgs, NegativePricesArgs, OutputFormat, ParseArgs, SampleArgs,
    SubmitLeadArgs,
};

/// Days analyzed when only the end date is known
const DEFAULT_ANALYSIS_DAYS: u64 = 30;

fn load_config(dir: Option<&Path>) -> Result<AppConfig> {
    match dir {
        Some(dir) => AppConfig::load_from_dir(dir),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")
}

fn estimate(args: &EstimateArgs) -> Result<()> {
    let estimate = estimates::run(&args.input)?;
    match args.format {
        OutputFormat::Table => println!("{}", formatters::estimate(&estimate)),
        OutputFormat::Json => {
            let (input, result) = estimate.to_json()?;
            let output = json!({
                "calculator": estimate.calculator(),
                "input": input,
                "result": result,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

async fn negative_prices(args: &NegativePricesArgs, config: &AppConfig) -> Result<()> {
    let currency = args
        .currency
        .or(config.display_currency)
        .unwrap_or_else(|| args.zone.country().default_currency());
    let to = args
        .to
        .unwrap_or_else(|| Local::now().date_naive() - Days::new(1));
    let from = args
        .from
        .unwrap_or_else(|| to - Days::new(DEFAULT_ANALYSIS_DAYS - 1));

    let production = match &args.file {
        Some(path) => match read_upload(path, &config.upload) {
            Ok(upload) => ProductionSource::Uploaded(upload),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                bail!(CalculationError::from(e).user_message());
            }
        },
        None => ProductionSource::Estimated {
            system_kwp: args.system_kwp,
            zone: args.zone,
        },
    };

    let request = NegativePriceRequest {
        zone: args.zone,
        from,
        to,
        currency,
        has_battery: args.battery,
    };

    let tracker = RunTracker::new();
    let token = tracker.begin();
    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling price fetch");
                token.cancel();
            }
        })
    };

    let outcome = match PriceClient::new(&config.price_api) {
        Ok(client) => {
            run_negative_price_analysis(&client, &request, &production, &token, |progress| {
                info!("[{:>3}%] {}", progress.percent, progress.message);
            })
            .await
        }
        Err(e) => Err(CalculationError::from(e)),
    };
    interrupt.abort();

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            error!("Negative price analysis failed: {}", e);
            bail!(e.user_message());
        }
    };

    match args.format {
        OutputFormat::Table => println!("{}", formatters::negative_prices(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn parse(args: &ParseArgs, config: &AppConfig) -> Result<()> {
    let upload = match read_upload(&args.file, &config.upload) {
        Ok(upload) => upload,
        Err(e) => {
            error!("Failed to read {}: {}", args.file.display(), e);
            bail!(CalculationError::from(e).user_message());
        }
    };
    println!("{}", formatters::parsed_upload(&upload, args.samples));
    Ok(())
}

fn sample(args: &SampleArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            std::fs::write(path, SAMPLE_PRODUCTION_CSV)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("📄 Sample production file written to {}", path.display());
        }
        None => print!("{SAMPLE_PRODUCTION_CSV}"),
    }
    Ok(())
}

async fn submit_lead(args: &SubmitLeadArgs, config: &AppConfig) -> Result<()> {
    let estimate = estimates::run(&args.input)?;
    let (input, result) = estimate.to_json()?;
    let lead = Lead::new(
        args.email.as_str(),
        args.name.clone(),
        estimate.calculator(),
        &input,
        &result,
    )?;

    let client = LeadClient::new(&config.leads)
        .context("Lead form is not configured (set WATTLENS_LEAD_FORM_ID)")?;

    match client.submit(&lead).await {
        Ok(LeadOutcome::Accepted { status }) => {
            println!("Thanks! Your {} results were sent (status {status}).", lead.source);
        }
        Ok(LeadOutcome::Unconfirmed) => {
            println!("Thanks! Your {} results were sent.", lead.source);
        }
        Err(LeadError::InvalidEmail(email)) => bail!("Please enter a valid email address: {email}"),
        Err(e) => return Err(e).context("Failed to submit lead"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config_dir.as_deref())?;

    match &cli.command {
        Commands::Estimate(args) => estimate(args),
        Commands::NegativePrices(args) => negative_prices(args, &config).await,
        Commands::Parse(args) => parse(args, &config),
        Commands::Sample(args) => sample(args),
        Commands::SubmitLead(args) => submit_lead(args, &config).await,
    }
}
