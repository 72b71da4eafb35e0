// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Dispatch of subcommands to the engine.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use fluxion_community::CommunityEngine;
use fluxion_community::trend::parse_horizon;
use fluxion_community_store::{CommunityStore, Submission};
use fluxion_community_types::InstallationId;
use serde::Serialize;
use tracing::{info, warn};

use super::args::{Cli, Commands};
use crate::config::CommunityConfig;

/// Render a report as JSON
pub fn render<T: Serialize>(report: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(report)
    } else {
        serde_json::to_string_pretty(report)
    };
    json.context("Failed to serialize report")
}

/// Execute the parsed command and return the JSON to print
pub fn run(cli: Cli, config: &CommunityConfig) -> Result<String> {
    let today: NaiveDate = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let database = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database.path.clone());
    let store = CommunityStore::open(&database)?;
    info!(database = %database.display(), %today, "Opened community store");

    let compact = cli.compact;
    let reports = &config.reports;
    let default_period = reports.period_kind();
    let engine = CommunityEngine::new(store);

    match cli.command {
        Commands::Import { file } => {
            let submissions = Submission::load_file(&file)?;
            render(&engine.source().import(&submissions)?, compact)
        }
        Commands::Delete { token } => {
            let deleted = engine
                .source()
                .delete_installation(&InstallationId::new(token.as_str()))?;
            if !deleted {
                warn!(token = %token, "No installation with this token");
            }
            render(&serde_json::json!({ "deleted": deleted }), compact)
        }
        Commands::Benchmark { token, period } => render(
            &engine.benchmark(&token, period.request(default_period), today)?,
            compact,
        ),
        Commands::Compare { kwp, region, year } => {
            render(&engine.compare(kwp, &region, year, today)?, compact)
        }
        Commands::Stats => render(&engine.global_statistics(today)?, compact),
        Commands::Overview => render(&engine.overview(today)?, compact),
        Commands::Regions { counts: true } => render(&engine.region_counts()?, compact),
        Commands::Regions { counts: false } => render(&engine.regional_table(today)?, compact),
        Commands::Region { code } => render(&engine.region(&code, today)?, compact),
        Commands::Monthly { limit } => render(&engine.monthly_statistics(limit)?, compact),
        Commands::Month { year, month } => render(&engine.month(year, month)?, compact),
        Commands::MonthlyAverages { months } => {
            render(&engine.monthly_averages(months)?, compact)
        }
        Commands::Distribution { metric, period } => render(
            &engine.distribution(&metric, period.request(default_period), today)?,
            compact,
        ),
        Commands::Ranking {
            category,
            limit,
            own,
            period,
        } => render(
            &engine.ranking(
                &category,
                period.request(default_period),
                limit.unwrap_or(reports.ranking_limit),
                own.as_deref(),
                today,
            )?,
            compact,
        ),
        Commands::Trend { horizon } => {
            let horizon = horizon
                .as_deref()
                .map_or(reports.trend_horizon_months, parse_horizon);
            render(&engine.trend(horizon, today)?, compact)
        }
        Commands::Degradation => render(&engine.degradation(today)?, compact),
        Commands::StorageClasses { period } => render(
            &engine.storage_classes(period.request(default_period), today)?,
            compact,
        ),
        Commands::HeatPumpRegions { period } => render(
            &engine.heat_pump_regions(period.request(default_period), today)?,
            compact,
        ),
        Commands::EvUsage { period } => render(
            &engine.ev_usage(period.request(default_period), today)?,
            compact,
        ),
    }
}
