// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fluxion_community::PeriodRequest;
use fluxion_community_types::PeriodKind;

#[derive(Debug, Parser)]
#[command(name = "fluxion-community")]
#[command(author, version, about = "FluxION community benchmark and statistics")]
#[command(
    long_about = "Benchmark PV installations against the FluxION community.\n\
    \nEvery report is printed as JSON on stdout; logs go to stderr.\n\
    \nExamples:\n  \
    fluxion-community import --file submissions.json\n  \
    fluxion-community benchmark 3f9a0c --period year --year 2024\n  \
    fluxion-community ranking specific_yield --limit 20 --own 3f9a0c\n  \
    fluxion-community distribution capacity"
)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database, overrides `database.path` from the config
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Reference date for period resolution (defaults to the local date)
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Compact single-line JSON instead of pretty output
    #[arg(long, global = true, default_value_t = false)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a JSON array of installations with their monthly records
    Import {
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Remove an installation and all of its records
    Delete {
        /// Identity token of the installation
        token: String,
    },

    /// Benchmark one installation against the community and its region
    Benchmark {
        /// Identity token of the installation
        token: String,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Expected yield of a hypothetical installation
    Compare {
        /// Capacity in kWp
        #[arg(long)]
        kwp: f64,

        /// Two-letter region code
        #[arg(long)]
        region: String,

        /// Target calendar year (defaults to the previous year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Community wide statistics
    Stats,

    /// Counts, averages, regional table and the last twelve months
    Overview,

    /// Regional table over the trailing twelve months
    Regions {
        /// Only list regions with their installation counts
        #[arg(long, default_value_t = false)]
        counts: bool,
    },

    /// Statistics of a single region
    Region {
        /// Two-letter region code
        code: String,
    },

    /// Statistics of the most recent months with data
    Monthly {
        #[arg(long, default_value_t = 12)]
        limit: usize,
    },

    /// Statistics of one calendar month
    Month { year: i32, month: u8 },

    /// Community average specific yield per month, oldest first
    MonthlyAverages {
        #[arg(long, default_value_t = 12)]
        months: usize,
    },

    /// Histogram of a metric
    #[command(
        long_about = "Histogram and summary of a population metric.\n\
        \nMetrics: capacity, storage, specific_yield, self_sufficiency, tilt, heat_pump_jaz"
    )]
    Distribution {
        metric: String,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Top list of a KPI
    #[command(
        long_about = "Installations ordered by a KPI, best first.\n\
        \nCategories: specific_yield, self_sufficiency, storage_efficiency, heat_pump_jaz, \
        ev_pv_share"
    )]
    Ranking {
        category: String,

        /// Number of entries (defaults to `reports.ranking_limit`)
        #[arg(long)]
        limit: Option<usize>,

        /// Also report the rank of this identity token
        #[arg(long, value_name = "TOKEN")]
        own: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Cumulative community growth per month
    Trend {
        /// Months to look back: a number up to 60 or "all"
        #[arg(long)]
        horizon: Option<String>,
    },

    /// Specific yield by installation age
    Degradation,

    /// Storage efficiency and cycles per battery size class
    StorageClasses {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Heat pump JAZ per region
    HeatPumpRegions {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// EV figures by monthly driving distance
    EvUsage {
        #[command(flatten)]
        period: PeriodArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PeriodArgs {
    /// last_month, trailing_12_months, last_complete_year, year or since_installation
    #[arg(long)]
    pub period: Option<String>,

    /// Calendar year for `--period year`
    #[arg(long)]
    pub year: Option<i32>,
}

impl PeriodArgs {
    /// Resolve against the configured default period
    pub fn request(&self, default_period: PeriodKind) -> PeriodRequest {
        match self.period.as_deref() {
            Some(identifier) => PeriodRequest::parse(identifier, self.year),
            None => PeriodRequest::new(default_period, self.year),
        }
    }
}
