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

//! FluxION Community Engine
//!
//! Aggregates monthly PV submissions of the community into benchmarks,
//! rankings and statistics.
//!
//! ## Features
//!
//! - **Benchmark**: Place one installation within the community and its region
//! - **What-if**: Expected yield of a hypothetical installation from similar ones
//! - **Statistics**: Global, regional and monthly aggregates
//! - **Distributions & Rankings**: Histograms and top lists per KPI
//! - **Trend & Degradation**: Community growth and yield by installation age
//!
//! Every report is a pure function of a [`Snapshot`] and an explicit date;
//! [`CommunityEngine`] loads the snapshot from a [`DataSource`].

pub mod benchmark;
pub mod breakdown;
pub mod components;
pub mod degradation;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod math;
pub mod period;
pub mod population;
pub mod ranking;
pub mod source;
pub mod statistics;
pub mod trend;
pub mod yield_estimate;

pub use benchmark::{installation_benchmark, what_if_comparison};
pub use distribution::{DistributionMetric, distribution};
pub use engine::CommunityEngine;
pub use error::{CommunityError, Result};
pub use period::{PeriodRequest, resolve_period};
pub use ranking::{Ranking, ranking_report};
pub use source::{DataSource, RecordQuery, Snapshot};
pub use yield_estimate::{estimate_specific_yield, known_specific_yield};
