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

//! Report payloads.
//!
//! Every struct here is produced fresh per request from a read-only data
//! snapshot. Optional values are `None` when the underlying data is missing
//! or a ratio has no meaningful denominator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::installation::{Equipment, InstallationId, Orientation};
use crate::period::{MonthRange, PeriodKind, YearMonth};

// ============= Period =============

/// Resolved reporting window as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub kind: PeriodKind,
    pub range: MonthRange,
    pub label: String,
}

// ============= Benchmark =============

/// One KPI of an installation next to the community
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiComparison {
    pub value: f64,
    pub community_avg: Option<f64>,
    /// 1-based position in the ranked population
    pub rank: Option<usize>,
    /// Size of the ranked population
    pub of: Option<usize>,
}

/// Headline comparison of specific yield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    /// kWh/kWp of the installation, `None` without usable records
    pub own_specific_yield: Option<f64>,
    pub community_specific_yield: Option<f64>,
    pub region_specific_yield: Option<f64>,
    pub rank_overall: Option<usize>,
    pub installations_overall: usize,
    pub rank_region: Option<usize>,
    pub installations_region: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvBenchmark {
    pub specific_yield: Option<KpiComparison>,
    pub self_consumption_pct: Option<KpiComparison>,
    pub self_sufficiency_pct: Option<KpiComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageBenchmark {
    pub capacity_kwh: KpiComparison,
    pub cycles_per_year: Option<KpiComparison>,
    pub efficiency_pct: Option<KpiComparison>,
    pub grid_share_pct: Option<KpiComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPumpBenchmark {
    pub jaz: KpiComparison,
    pub electricity_kwh: KpiComparison,
    pub heat_kwh: KpiComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvBenchmark {
    pub charge_total_kwh: KpiComparison,
    pub pv_share_pct: Option<KpiComparison>,
    pub distance_km: Option<KpiComparison>,
    pub consumption_per_100km: Option<KpiComparison>,
    pub v2h_kwh: Option<KpiComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallboxBenchmark {
    pub charge_kwh: KpiComparison,
    pub pv_share_pct: Option<KpiComparison>,
    pub sessions: Option<KpiComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalconyPvBenchmark {
    pub generation_kwh: KpiComparison,
    pub specific_yield: Option<KpiComparison>,
    pub self_consumption_pct: Option<KpiComparison>,
}

/// Component level comparison. A section is `None` when the installation
/// has no such component or reported no data for it in the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedBenchmark {
    pub pv: PvBenchmark,
    pub storage: Option<StorageBenchmark>,
    pub heat_pump: Option<HeatPumpBenchmark>,
    pub ev: Option<EvBenchmark>,
    pub wallbox: Option<WallboxBenchmark>,
    pub balcony_pv: Option<BalconyPvBenchmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthView {
    pub period: YearMonth,
    pub yield_kwh: f64,
    /// kWh/kWp for this month
    pub specific_yield: f64,
    pub self_sufficiency_pct: Option<f64>,
    pub self_consumption_pct: Option<f64>,
}

/// Public view of an installation, newest month first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationView {
    pub id: InstallationId,
    pub region: String,
    pub capacity_kwp: f64,
    pub orientation: Orientation,
    pub tilt_deg: u8,
    pub storage_kwh: Option<f64>,
    pub install_year: i32,
    pub equipment: Equipment,
    pub months: Vec<MonthView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationBenchmark {
    pub installation: InstallationView,
    pub benchmark: BenchmarkSummary,
    pub extended: ExtendedBenchmark,
    pub period: PeriodInfo,
}

// ============= What-if comparison =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub capacity_kwp: f64,
    pub region: String,
    pub year: i32,
    /// Installations within the capacity band that had data for the year
    pub comparable_installations: usize,
    /// Subset of `comparable_installations` in the requested region
    pub comparable_installations_region: usize,
    pub community_specific_yield: f64,
    pub region_specific_yield: Option<f64>,
    pub expected_annual_yield_kwh: f64,
}

/// Outcome of a what-if comparison. An empty population is a regular
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonReport {
    Found(ComparisonResult),
    NoComparableData { message: String },
}

// ============= Statistics =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentShares {
    pub storage_pct: f64,
    pub heat_pump_pct: f64,
    pub ev_pct: f64,
    pub wallbox_pct: f64,
    pub balcony_pv_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAverages {
    pub capacity_kwp: f64,
    /// Mean over installations with a battery
    pub storage_kwh: Option<f64>,
    pub specific_yield: Option<f64>,
    pub self_sufficiency_pct: Option<f64>,
    pub self_consumption_pct: Option<f64>,
}

/// The most representative installation of the community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypicalInstallation {
    pub capacity_kwp: f64,
    pub orientation: Orientation,
    pub tilt_deg: u8,
    pub storage_kwh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStatistics {
    pub installations: usize,
    pub regions: usize,
    pub averages: GlobalAverages,
    pub equipment: EquipmentShares,
    pub typical: TypicalInstallation,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStatistics {
    pub region: String,
    pub installations: usize,
    pub avg_capacity_kwp: f64,
    pub avg_specific_yield: Option<f64>,
    pub avg_self_sufficiency_pct: Option<f64>,
    pub equipment: EquipmentShares,
}

impl RegionStatistics {
    /// Statistics row for a region without installations
    #[must_use]
    pub fn empty(region: &str) -> Self {
        Self {
            region: region.to_owned(),
            installations: 0,
            avg_capacity_kwp: 0.0,
            avg_specific_yield: None,
            avg_self_sufficiency_pct: None,
            equipment: EquipmentShares::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub installations: usize,
}

/// Community figures for a single calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStatistics {
    pub period: YearMonth,
    pub installations: usize,
    pub avg_yield_kwh: f64,
    /// Total yield over total capacity
    pub avg_specific_yield: f64,
    pub median_specific_yield: f64,
    pub min_specific_yield: f64,
    pub max_specific_yield: f64,
}

impl MonthStatistics {
    #[must_use]
    pub fn empty(period: YearMonth) -> Self {
        Self {
            period,
            installations: 0,
            avg_yield_kwh: 0.0,
            avg_specific_yield: 0.0,
            median_specific_yield: 0.0,
            min_specific_yield: 0.0,
            max_specific_yield: 0.0,
        }
    }
}

/// Mean per-installation specific yield of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub period: YearMonth,
    pub installations: usize,
    pub avg_specific_yield: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewStatistics {
    pub installations: usize,
    pub monthly_records: usize,
    pub avg_capacity_kwp: f64,
    pub avg_storage_kwh: Option<f64>,
    pub avg_specific_yield: Option<f64>,
    pub regions: Vec<RegionStatistics>,
    pub months: Vec<MonthStatistics>,
}

// ============= Distribution =============

/// Half-open histogram bin `[from, to)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBin {
    pub from: f64,
    pub to: f64,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub metric: String,
    pub unit: String,
    pub bins: Vec<DistributionBin>,
    pub summary: DistributionSummary,
}

// ============= Ranking =============

/// KPI used to order the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingCategory {
    SpecificYield,
    SelfSufficiency,
    StorageEfficiency,
    HeatPumpJaz,
    EvPvShare,
}

impl RankingCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpecificYield => "specific_yield",
            Self::SelfSufficiency => "self_sufficiency",
            Self::StorageEfficiency => "storage_efficiency",
            Self::HeatPumpJaz => "heat_pump_jaz",
            Self::EvPvShare => "ev_pv_share",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::SpecificYield => "kWh/kWp",
            Self::SelfSufficiency | Self::StorageEfficiency | Self::EvPvShare => "%",
            Self::HeatPumpJaz => "",
        }
    }
}

impl fmt::Display for RankingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for category identifiers that are not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRankingCategory(pub String);

impl fmt::Display for UnknownRankingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ranking category '{}'", self.0)
    }
}

impl std::error::Error for UnknownRankingCategory {}

impl FromStr for RankingCategory {
    type Err = UnknownRankingCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "specific_yield" | "spez_ertrag" => Ok(Self::SpecificYield),
            "self_sufficiency" | "autarkie" => Ok(Self::SelfSufficiency),
            "storage_efficiency" | "speicher_wirkungsgrad" => Ok(Self::StorageEfficiency),
            "heat_pump_jaz" | "wp_jaz" => Ok(Self::HeatPumpJaz),
            "ev_pv_share" | "eauto_pv_anteil" => Ok(Self::EvPvShare),
            other => Err(UnknownRankingCategory(other.to_owned())),
        }
    }
}

/// Public ranking row, identified only by the opaque installation token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub id: InstallationId,
    pub value: f64,
    pub region: String,
    pub capacity_kwp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnRank {
    pub rank: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub category: RankingCategory,
    pub unit: String,
    pub period: MonthRange,
    /// Size of the ranked population
    pub total: usize,
    pub entries: Vec<RankingEntry>,
    /// Position of the requesting installation, independent of the top-N cut
    pub own: Option<OwnRank>,
}

// ============= Trend =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub horizon_months: u16,
    pub installations: Vec<TrendPoint>,
    pub avg_capacity_kwp: Vec<TrendPoint>,
    pub storage_share_pct: Vec<TrendPoint>,
    pub heat_pump_share_pct: Vec<TrendPoint>,
    pub ev_share_pct: Vec<TrendPoint>,
}

// ============= Degradation =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeYieldBucket {
    pub age_years: u8,
    pub installations: usize,
    pub avg_specific_yield: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationReport {
    pub buckets: Vec<AgeYieldBucket>,
    /// Yield loss per year of age in percent, `None` with fewer than three buckets
    pub degradation_pct_per_year: Option<f64>,
}

// ============= Component breakdowns =============

/// Battery size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    /// 5-10 kWh
    Small,
    /// 10-15 kWh
    Medium,
    /// more than 15 kWh
    Large,
}

impl StorageClass {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    #[must_use]
    pub fn of(capacity_kwh: f64) -> Option<Self> {
        if (5.0..10.0).contains(&capacity_kwh) {
            Some(Self::Small)
        } else if (10.0..15.0).contains(&capacity_kwh) {
            Some(Self::Medium)
        } else if capacity_kwh >= 15.0 {
            Some(Self::Large)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "5-10 kWh",
            Self::Medium => "10-15 kWh",
            Self::Large => ">15 kWh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageClassStatistics {
    pub class: StorageClass,
    pub label: String,
    pub installations: usize,
    pub avg_efficiency_pct: Option<f64>,
    pub avg_cycles_per_year: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPumpRegionStatistics {
    pub region: String,
    /// Heat pump installations in the region, with or without readings
    pub installations: usize,
    pub avg_jaz: Option<f64>,
}

/// Driving intensity by monthly distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvUsageClass {
    /// below 500 km per month
    Low,
    /// 500 to below 1000 km per month
    Medium,
    /// 1000 km per month and more
    High,
}

impl EvUsageClass {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub fn of(km_per_month: f64) -> Self {
        if km_per_month < 500.0 {
            Self::Low
        } else if km_per_month < 1000.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "<500 km/month",
            Self::Medium => "500-1000 km/month",
            Self::High => ">=1000 km/month",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvUsageStatistics {
    pub usage: EvUsageClass,
    pub label: String,
    pub installations: usize,
    pub avg_pv_share_pct: Option<f64>,
    pub avg_consumption_per_100km: Option<f64>,
}
