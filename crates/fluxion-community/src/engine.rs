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

//! Request facade over a [`DataSource`].
//!
//! Each call loads one [`Snapshot`] and hands it to the pure report
//! functions, so a single report never mixes two states of the store.

use chrono::NaiveDate;
use fluxion_community_types::{
    ComparisonReport, DegradationReport, Distribution, EvUsageStatistics, GlobalStatistics,
    HeatPumpRegionStatistics, InstallationBenchmark, InstallationId, MonthStatistics,
    MonthlyAverage, OverviewStatistics, RankingCategory, RankingReport, RegionCount,
    RegionStatistics, StorageClassStatistics, TrendReport, YearMonth,
};
use tracing::{debug, info};

use crate::error::{CommunityError, Result};
use crate::period::{PeriodRequest, resolve_period, trailing_twelve_months};
use crate::source::{DataSource, Snapshot};
use crate::{benchmark, breakdown, degradation, distribution, ranking, statistics, trend};

/// Community reports backed by a data source
#[derive(Debug)]
pub struct CommunityEngine<D: DataSource> {
    source: D,
}

impl<D: DataSource> CommunityEngine<D> {
    pub fn new(source: D) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Load a consistent copy of the community data
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::load(&self.source)?)
    }

    pub fn benchmark(
        &self,
        token: &str,
        request: PeriodRequest,
        today: NaiveDate,
    ) -> Result<InstallationBenchmark> {
        let snapshot = self.snapshot()?;
        let id = InstallationId::new(token);
        let result = benchmark::installation_benchmark(&snapshot, &id, request, today);
        if let Err(CommunityError::InstallationNotFound(_)) = &result {
            info!(
                period = request.kind.as_str(),
                "Benchmark requested for unknown installation"
            );
        }
        result
    }

    /// What-if comparison for a hypothetical installation.
    ///
    /// A non-positive capacity is rejected; an empty population is not an
    /// error.
    pub fn compare(
        &self,
        capacity_kwp: f64,
        region: &str,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<ComparisonReport> {
        if !capacity_kwp.is_finite() || capacity_kwp <= 0.0 {
            return Err(CommunityError::InvalidParameter(format!(
                "capacity must be positive, got {capacity_kwp}"
            )));
        }
        let snapshot = self.snapshot()?;
        Ok(benchmark::what_if_comparison(
            &snapshot,
            capacity_kwp,
            region,
            year,
            today,
        ))
    }

    pub fn global_statistics(&self, today: NaiveDate) -> Result<GlobalStatistics> {
        let snapshot = self.snapshot()?;
        let stats = statistics::global_statistics(&snapshot, today);
        info!(
            installations = stats.installations,
            regions = stats.regions,
            "Computed global statistics"
        );
        Ok(stats)
    }

    pub fn overview(&self, today: NaiveDate) -> Result<OverviewStatistics> {
        Ok(statistics::overview(&self.snapshot()?, today))
    }

    /// Regional table over the trailing twelve months
    pub fn regional_table(&self, today: NaiveDate) -> Result<Vec<RegionStatistics>> {
        let snapshot = self.snapshot()?;
        Ok(statistics::regional_table(
            &snapshot,
            trailing_twelve_months(today),
        ))
    }

    pub fn region(&self, region: &str, today: NaiveDate) -> Result<RegionStatistics> {
        let snapshot = self.snapshot()?;
        Ok(statistics::region_statistics(
            &snapshot,
            region,
            trailing_twelve_months(today),
        ))
    }

    pub fn region_counts(&self) -> Result<Vec<RegionCount>> {
        Ok(statistics::region_counts(&self.snapshot()?))
    }

    pub fn monthly_statistics(&self, limit: usize) -> Result<Vec<MonthStatistics>> {
        Ok(statistics::monthly_statistics(&self.snapshot()?, limit))
    }

    pub fn month(&self, year: i32, month: u8) -> Result<MonthStatistics> {
        let period = YearMonth::new(year, month).ok_or_else(|| {
            CommunityError::InvalidParameter(format!("invalid month {year}-{month}"))
        })?;
        Ok(statistics::month_statistics(&self.snapshot()?, period))
    }

    pub fn monthly_averages(&self, months: usize) -> Result<Vec<MonthlyAverage>> {
        Ok(statistics::monthly_averages(&self.snapshot()?, months))
    }

    /// Histogram of a metric; unknown metric names give an empty result
    pub fn distribution(
        &self,
        metric: &str,
        request: PeriodRequest,
        today: NaiveDate,
    ) -> Result<Distribution> {
        let snapshot = self.snapshot()?;
        let period = resolve_period(request, None, today);
        let result = distribution::distribution(&snapshot, metric, period.range);
        debug!(metric, values = result.summary.count, "Computed distribution");
        Ok(result)
    }

    /// Top list of a category. Unknown category names are errors.
    pub fn ranking(
        &self,
        category: &str,
        request: PeriodRequest,
        limit: usize,
        own: Option<&str>,
        today: NaiveDate,
    ) -> Result<RankingReport> {
        let category: RankingCategory = category.parse()?;
        let snapshot = self.snapshot()?;
        let period = resolve_period(request, None, today);
        let own = own.map(InstallationId::new);
        let report =
            ranking::ranking_report(&snapshot, category, period.range, limit, own.as_ref());
        debug!(
            category = %category,
            total = report.total,
            own_rank = ?report.own.as_ref().map(|own| own.rank),
            "Computed ranking"
        );
        Ok(report)
    }

    pub fn trend(&self, horizon_months: u16, today: NaiveDate) -> Result<TrendReport> {
        Ok(trend::trend(&self.snapshot()?, horizon_months, today))
    }

    pub fn degradation(&self, today: NaiveDate) -> Result<DegradationReport> {
        Ok(degradation::degradation(&self.snapshot()?, today))
    }

    pub fn storage_classes(
        &self,
        request: PeriodRequest,
        today: NaiveDate,
    ) -> Result<Vec<StorageClassStatistics>> {
        let range = resolve_period(request, None, today).range;
        Ok(breakdown::storage_by_class(&self.snapshot()?, range))
    }

    pub fn heat_pump_regions(
        &self,
        request: PeriodRequest,
        today: NaiveDate,
    ) -> Result<Vec<HeatPumpRegionStatistics>> {
        let range = resolve_period(request, None, today).range;
        Ok(breakdown::heat_pump_by_region(&self.snapshot()?, range))
    }

    pub fn ev_usage(
        &self,
        request: PeriodRequest,
        today: NaiveDate,
    ) -> Result<Vec<EvUsageStatistics>> {
        let range = resolve_period(request, None, today).range;
        Ok(breakdown::ev_by_usage(&self.snapshot()?, range))
    }
}
