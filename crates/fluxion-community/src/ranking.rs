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

//! Ranking of the population by a KPI.
//!
//! Ranks are positional: equal values get consecutive ranks in the order the
//! data source lists the installations.

use fluxion_community_types::{
    Installation, InstallationId, MonthRange, MonthlyRecord, OwnRank, RankingCategory,
    RankingEntry, RankingReport,
};

use crate::components::{ev_kpis, heat_pump_kpis, pv_kpis, storage_kpis};
use crate::math::round_to;
use crate::population::kpi_values;
use crate::source::Snapshot;
use crate::yield_estimate::known_specific_yield;

/// Value of a ranking KPI for one installation, `None` if ineligible or without data
#[must_use]
pub fn category_value(
    category: RankingCategory,
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<f64> {
    match category {
        RankingCategory::SpecificYield => known_specific_yield(installation, records, Some(range)),
        RankingCategory::SelfSufficiency => pv_kpis(records, range).self_sufficiency_pct,
        RankingCategory::StorageEfficiency => installation
            .storage_capacity()
            .and_then(|capacity| storage_kpis(Some(capacity), records, range))
            .and_then(|kpis| kpis.efficiency_pct),
        RankingCategory::HeatPumpJaz => installation
            .equipment
            .heat_pump
            .then(|| heat_pump_kpis(records, range))
            .flatten()
            .map(|kpis| kpis.jaz),
        RankingCategory::EvPvShare => installation
            .equipment
            .ev
            .then(|| ev_kpis(records, range))
            .flatten()
            .and_then(|kpis| kpis.pv_share_pct),
    }
}

/// Evaluate `kpi` over the given installations and order best first.
/// The sort is stable, so ties keep source order.
pub fn rank_by<'a, F>(
    entries: impl Iterator<Item = (&'a Installation, &'a [MonthlyRecord])>,
    kpi: F,
) -> Vec<(&'a Installation, f64)>
where
    F: Fn(&Installation, &[MonthlyRecord]) -> Option<f64>,
{
    let mut ranked = kpi_values(entries, kpi);
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// 1-based position of `id` in a list ordered by [`rank_by`]
#[must_use]
pub fn rank_of(ranked: &[(&Installation, f64)], id: &InstallationId) -> Option<usize> {
    ranked
        .iter()
        .position(|(installation, _)| &installation.id == id)
        .map(|index| index + 1)
}

/// Decimal places used when a category value is reported
#[must_use]
pub const fn category_decimals(category: RankingCategory) -> i32 {
    match category {
        RankingCategory::SpecificYield => 0,
        RankingCategory::SelfSufficiency
        | RankingCategory::StorageEfficiency
        | RankingCategory::EvPvShare => 1,
        RankingCategory::HeatPumpJaz => 2,
    }
}

/// Installations ordered by a KPI, best first
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    pub category: RankingCategory,
    ranked: Vec<(&'a Installation, f64)>,
}

impl<'a> Ranking<'a> {
    #[must_use]
    pub fn compute(
        snapshot: &'a Snapshot,
        category: RankingCategory,
        range: MonthRange,
        region: Option<&'a str>,
    ) -> Self {
        let ranked = rank_by(snapshot.entries_in(region), |installation, records| {
            category_value(category, installation, records, range)
        });
        Self { category, ranked }
    }

    /// Size of the ranked population
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// 1-based rank and value of an installation
    #[must_use]
    pub fn position_of(&self, id: &InstallationId) -> Option<OwnRank> {
        let rank = rank_of(&self.ranked, id)?;
        self.ranked.get(rank - 1).map(|(_, value)| OwnRank {
            rank,
            value: *value,
        })
    }

    /// Unrounded values, best first
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.ranked.iter().map(|(_, value)| *value)
    }

    #[must_use]
    pub fn top(&self, limit: usize) -> Vec<RankingEntry> {
        let decimals = category_decimals(self.category);
        self.ranked
            .iter()
            .take(limit)
            .enumerate()
            .map(|(index, (installation, value))| RankingEntry {
                rank: index + 1,
                id: installation.id.clone(),
                value: round_to(*value, decimals),
                region: installation.region.clone(),
                capacity_kwp: installation.capacity_kwp,
            })
            .collect()
    }
}

/// Top-N list plus the position of `own` when given.
/// The own position is reported even when it lies outside the top N.
#[must_use]
pub fn ranking_report(
    snapshot: &Snapshot,
    category: RankingCategory,
    range: MonthRange,
    limit: usize,
    own: Option<&InstallationId>,
) -> RankingReport {
    let ranking = Ranking::compute(snapshot, category, range, None);
    let decimals = category_decimals(category);

    RankingReport {
        category,
        unit: category.unit().to_owned(),
        period: range,
        total: ranking.len(),
        entries: ranking.top(limit),
        own: own
            .and_then(|id| ranking.position_of(id))
            .map(|position| OwnRank {
                rank: position.rank,
                value: round_to(position.value, decimals),
            }),
    }
}
