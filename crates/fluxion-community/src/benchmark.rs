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

//! Installation benchmark and what-if comparison.
//!
//! The benchmark places one installation within the community and its region
//! for a resolved period. Every specific yield goes through the canonical
//! estimator restricted to that period, so own value, averages and ranks are
//! always computed the same way.

use chrono::{Datelike, NaiveDate};
use fluxion_community_types::{
    BalconyPvBenchmark, BenchmarkSummary, ComparisonReport, ComparisonResult, EvBenchmark,
    ExtendedBenchmark, HeatPumpBenchmark, Installation, InstallationBenchmark, InstallationId,
    InstallationView, KpiComparison, MonthRange, MonthView, MonthlyRecord, PvBenchmark,
    StorageBenchmark, WallboxBenchmark, region_code,
};
use tracing::debug;

use crate::components::{
    BalconyPvKpis, EvKpis, HeatPumpKpis, StorageKpis, WallboxKpis, balcony_pv_kpis, ev_kpis,
    heat_pump_kpis, pv_kpis, storage_kpis, wallbox_kpis,
};
use crate::error::{CommunityError, Result};
use crate::math::{mean, ratio, round_to};
use crate::period::{PeriodRequest, resolve_period};
use crate::population::{average_by, average_specific_yield};
use crate::ranking::{rank_by, rank_of};
use crate::source::Snapshot;
use crate::yield_estimate::known_specific_yield;

/// Relative capacity band of the what-if comparison (±20 %)
pub const CAPACITY_TOLERANCE: f64 = 0.2;

pub const NO_COMPARABLE_MESSAGE: &str = "No comparable installations found";

/// Compares one installation's KPI values against the community
struct KpiContext<'a> {
    snapshot: &'a Snapshot,
    id: &'a InstallationId,
}

impl KpiContext<'_> {
    /// Own value next to the community average, optionally with rank
    fn compare<F>(&self, value: f64, decimals: i32, ranked: bool, kpi: F) -> KpiComparison
    where
        F: Fn(&Installation, &[MonthlyRecord]) -> Option<f64>,
    {
        let community_avg =
            average_by(self.snapshot.entries(), &kpi).map(|avg| round_to(avg.value, decimals));
        let (rank, of) = if ranked {
            let ordered = rank_by(self.snapshot.entries(), &kpi);
            (rank_of(&ordered, self.id), Some(ordered.len()))
        } else {
            (None, None)
        };

        KpiComparison {
            value: round_to(value, decimals),
            community_avg,
            rank,
            of,
        }
    }

    fn compare_opt<F>(
        &self,
        value: Option<f64>,
        decimals: i32,
        ranked: bool,
        kpi: F,
    ) -> Option<KpiComparison>
    where
        F: Fn(&Installation, &[MonthlyRecord]) -> Option<f64>,
    {
        value.map(|value| self.compare(value, decimals, ranked, kpi))
    }
}

fn storage_of(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<StorageKpis> {
    installation
        .storage_capacity()
        .and_then(|capacity| storage_kpis(Some(capacity), records, range))
}

fn heat_pump_of(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<HeatPumpKpis> {
    installation
        .equipment
        .heat_pump
        .then(|| heat_pump_kpis(records, range))
        .flatten()
}

fn ev_of(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<EvKpis> {
    installation.equipment.ev.then(|| ev_kpis(records, range)).flatten()
}

fn wallbox_of(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<WallboxKpis> {
    installation
        .equipment
        .wallbox
        .then(|| wallbox_kpis(records, range))
        .flatten()
}

fn balcony_pv_of(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<BalconyPvKpis> {
    installation
        .equipment
        .balcony_pv
        .then(|| balcony_pv_kpis(installation.balcony_pv_wp, records, range))
        .flatten()
}

fn extended_benchmark(
    ctx: &KpiContext<'_>,
    installation: &Installation,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> ExtendedBenchmark {
    let own_pv = pv_kpis(records, range);

    let pv = PvBenchmark {
        specific_yield: ctx.compare_opt(
            known_specific_yield(installation, records, Some(range)),
            0,
            true,
            |i, r| known_specific_yield(i, r, Some(range)),
        ),
        self_consumption_pct: ctx.compare_opt(own_pv.self_consumption_pct, 1, true, |_, r| {
            pv_kpis(r, range).self_consumption_pct
        }),
        self_sufficiency_pct: ctx.compare_opt(own_pv.self_sufficiency_pct, 1, true, |_, r| {
            pv_kpis(r, range).self_sufficiency_pct
        }),
    };

    let storage = installation.storage_capacity().map(|capacity| {
        let own = storage_of(installation, records, range);
        StorageBenchmark {
            capacity_kwh: ctx.compare(capacity, 1, false, |i, _| i.storage_capacity()),
            cycles_per_year: ctx.compare_opt(own.and_then(|k| k.cycles_per_year), 0, true, |i, r| {
                storage_of(i, r, range).and_then(|k| k.cycles_per_year)
            }),
            efficiency_pct: ctx.compare_opt(own.and_then(|k| k.efficiency_pct), 1, true, |i, r| {
                storage_of(i, r, range).and_then(|k| k.efficiency_pct)
            }),
            grid_share_pct: ctx.compare_opt(own.and_then(|k| k.grid_share_pct), 1, false, |i, r| {
                storage_of(i, r, range).and_then(|k| k.grid_share_pct)
            }),
        }
    });

    let heat_pump = heat_pump_of(installation, records, range).map(|own| HeatPumpBenchmark {
        jaz: ctx.compare(own.jaz, 2, true, |i, r| heat_pump_of(i, r, range).map(|k| k.jaz)),
        electricity_kwh: ctx.compare(own.electricity_kwh, 0, false, |i, r| {
            heat_pump_of(i, r, range).map(|k| k.electricity_kwh)
        }),
        heat_kwh: ctx.compare(own.heat_kwh, 0, false, |i, r| {
            heat_pump_of(i, r, range).map(|k| k.heat_kwh)
        }),
    });

    let ev = ev_of(installation, records, range).map(|own| EvBenchmark {
        charge_total_kwh: ctx.compare(own.totals.charge_total_kwh, 0, false, |i, r| {
            ev_of(i, r, range).map(|k| k.totals.charge_total_kwh)
        }),
        pv_share_pct: ctx.compare_opt(own.pv_share_pct, 1, true, |i, r| {
            ev_of(i, r, range).and_then(|k| k.pv_share_pct)
        }),
        distance_km: ctx.compare_opt(own.totals.distance_km, 0, false, |i, r| {
            ev_of(i, r, range).and_then(|k| k.totals.distance_km)
        }),
        consumption_per_100km: ctx.compare_opt(own.consumption_per_100km, 1, false, |i, r| {
            ev_of(i, r, range).and_then(|k| k.consumption_per_100km)
        }),
        v2h_kwh: ctx.compare_opt(own.totals.v2h_kwh, 0, false, |i, r| {
            ev_of(i, r, range).and_then(|k| k.totals.v2h_kwh)
        }),
    });

    let wallbox = wallbox_of(installation, records, range).map(|own| WallboxBenchmark {
        charge_kwh: ctx.compare(own.charge_kwh, 0, false, |i, r| {
            wallbox_of(i, r, range).map(|k| k.charge_kwh)
        }),
        pv_share_pct: ctx.compare_opt(own.pv_share_pct, 1, true, |i, r| {
            wallbox_of(i, r, range).and_then(|k| k.pv_share_pct)
        }),
        sessions: ctx.compare_opt(own.sessions.map(f64::from), 0, false, |i, r| {
            wallbox_of(i, r, range).and_then(|k| k.sessions.map(f64::from))
        }),
    });

    let balcony_pv = balcony_pv_of(installation, records, range).map(|own| BalconyPvBenchmark {
        generation_kwh: ctx.compare(own.generation_kwh, 0, false, |i, r| {
            balcony_pv_of(i, r, range).map(|k| k.generation_kwh)
        }),
        specific_yield: ctx.compare_opt(own.specific_yield, 0, true, |i, r| {
            balcony_pv_of(i, r, range).and_then(|k| k.specific_yield)
        }),
        self_consumption_pct: ctx.compare_opt(own.self_consumption_pct, 1, false, |i, r| {
            balcony_pv_of(i, r, range).and_then(|k| k.self_consumption_pct)
        }),
    });

    ExtendedBenchmark {
        pv,
        storage,
        heat_pump,
        ev,
        wallbox,
        balcony_pv,
    }
}

fn installation_view(installation: &Installation, records: &[MonthlyRecord]) -> InstallationView {
    InstallationView {
        id: installation.id.clone(),
        region: installation.region.clone(),
        capacity_kwp: installation.capacity_kwp,
        orientation: installation.orientation,
        tilt_deg: installation.tilt_deg,
        storage_kwh: installation.storage_kwh,
        install_year: installation.install_year,
        equipment: installation.equipment,
        months: records
            .iter()
            .rev()
            .map(|record| MonthView {
                period: record.period(),
                yield_kwh: record.yield_kwh,
                specific_yield: ratio(record.yield_kwh, installation.capacity_kwp)
                    .filter(|_| installation.has_capacity())
                    .map_or(0.0, |value| round_to(value, 1)),
                self_sufficiency_pct: record.self_sufficiency_pct,
                self_consumption_pct: record.self_consumption_pct,
            })
            .collect(),
    }
}

/// Benchmark an installation against the community and its region.
///
/// Fails only when the identity token is unknown.
pub fn installation_benchmark(
    snapshot: &Snapshot,
    id: &InstallationId,
    request: PeriodRequest,
    today: NaiveDate,
) -> Result<InstallationBenchmark> {
    let installation = snapshot
        .installation(id)
        .ok_or_else(|| CommunityError::InstallationNotFound(id.to_string()))?;
    let records = snapshot.records(id);
    let period = resolve_period(request, Some(installation.install_year), today);
    let range = period.range;

    let yield_kpi =
        |i: &Installation, r: &[MonthlyRecord]| known_specific_yield(i, r, Some(range));
    let overall = rank_by(snapshot.entries(), yield_kpi);
    let region = installation.region.as_str();
    let regional = rank_by(snapshot.entries_in(Some(region)), yield_kpi);

    let benchmark = BenchmarkSummary {
        own_specific_yield: known_specific_yield(installation, records, Some(range))
            .map(|value| round_to(value, 0)),
        community_specific_yield: average_specific_yield(snapshot, None, Some(range))
            .map(|avg| round_to(avg.value, 0)),
        region_specific_yield: average_specific_yield(snapshot, Some(region), Some(range))
            .map(|avg| round_to(avg.value, 0)),
        rank_overall: rank_of(&overall, id),
        installations_overall: overall.len(),
        rank_region: rank_of(&regional, id),
        installations_region: regional.len(),
    };

    debug!(
        installation = %id,
        period = %period.range,
        rank = ?benchmark.rank_overall,
        of = benchmark.installations_overall,
        "Computed installation benchmark"
    );

    let ctx = KpiContext { snapshot, id };
    Ok(InstallationBenchmark {
        installation: installation_view(installation, records),
        extended: extended_benchmark(&ctx, installation, records, range),
        benchmark,
        period,
    })
}

/// Expected yield of a hypothetical installation from similar real ones.
///
/// Similar means within ±20 % of the capacity. The target year defaults to
/// the previous calendar year. An empty population is reported as
/// [`ComparisonReport::NoComparableData`].
#[must_use]
pub fn what_if_comparison(
    snapshot: &Snapshot,
    capacity_kwp: f64,
    region: &str,
    year: Option<i32>,
    today: NaiveDate,
) -> ComparisonReport {
    let region = region_code(region);
    let year = year.unwrap_or(today.year() - 1);
    let range = MonthRange::calendar_year(year);
    let lower = capacity_kwp * (1.0 - CAPACITY_TOLERANCE);
    let upper = capacity_kwp * (1.0 + CAPACITY_TOLERANCE);

    let similar: Vec<(&Installation, f64)> = snapshot
        .entries()
        .filter(|(installation, _)| {
            installation.has_capacity()
                && installation.capacity_kwp >= lower
                && installation.capacity_kwp <= upper
        })
        .filter_map(|(installation, records)| {
            known_specific_yield(installation, records, Some(range))
                .map(|value| (installation, value))
        })
        .collect();

    let all: Vec<f64> = similar.iter().map(|(_, value)| *value).collect();
    let Some(community) = mean(&all) else {
        debug!(capacity_kwp, region = %region, year, "No comparable installations");
        return ComparisonReport::NoComparableData {
            message: NO_COMPARABLE_MESSAGE.to_owned(),
        };
    };
    let in_region: Vec<f64> = similar
        .iter()
        .filter(|(installation, _)| installation.region == region)
        .map(|(_, value)| *value)
        .collect();

    ComparisonReport::Found(ComparisonResult {
        capacity_kwp,
        year,
        comparable_installations: similar.len(),
        comparable_installations_region: in_region.len(),
        community_specific_yield: round_to(community, 0),
        region_specific_yield: mean(&in_region).map(|avg| round_to(avg, 0)),
        expected_annual_yield_kwh: round_to(capacity_kwp * community, 0),
        region,
    })
}
