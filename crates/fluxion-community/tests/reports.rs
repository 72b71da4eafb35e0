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

mod common;

use fluxion_community::period::trailing_twelve_months;
use fluxion_community::{
    CommunityEngine, DataSource, PeriodRequest, RecordQuery, Snapshot, known_specific_yield,
};
use fluxion_community_types::{
    ComparisonReport, Installation, InstallationId, MonthlyRecord, YearMonth,
};

use common::{community, today};

fn engine() -> CommunityEngine<Snapshot> {
    CommunityEngine::new(community())
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Only the required methods, so snapshots go through the default
/// per-installation fetch
struct PlainSource(Snapshot);

impl DataSource for PlainSource {
    fn list_installations(&self, region: Option<&str>) -> anyhow::Result<Vec<Installation>> {
        self.0.list_installations(region)
    }

    fn list_monthly_records(
        &self,
        id: &InstallationId,
        query: &RecordQuery,
    ) -> anyhow::Result<Vec<MonthlyRecord>> {
        self.0.list_monthly_records(id, query)
    }

    fn distinct_months(&self) -> anyhow::Result<Vec<YearMonth>> {
        self.0.distinct_months()
    }
}

#[test]
fn test_canonical_yield_estimates() {
    let snapshot = community();
    let range = Some(trailing_twelve_months(today()));
    let estimate = |id: &str| {
        let id = InstallationId::from(id);
        let installation = snapshot.installation(&id).unwrap();
        known_specific_yield(installation, snapshot.records(&id), range)
    };

    // twelve months, 9600 kWh at 8 kWp
    assert_close(estimate("alpha").unwrap(), 1200.0);
    // five months are not extrapolated
    assert_close(estimate("bravo").unwrap(), 600.0);
    // six months are scaled to a full year
    assert_close(estimate("charlie").unwrap(), 1000.0);
    assert!(estimate("delta").is_none());
}

#[test]
fn test_ranking_by_specific_yield() {
    let report = engine()
        .ranking(
            "specific_yield",
            PeriodRequest::default(),
            2,
            Some("bravo"),
            today(),
        )
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].region, "BY");
    assert_close(report.entries[0].value, 1200.0);
    assert_eq!(report.entries[1].region, "NW");
    let own = report.own.unwrap();
    assert_eq!(own.rank, 3);
    assert_close(own.value, 600.0);
}

#[test]
fn test_benchmark_against_community_and_region() {
    let result = engine()
        .benchmark("bravo", PeriodRequest::default(), today())
        .unwrap();
    let summary = &result.benchmark;

    assert_eq!(summary.own_specific_yield, Some(600.0));
    // (1200 + 600 + 1000) / 3
    assert_eq!(summary.community_specific_yield, Some(933.0));
    assert_eq!(summary.region_specific_yield, Some(900.0));
    assert_eq!(summary.rank_overall, Some(3));
    assert_eq!(summary.installations_overall, 3);
    assert_eq!(summary.rank_region, Some(2));
    assert_eq!(summary.installations_region, 2);
    assert!(result.extended.storage.is_none());
    assert_eq!(result.installation.months.len(), 5);
    assert_eq!(result.installation.months[0].period, YearMonth::new(2024, 5).unwrap());
}

#[test]
fn test_extended_benchmark_components() {
    let result = engine()
        .benchmark("alpha", PeriodRequest::default(), today())
        .unwrap();

    let storage = result.extended.storage.unwrap();
    let efficiency = storage.efficiency_pct.unwrap();
    assert_close(efficiency.value, 90.0);
    assert_eq!(efficiency.rank, Some(1));
    assert_close(storage.cycles_per_year.unwrap().value, 108.0);
    assert_close(storage.grid_share_pct.unwrap().value, 10.0);

    let heat_pump = result.extended.heat_pump.unwrap();
    assert_close(heat_pump.jaz.value, 3.5);
    assert!(result.extended.ev.is_none());

    let sufficiency = result.extended.pv.self_sufficiency_pct.unwrap();
    assert_close(sufficiency.value, 70.0);
    assert_eq!(sufficiency.community_avg, Some(60.0));
    assert_eq!(sufficiency.rank, Some(1));
}

#[test]
fn test_what_if_comparison() {
    let engine = engine();
    let ComparisonReport::Found(result) = engine.compare(8.0, "BY", None, today()).unwrap() else {
        panic!("expected comparable installations");
    };
    assert_eq!(result.year, 2024);
    assert_eq!(result.comparable_installations, 1);
    assert_eq!(result.comparable_installations_region, 1);
    assert_close(result.community_specific_yield, 1200.0);
    assert_eq!(result.region_specific_yield, Some(1200.0));
    assert_close(result.expected_annual_yield_kwh, 9600.0);

    let lower = engine.compare(8.0, "by", None, today()).unwrap();
    assert_eq!(lower, ComparisonReport::Found(result));

    let nothing = engine.compare(50.0, "BY", None, today()).unwrap();
    assert!(matches!(nothing, ComparisonReport::NoComparableData { .. }));
}

#[test]
fn test_capacity_distribution() {
    let result = engine()
        .distribution("capacity", PeriodRequest::default(), today())
        .unwrap();
    let counts: Vec<usize> = result.bins.iter().map(|bin| bin.count).collect();

    // 4, 5, 8 and 10 kWp
    assert_eq!(counts[..4], [1, 1, 1, 1]);
    assert_eq!(result.summary.count, 4);
    assert_close(result.summary.min, 4.0);
    assert_close(result.summary.max, 10.0);
    assert_close(result.summary.median, 6.5);
}

#[test]
fn test_global_statistics() {
    let stats = engine().global_statistics(today()).unwrap();

    assert_eq!(stats.installations, 4);
    assert_eq!(stats.regions, 2);
    assert_eq!(stats.averages.specific_yield, Some(933.0));
    assert_eq!(stats.averages.storage_kwh, Some(10.0));
    assert_eq!(stats.averages.self_sufficiency_pct, Some(63.3));
    assert_close(stats.equipment.storage_pct, 25.0);
    assert_close(stats.equipment.heat_pump_pct, 25.0);
    assert_eq!(stats.typical.tilt_deg, 30);
}

#[test]
fn test_breakdowns() {
    let engine = engine();
    let classes = engine
        .storage_classes(PeriodRequest::default(), today())
        .unwrap();
    assert_eq!(classes[1].installations, 1);
    assert_eq!(classes[1].avg_efficiency_pct, Some(90.0));
    assert_eq!(classes[1].avg_cycles_per_year, Some(108.0));

    let regions = engine
        .heat_pump_regions(PeriodRequest::default(), today())
        .unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].region, "BY");

    let usage = engine.ev_usage(PeriodRequest::default(), today()).unwrap();
    assert!(usage.iter().all(|row| row.installations == 0));
}

#[test]
fn test_default_fetch_matches_batched_snapshot() {
    let batched = Snapshot::load(&community()).unwrap();
    let plain = Snapshot::load(&PlainSource(community())).unwrap();

    assert_eq!(batched.record_count(), plain.record_count());
    let via_plain = CommunityEngine::new(PlainSource(community()))
        .ranking("autarkie", PeriodRequest::default(), 10, None, today())
        .unwrap();
    let via_batched = engine()
        .ranking("autarkie", PeriodRequest::default(), 10, None, today())
        .unwrap();
    assert_eq!(via_plain, via_batched);
}

#[test]
fn test_reports_are_byte_identical_across_runs() {
    let render = || {
        let engine = engine();
        let request = PeriodRequest::default();
        [
            serde_json::to_string(&engine.benchmark("alpha", request, today()).unwrap()),
            serde_json::to_string(&engine.global_statistics(today()).unwrap()),
            serde_json::to_string(&engine.overview(today()).unwrap()),
            serde_json::to_string(&engine.distribution("kwp", request, today()).unwrap()),
            serde_json::to_string(&engine.trend(24, today()).unwrap()),
            serde_json::to_string(&engine.degradation(today()).unwrap()),
            serde_json::to_string(
                &engine
                    .ranking("specific_yield", request, 10, None, today())
                    .unwrap(),
            ),
        ]
        .map(Result::unwrap)
    };

    assert_eq!(render(), render());
}
