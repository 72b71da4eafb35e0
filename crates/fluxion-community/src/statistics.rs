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

//! Community wide, regional and monthly statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use fluxion_community_types::{
    EquipmentShares, GlobalAverages, GlobalStatistics, Installation, MonthRange, MonthStatistics,
    MonthlyAverage, MonthlyRecord, Orientation, OverviewStatistics, RegionCount,
    RegionStatistics, TypicalInstallation, YearMonth, region_code,
};

use crate::components::pv_kpis;
use crate::math::{mean, median, ratio, round_to, share_pct};
use crate::period::trailing_twelve_months;
use crate::population::average_specific_yield;
use crate::source::Snapshot;

/// Upper bound for month based listings
pub const MAX_MONTHS: usize = 60;

const DEFAULT_TILT_DEG: u8 = 30;

fn equipment_shares<'a>(installations: impl Iterator<Item = &'a Installation>) -> EquipmentShares {
    let mut total = 0;
    let mut storage = 0;
    let mut heat_pump = 0;
    let mut ev = 0;
    let mut wallbox = 0;
    let mut balcony_pv = 0;

    for installation in installations {
        total += 1;
        storage += usize::from(installation.has_storage());
        heat_pump += usize::from(installation.equipment.heat_pump);
        ev += usize::from(installation.equipment.ev);
        wallbox += usize::from(installation.equipment.wallbox);
        balcony_pv += usize::from(installation.equipment.balcony_pv);
    }

    EquipmentShares {
        storage_pct: share_pct(storage, total, 1),
        heat_pump_pct: share_pct(heat_pump, total, 1),
        ev_pct: share_pct(ev, total, 1),
        wallbox_pct: share_pct(wallbox, total, 1),
        balcony_pv_pct: share_pct(balcony_pv, total, 1),
    }
}

fn average_capacity<'a>(installations: impl Iterator<Item = &'a Installation>) -> f64 {
    let values: Vec<f64> = installations.map(|i| i.capacity_kwp).collect();
    mean(&values).map_or(0.0, |avg| round_to(avg, 1))
}

fn average_storage<'a>(installations: impl Iterator<Item = &'a Installation>) -> Option<f64> {
    let values: Vec<f64> = installations.filter_map(Installation::storage_capacity).collect();
    mean(&values).map(|avg| round_to(avg, 1))
}

/// Most common orientation; ties go to the earlier variant
fn most_common_orientation(installations: &[Installation]) -> Orientation {
    let mut best = (Orientation::default(), 0);
    for orientation in Orientation::ALL {
        let count = installations
            .iter()
            .filter(|i| i.orientation == orientation)
            .count();
        if count > best.1 {
            best = (orientation, count);
        }
    }
    best.0
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "median of u8 values stays within u8"
)]
fn median_tilt(installations: &[Installation]) -> u8 {
    let tilts: Vec<f64> = installations
        .iter()
        .map(|i| f64::from(i.tilt_deg))
        .collect();
    median(&tilts).map_or(DEFAULT_TILT_DEG, |m| m.round() as u8)
}

/// Headline figures of the whole community
#[must_use]
pub fn global_statistics(snapshot: &Snapshot, today: NaiveDate) -> GlobalStatistics {
    let installations = snapshot.installations();
    let window = trailing_twelve_months(today);
    let regions: BTreeSet<&str> = installations.iter().map(|i| i.region.as_str()).collect();

    let mut sufficiency = Vec::new();
    let mut consumption = Vec::new();
    for (_, records) in snapshot.entries() {
        for record in records.iter().filter(|r| window.contains(r.period())) {
            sufficiency.extend(record.self_sufficiency_pct);
            consumption.extend(record.self_consumption_pct);
        }
    }

    GlobalStatistics {
        installations: installations.len(),
        regions: regions.len(),
        averages: GlobalAverages {
            capacity_kwp: average_capacity(installations.iter()),
            storage_kwh: average_storage(installations.iter()),
            specific_yield: average_specific_yield(snapshot, None, Some(window))
                .map(|avg| round_to(avg.value, 0)),
            self_sufficiency_pct: mean(&sufficiency).map(|avg| round_to(avg, 1)),
            self_consumption_pct: mean(&consumption).map(|avg| round_to(avg, 1)),
        },
        equipment: equipment_shares(installations.iter()),
        typical: TypicalInstallation {
            capacity_kwp: average_capacity(installations.iter()),
            orientation: most_common_orientation(installations),
            tilt_deg: median_tilt(installations),
            storage_kwh: average_storage(installations.iter()),
        },
        as_of: today,
    }
}

/// Statistics of a single region; an unknown region yields an empty row.
/// The code is matched case-insensitively.
#[must_use]
pub fn region_statistics(snapshot: &Snapshot, region: &str, range: MonthRange) -> RegionStatistics {
    let code = region_code(region);
    let region = code.as_str();
    let members: Vec<(&Installation, &[MonthlyRecord])> =
        snapshot.entries_in(Some(region)).collect();
    if members.is_empty() {
        return RegionStatistics::empty(region);
    }

    let sufficiency: Vec<f64> = members
        .iter()
        .filter_map(|(_, records)| pv_kpis(records, range).self_sufficiency_pct)
        .collect();

    RegionStatistics {
        region: region.to_owned(),
        installations: members.len(),
        avg_capacity_kwp: average_capacity(members.iter().map(|(i, _)| *i)),
        avg_specific_yield: average_specific_yield(snapshot, Some(region), Some(range))
            .map(|avg| round_to(avg.value, 0)),
        avg_self_sufficiency_pct: mean(&sufficiency).map(|avg| round_to(avg, 1)),
        equipment: equipment_shares(members.iter().map(|(i, _)| *i)),
    }
}

/// One row per region, most installations first
#[must_use]
pub fn regional_table(snapshot: &Snapshot, range: MonthRange) -> Vec<RegionStatistics> {
    let regions: BTreeSet<&str> = snapshot
        .installations()
        .iter()
        .map(|i| i.region.as_str())
        .collect();
    let mut rows: Vec<RegionStatistics> = regions
        .into_iter()
        .map(|region| region_statistics(snapshot, region, range))
        .collect();
    rows.sort_by(|a, b| b.installations.cmp(&a.installations));
    rows
}

/// Installation count per region, most installations first
#[must_use]
pub fn region_counts(snapshot: &Snapshot) -> Vec<RegionCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for installation in snapshot.installations() {
        *counts.entry(installation.region.as_str()).or_default() += 1;
    }
    let mut rows: Vec<RegionCount> = counts
        .into_iter()
        .map(|(region, installations)| RegionCount {
            region: region.to_owned(),
            installations,
        })
        .collect();
    rows.sort_by(|a, b| b.installations.cmp(&a.installations));
    rows
}

/// (yield, capacity) of every installation with positive capacity reporting `month`
fn month_yields(snapshot: &Snapshot, month: YearMonth) -> Vec<(f64, f64)> {
    snapshot
        .entries()
        .filter(|(installation, _)| installation.has_capacity())
        .filter_map(|(installation, records)| {
            records
                .iter()
                .find(|record| record.period() == month)
                .map(|record| (record.yield_kwh, installation.capacity_kwp))
        })
        .collect()
}

/// Community figures of one calendar month
#[must_use]
pub fn month_statistics(snapshot: &Snapshot, month: YearMonth) -> MonthStatistics {
    let yields = month_yields(snapshot, month);
    if yields.is_empty() {
        return MonthStatistics::empty(month);
    }

    let energy: Vec<f64> = yields.iter().map(|(kwh, _)| *kwh).collect();
    let specific: Vec<f64> = yields.iter().map(|(kwh, kwp)| kwh / kwp).collect();
    let total_kwh: f64 = energy.iter().sum();
    let total_kwp: f64 = yields.iter().map(|(_, kwp)| kwp).sum();
    let min = specific.iter().copied().fold(f64::INFINITY, f64::min);
    let max = specific.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    MonthStatistics {
        period: month,
        installations: yields.len(),
        avg_yield_kwh: mean(&energy).map_or(0.0, |avg| round_to(avg, 1)),
        avg_specific_yield: ratio(total_kwh, total_kwp).map_or(0.0, |avg| round_to(avg, 1)),
        median_specific_yield: median(&specific).map_or(0.0, |m| round_to(m, 1)),
        min_specific_yield: round_to(min, 1),
        max_specific_yield: round_to(max, 1),
    }
}

/// Statistics of the `limit` most recent months with data, newest first
#[must_use]
pub fn monthly_statistics(snapshot: &Snapshot, limit: usize) -> Vec<MonthStatistics> {
    snapshot
        .months_desc()
        .into_iter()
        .take(limit.min(MAX_MONTHS))
        .map(|month| month_statistics(snapshot, month))
        .collect()
}

/// Mean per-installation specific yield of the `months` most recent months
/// with data, oldest first
#[must_use]
pub fn monthly_averages(snapshot: &Snapshot, months: usize) -> Vec<MonthlyAverage> {
    let mut selected: Vec<YearMonth> = snapshot
        .months_desc()
        .into_iter()
        .take(months.clamp(1, MAX_MONTHS))
        .collect();
    selected.reverse();

    selected
        .into_iter()
        .filter_map(|month| {
            let specific: Vec<f64> = month_yields(snapshot, month)
                .iter()
                .map(|(kwh, kwp)| kwh / kwp)
                .collect();
            mean(&specific).map(|avg| MonthlyAverage {
                period: month,
                installations: specific.len(),
                avg_specific_yield: round_to(avg, 1),
            })
        })
        .collect()
}

/// Compact overview: counts, averages, the regional table and the last
/// twelve months
#[must_use]
pub fn overview(snapshot: &Snapshot, today: NaiveDate) -> OverviewStatistics {
    let window = trailing_twelve_months(today);
    let installations = snapshot.installations();

    OverviewStatistics {
        installations: installations.len(),
        monthly_records: snapshot.record_count(),
        avg_capacity_kwp: average_capacity(installations.iter()),
        avg_storage_kwh: average_storage(installations.iter()),
        avg_specific_yield: average_specific_yield(snapshot, None, Some(window))
            .map(|avg| round_to(avg.value, 0)),
        regions: regional_table(snapshot, window),
        months: monthly_statistics(snapshot, 12),
    }
}
