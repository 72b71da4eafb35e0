// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Component statistics grouped by size class, region and usage intensity.

use std::collections::BTreeMap;

use fluxion_community_types::{
    EvUsageClass, EvUsageStatistics, HeatPumpRegionStatistics, MonthRange, StorageClass,
    StorageClassStatistics,
};

use crate::components::{EvKpis, EvTotals, heat_pump_kpis, storage_kpis};
use crate::math::{mean, round_to};
use crate::source::Snapshot;

/// Cycle counts from fewer months are too noisy to report
pub const MIN_MONTHS_FOR_CYCLES: usize = 6;

/// Storage efficiency and cycles per battery size class
#[must_use]
pub fn storage_by_class(snapshot: &Snapshot, range: MonthRange) -> Vec<StorageClassStatistics> {
    let mut efficiency: BTreeMap<StorageClass, Vec<f64>> = BTreeMap::new();
    let mut cycles: BTreeMap<StorageClass, Vec<f64>> = BTreeMap::new();
    let mut counts: BTreeMap<StorageClass, usize> = BTreeMap::new();

    for (installation, records) in snapshot.entries() {
        let Some(capacity) = installation.storage_capacity() else {
            continue;
        };
        let Some(class) = StorageClass::of(capacity) else {
            continue;
        };
        *counts.entry(class).or_default() += 1;

        let Some(kpis) = storage_kpis(Some(capacity), records, range) else {
            continue;
        };
        if let Some(value) = kpis.efficiency_pct {
            efficiency.entry(class).or_default().push(value);
        }
        if kpis.months >= MIN_MONTHS_FOR_CYCLES && kpis.discharge_kwh > 0.0 {
            cycles
                .entry(class)
                .or_default()
                .extend(kpis.cycles_per_year);
        }
    }

    StorageClass::ALL
        .into_iter()
        .map(|class| StorageClassStatistics {
            class,
            label: class.label().to_owned(),
            installations: counts.get(&class).copied().unwrap_or_default(),
            avg_efficiency_pct: efficiency
                .get(&class)
                .and_then(|values| mean(values))
                .map(|avg| round_to(avg, 1)),
            avg_cycles_per_year: cycles
                .get(&class)
                .and_then(|values| mean(values))
                .map(|avg| round_to(avg, 0)),
        })
        .collect()
}

/// Average heat pump JAZ per region, most populated region first.
///
/// Every region with a heat pump installation is listed; the count includes
/// installations without readings, the average only those with a JAZ.
#[must_use]
pub fn heat_pump_by_region(
    snapshot: &Snapshot,
    range: MonthRange,
) -> Vec<HeatPumpRegionStatistics> {
    let mut by_region: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();

    for (installation, records) in snapshot.entries() {
        if !installation.equipment.heat_pump {
            continue;
        }
        let (count, values) = by_region.entry(installation.region.as_str()).or_default();
        *count += 1;
        if let Some(kpis) = heat_pump_kpis(records, range) {
            values.push(kpis.jaz);
        }
    }

    let mut rows: Vec<HeatPumpRegionStatistics> = by_region
        .into_iter()
        .map(|(region, (installations, values))| HeatPumpRegionStatistics {
            region: region.to_owned(),
            installations,
            avg_jaz: mean(&values).map(|avg| round_to(avg, 2)),
        })
        .collect();
    // stable, regions with equal counts stay alphabetical
    rows.sort_by(|a, b| b.installations.cmp(&a.installations));
    rows
}

/// EV PV share and consumption by monthly driving distance
#[must_use]
pub fn ev_by_usage(snapshot: &Snapshot, range: MonthRange) -> Vec<EvUsageStatistics> {
    let mut counts: BTreeMap<EvUsageClass, usize> = BTreeMap::new();
    let mut pv_share: BTreeMap<EvUsageClass, Vec<f64>> = BTreeMap::new();
    let mut consumption: BTreeMap<EvUsageClass, Vec<f64>> = BTreeMap::new();

    for (installation, records) in snapshot.entries() {
        if !installation.equipment.ev {
            continue;
        }
        let totals = EvTotals::collect(records, range);
        let Some(km_per_month) = totals.km_per_month() else {
            continue;
        };
        let class = EvUsageClass::of(km_per_month);
        *counts.entry(class).or_default() += 1;

        if let Some(kpis) = EvKpis::from_totals(totals) {
            pv_share
                .entry(class)
                .or_default()
                .extend(kpis.pv_share_pct);
            consumption
                .entry(class)
                .or_default()
                .extend(kpis.consumption_per_100km);
        }
    }

    EvUsageClass::ALL
        .into_iter()
        .map(|usage| EvUsageStatistics {
            usage,
            label: usage.label().to_owned(),
            installations: counts.get(&usage).copied().unwrap_or_default(),
            avg_pv_share_pct: pv_share
                .get(&usage)
                .and_then(|values| mean(values))
                .map(|avg| round_to(avg, 1)),
            avg_consumption_per_100km: consumption
                .get(&usage)
                .and_then(|values| mean(values))
                .map(|avg| round_to(avg, 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_community_types::{
        Equipment, EvReadings, HeatPumpReadings, Installation, InstallationId, MonthlyRecord,
        Orientation, StorageReadings, YearMonth,
    };

    fn ym(month: u8) -> YearMonth {
        YearMonth::new(2024, month).unwrap()
    }

    fn installation(id: &str, region: &str) -> Installation {
        Installation {
            id: InstallationId::from(id),
            region: region.to_owned(),
            capacity_kwp: 9.0,
            orientation: Orientation::South,
            tilt_deg: 30,
            storage_kwh: None,
            install_year: 2020,
            equipment: Equipment::default(),
            wallbox_kw: None,
            balcony_pv_wp: None,
            other_label: None,
        }
    }

    #[test]
    fn test_storage_classes_and_cycle_threshold() {
        let mut small = installation("small", "BY");
        small.storage_kwh = Some(8.0);
        let mut large = installation("large", "BY");
        large.storage_kwh = Some(20.0);

        let storage = |months: u8| -> Vec<MonthlyRecord> {
            (1..=months)
                .map(|month| MonthlyRecord {
                    storage: StorageReadings {
                        charge_kwh: Some(100.0),
                        discharge_kwh: Some(92.0),
                        grid_charge_kwh: None,
                    },
                    ..MonthlyRecord::new(ym(month), 800.0)
                })
                .collect()
        };

        let mut records = std::collections::BTreeMap::new();
        records.insert(small.id.clone(), storage(12));
        records.insert(large.id.clone(), storage(3));
        let snapshot = Snapshot::from_parts(vec![small, large], records);

        let rows = storage_by_class(&snapshot, MonthRange::calendar_year(2024));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].class, StorageClass::Small);
        assert_eq!(rows[0].installations, 1);
        assert_eq!(rows[0].avg_efficiency_pct, Some(92.0));
        // 1104 kWh / 8 kWh
        assert_eq!(rows[0].avg_cycles_per_year, Some(138.0));
        assert_eq!(rows[1].installations, 0);
        assert_eq!(rows[1].avg_efficiency_pct, None);
        // only three months of data
        assert_eq!(rows[2].installations, 1);
        assert_eq!(rows[2].avg_cycles_per_year, None);
        assert_eq!(rows[2].avg_efficiency_pct, Some(92.0));
    }

    #[test]
    fn test_heat_pump_regions_sorted_by_count() {
        let hp_record = |electricity: f64| MonthlyRecord {
            heat_pump: HeatPumpReadings {
                electricity_kwh: Some(electricity),
                space_heat_kwh: Some(300.0),
                hot_water_kwh: Some(0.0),
            },
            ..MonthlyRecord::new(ym(1), 200.0)
        };

        let mut installations = Vec::new();
        let mut records = std::collections::BTreeMap::new();
        for (id, region, electricity) in [
            ("a", "BW", 100.0),
            ("b", "NW", 100.0),
            ("c", "NW", 75.0),
            ("d", "NW", 0.0),
        ] {
            let mut installation = installation(id, region);
            installation.equipment.heat_pump = true;
            records.insert(installation.id.clone(), vec![hp_record(electricity)]);
            installations.push(installation);
        }
        let snapshot = Snapshot::from_parts(installations, records);

        let rows = heat_pump_by_region(&snapshot, MonthRange::calendar_year(2024));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "NW");
        // d has no usable readings but still counts
        assert_eq!(rows[0].installations, 3);
        assert_eq!(rows[0].avg_jaz, Some(3.5));
        assert_eq!(rows[1].region, "BW");
        assert_eq!(rows[1].installations, 1);
        assert_eq!(rows[1].avg_jaz, Some(3.0));
    }

    #[test]
    fn test_heat_pump_regions_without_readings_are_listed() {
        let mut installations = Vec::new();
        let mut records = std::collections::BTreeMap::new();
        for (id, region, electricity) in [
            ("a", "BY", Some(100.0)),
            ("b", "BY", None),
            ("c", "NW", None),
        ] {
            let mut installation = installation(id, region);
            installation.equipment.heat_pump = true;
            let record = MonthlyRecord {
                heat_pump: HeatPumpReadings {
                    electricity_kwh: electricity,
                    space_heat_kwh: electricity.map(|kwh| kwh * 3.0),
                    hot_water_kwh: None,
                },
                ..MonthlyRecord::new(ym(1), 200.0)
            };
            records.insert(installation.id.clone(), vec![record]);
            installations.push(installation);
        }
        let snapshot = Snapshot::from_parts(installations, records);

        let rows = heat_pump_by_region(&snapshot, MonthRange::calendar_year(2024));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "BY");
        assert_eq!(rows[0].installations, 2);
        assert_eq!(rows[0].avg_jaz, Some(3.0));
        assert_eq!(rows[1].region, "NW");
        assert_eq!(rows[1].installations, 1);
        assert_eq!(rows[1].avg_jaz, None);
    }

    #[test]
    fn test_ev_usage_classes() {
        let ev_months = |km: f64, months: u8| -> Vec<MonthlyRecord> {
            (1..=months)
                .map(|month| MonthlyRecord {
                    ev: EvReadings {
                        charge_total_kwh: Some(km * 0.2),
                        charge_pv_kwh: Some(km * 0.1),
                        distance_km: Some(km),
                        ..EvReadings::default()
                    },
                    ..MonthlyRecord::new(ym(month), 700.0)
                })
                .collect()
        };

        let mut installations = Vec::new();
        let mut records = std::collections::BTreeMap::new();
        for (id, km) in [("low", 300.0), ("mid", 800.0), ("high", 1500.0)] {
            let mut installation = installation(id, "HE");
            installation.equipment.ev = true;
            records.insert(installation.id.clone(), ev_months(km, 4));
            installations.push(installation);
        }
        let snapshot = Snapshot::from_parts(installations, records);

        let rows = ev_by_usage(&snapshot, MonthRange::calendar_year(2024));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.installations == 1));
        assert_eq!(rows[0].usage, EvUsageClass::Low);
        assert_eq!(rows[0].avg_pv_share_pct, Some(50.0));
        assert_eq!(rows[2].avg_consumption_per_100km, Some(20.0));
    }

    #[test]
    fn test_thousand_km_per_month_is_high_usage() {
        let mut installation = installation("ev", "SN");
        installation.equipment.ev = true;
        let months: Vec<MonthlyRecord> = (1..=3)
            .map(|month| MonthlyRecord {
                ev: EvReadings {
                    charge_total_kwh: Some(180.0),
                    distance_km: Some(1000.0),
                    ..EvReadings::default()
                },
                ..MonthlyRecord::new(ym(month), 500.0)
            })
            .collect();
        let mut records = std::collections::BTreeMap::new();
        records.insert(installation.id.clone(), months);
        let snapshot = Snapshot::from_parts(vec![installation], records);

        let rows = ev_by_usage(&snapshot, MonthRange::calendar_year(2024));
        assert_eq!(rows[1].usage, EvUsageClass::Medium);
        assert_eq!(rows[1].installations, 0);
        assert_eq!(rows[2].usage, EvUsageClass::High);
        assert_eq!(rows[2].installations, 1);
    }
}
