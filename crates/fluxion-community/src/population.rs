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

//! Community and region averages of per-installation KPIs.

use fluxion_community_types::{Installation, MonthRange, MonthlyRecord};

use crate::math::as_f64;
use crate::source::Snapshot;
use crate::yield_estimate::known_specific_yield;

/// Mean of a KPI over the installations that produced a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationAverage {
    pub value: f64,
    pub count: usize,
}

/// Evaluate `kpi` for every installation with positive capacity.
/// Installations yielding `None` are skipped.
pub fn kpi_values<'a, F>(
    entries: impl Iterator<Item = (&'a Installation, &'a [MonthlyRecord])>,
    kpi: F,
) -> Vec<(&'a Installation, f64)>
where
    F: Fn(&Installation, &[MonthlyRecord]) -> Option<f64>,
{
    entries
        .filter(|(installation, _)| installation.has_capacity())
        .filter_map(|(installation, records)| {
            kpi(installation, records).map(|value| (installation, value))
        })
        .collect()
}

/// Average of `kpi` over the given installations, `None` if nobody has a value
pub fn average_by<'a, F>(
    entries: impl Iterator<Item = (&'a Installation, &'a [MonthlyRecord])>,
    kpi: F,
) -> Option<PopulationAverage>
where
    F: Fn(&Installation, &[MonthlyRecord]) -> Option<f64>,
{
    let values = kpi_values(entries, kpi);
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|(_, value)| value).sum();
    Some(PopulationAverage {
        value: sum / as_f64(values.len()),
        count: values.len(),
    })
}

/// Average specific yield of the community or one region.
///
/// Installations whose estimate is the "no data" sentinel count neither in
/// the numerator nor the denominator.
#[must_use]
pub fn average_specific_yield(
    snapshot: &Snapshot,
    region: Option<&str>,
    range: Option<MonthRange>,
) -> Option<PopulationAverage> {
    average_by(snapshot.entries_in(region), |installation, records| {
        known_specific_yield(installation, records, range)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_community_types::{Equipment, InstallationId, Orientation, YearMonth};
    use std::collections::BTreeMap;

    fn installation(id: &str, region: &str, kwp: f64) -> Installation {
        Installation {
            id: InstallationId::from(id),
            region: region.to_owned(),
            capacity_kwp: kwp,
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

    fn year(yield_per_month: f64) -> Vec<MonthlyRecord> {
        (1..=12)
            .map(|month| {
                MonthlyRecord::new(YearMonth::new(2024, month).unwrap(), yield_per_month)
            })
            .collect()
    }

    #[test]
    fn test_sentinel_is_excluded_from_average() {
        let mut records = BTreeMap::new();
        records.insert(InstallationId::from("a"), year(100.0));
        records.insert(InstallationId::from("b"), year(50.0));
        let snapshot = Snapshot::from_parts(
            vec![
                installation("a", "BY", 1.0),
                installation("b", "BY", 1.0),
                // no records
                installation("c", "BY", 1.0),
                // no capacity
                installation("d", "BY", 0.0),
            ],
            records,
        );

        let avg = average_specific_yield(&snapshot, None, None).unwrap();
        assert_eq!(avg.count, 2);
        assert!((avg.value - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_filter() {
        let mut records = BTreeMap::new();
        records.insert(InstallationId::from("a"), year(100.0));
        records.insert(InstallationId::from("b"), year(50.0));
        let snapshot = Snapshot::from_parts(
            vec![installation("a", "BY", 1.0), installation("b", "NW", 1.0)],
            records,
        );

        let avg = average_specific_yield(&snapshot, Some("NW"), None).unwrap();
        assert_eq!(avg.count, 1);
        assert!((avg.value - 600.0).abs() < 1e-9);
        assert!(average_specific_yield(&snapshot, Some("HH"), None).is_none());
    }
}
