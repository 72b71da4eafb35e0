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

//! Cross-sectional degradation: specific yield by installation age.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use fluxion_community_types::{AgeYieldBucket, DegradationReport};
use tracing::debug;

use crate::math::{mean, round_to};
use crate::period::trailing_twelve_months;
use crate::source::Snapshot;
use crate::yield_estimate::specific_annual_yield;

pub const MIN_AGE_YEARS: u8 = 1;
pub const MAX_AGE_YEARS: u8 = 15;
/// Buckets with fewer installations are dropped
pub const MIN_INSTALLATIONS_PER_BUCKET: usize = 3;
/// Fewer qualifying buckets give no degradation estimate
pub const MIN_BUCKETS: usize = 3;

/// Average specific yield per age over the trailing twelve months and a
/// two-point degradation estimate from the youngest and oldest bucket.
#[must_use]
pub fn degradation(snapshot: &Snapshot, today: NaiveDate) -> DegradationReport {
    let window = trailing_twelve_months(today);
    let mut by_age: BTreeMap<u8, Vec<f64>> = BTreeMap::new();

    for (installation, records) in snapshot.entries() {
        if !installation.has_capacity() {
            continue;
        }
        let Ok(age) = u8::try_from(today.year() - installation.install_year) else {
            continue;
        };
        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&age) {
            continue;
        }

        let yields: Vec<f64> = records
            .iter()
            .rev()
            .filter(|record| window.contains(record.period()) && record.yield_kwh > 0.0)
            .map(|record| record.yield_kwh)
            .collect();
        if yields.is_empty() {
            continue;
        }

        by_age
            .entry(age)
            .or_default()
            .push(specific_annual_yield(installation.capacity_kwp, yields));
    }

    // published bucket yields are whole kWh/kWp, the slope uses the same values
    let qualifying: Vec<(u8, usize, f64)> = by_age
        .into_iter()
        .filter(|(_, values)| values.len() >= MIN_INSTALLATIONS_PER_BUCKET)
        .filter_map(|(age, values)| {
            mean(&values).map(|avg| (age, values.len(), round_to(avg, 0)))
        })
        .collect();

    debug!(buckets = qualifying.len(), "Computed age yield buckets");

    DegradationReport {
        degradation_pct_per_year: two_point_estimate(&qualifying),
        buckets: qualifying
            .into_iter()
            .map(|(age, installations, avg)| AgeYieldBucket {
                age_years: age,
                installations,
                avg_specific_yield: avg,
            })
            .collect(),
    }
}

/// Yield loss per year in percent between the first and the last bucket
fn two_point_estimate(buckets: &[(u8, usize, f64)]) -> Option<f64> {
    if buckets.len() < MIN_BUCKETS {
        return None;
    }
    let (first_age, _, first) = *buckets.first()?;
    let (last_age, _, last) = *buckets.last()?;
    let years = f64::from(last_age) - f64::from(first_age);
    if first <= 0.0 || years <= 0.0 {
        return None;
    }
    Some(round_to((first - last) / first * 100.0 / years, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_community_types::{
        Equipment, Installation, InstallationId, MonthlyRecord, Orientation, YearMonth,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn installation(id: &str, install_year: i32) -> Installation {
        Installation {
            id: InstallationId::from(id),
            region: "NI".to_owned(),
            capacity_kwp: 10.0,
            orientation: Orientation::South,
            tilt_deg: 30,
            storage_kwh: None,
            install_year,
            equipment: Equipment::default(),
            wallbox_kw: None,
            balcony_pv_wp: None,
            other_label: None,
        }
    }

    /// Twelve months Mar 2024 - Feb 2025 summing to `annual_kwh`
    fn trailing_year(annual_kwh: f64) -> Vec<MonthlyRecord> {
        let last = YearMonth::new(2025, 2).unwrap();
        (0..12)
            .map(|offset| MonthlyRecord::new(last.shifted(-offset), annual_kwh / 12.0))
            .collect()
    }

    fn population(groups: &[(i32, usize, f64)]) -> Snapshot {
        let mut installations = Vec::new();
        let mut records = BTreeMap::new();
        for (install_year, count, annual) in groups {
            for n in 0..*count {
                let id = format!("{install_year}-{n}");
                installations.push(installation(&id, *install_year));
                records.insert(InstallationId::new(id), trailing_year(*annual));
            }
        }
        Snapshot::from_parts(installations, records)
    }

    #[test]
    fn test_bucket_with_two_installations_is_excluded() {
        let snapshot = population(&[(2024, 3, 10_000.0), (2023, 2, 9_900.0)]);
        let report = degradation(&snapshot, today());
        let ages: Vec<u8> = report.buckets.iter().map(|b| b.age_years).collect();
        assert_eq!(ages, vec![1]);
        assert_eq!(report.degradation_pct_per_year, None);
    }

    #[test]
    fn test_two_point_degradation() {
        let snapshot = population(&[
            (2024, 3, 10_000.0),
            (2022, 3, 9_900.0),
            (2019, 4, 9_500.0),
        ]);
        let report = degradation(&snapshot, today());
        assert_eq!(report.buckets.len(), 3);
        assert_eq!(report.buckets[0].age_years, 1);
        assert!((report.buckets[0].avg_specific_yield - 1000.0).abs() < 1e-9);
        assert_eq!(report.buckets[2].installations, 4);
        // (1000 - 950) / 1000 * 100 / (6 - 1)
        assert!((report.degradation_pct_per_year.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_follows_published_bucket_yields() {
        let snapshot = population(&[
            (2024, 3, 10_004.0),
            (2022, 3, 9_800.0),
            (2019, 3, 9_496.0),
        ]);
        let report = degradation(&snapshot, today());
        assert!((report.buckets[0].avg_specific_yield - 1000.0).abs() < 1e-9);
        assert!((report.buckets[2].avg_specific_yield - 950.0).abs() < 1e-9);
        // (1000 - 950) / 1000 * 100 / 5, not (1000.4 - 949.6) / 1000.4 * 100 / 5
        assert!((report.degradation_pct_per_year.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ages_outside_range_are_ignored() {
        let snapshot = population(&[(2025, 5, 10_000.0), (2005, 5, 8_000.0)]);
        let report = degradation(&snapshot, today());
        assert!(report.buckets.is_empty());
    }
}
