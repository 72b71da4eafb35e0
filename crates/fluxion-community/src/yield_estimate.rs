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

//! Specific annual yield estimation.
//!
//! This is the only place that turns monthly yields into kWh/kWp. Benchmark,
//! statistics, ranking, distribution and degradation all go through it.

use fluxion_community_types::{Installation, MonthRange, MonthlyRecord};

use crate::math::as_f64;

/// Number of most recent months considered
pub const WINDOW_MONTHS: usize = 12;

/// Below this many months the raw sum is used without annualizing
pub const MIN_MONTHS_FOR_EXTRAPOLATION: usize = 6;

/// Specific annual yield (kWh/kWp) from monthly yields ordered newest first.
///
/// Uses at most [`WINDOW_MONTHS`] values. With at least
/// [`MIN_MONTHS_FOR_EXTRAPOLATION`] values the sum is scaled to twelve
/// months, otherwise it is taken as is. Returns `0.0` when the capacity is
/// not positive or no values are given.
#[must_use]
pub fn specific_annual_yield<I>(capacity_kwp: f64, yields_newest_first: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    if capacity_kwp <= 0.0 {
        return 0.0;
    }

    let window: Vec<f64> = yields_newest_first
        .into_iter()
        .take(WINDOW_MONTHS)
        .collect();
    if window.is_empty() {
        return 0.0;
    }

    let sum: f64 = window.iter().sum();
    let annual = if window.len() >= MIN_MONTHS_FOR_EXTRAPOLATION {
        sum * as_f64(WINDOW_MONTHS) / as_f64(window.len())
    } else {
        sum
    };

    annual / capacity_kwp
}

/// Estimate for an installation from records sorted oldest first,
/// optionally restricted to a month range
#[must_use]
pub fn estimate_specific_yield(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: Option<MonthRange>,
) -> f64 {
    let yields = records
        .iter()
        .rev()
        .filter(|record| range.is_none_or(|r| r.contains(record.period())))
        .map(|record| record.yield_kwh);
    specific_annual_yield(installation.capacity_kwp, yields)
}

/// Like [`estimate_specific_yield`], with the "no data" sentinel mapped to `None`
#[must_use]
pub fn known_specific_yield(
    installation: &Installation,
    records: &[MonthlyRecord],
    range: Option<MonthRange>,
) -> Option<f64> {
    let estimate = estimate_specific_yield(installation, records, range);
    (estimate > 0.0).then_some(estimate)
}
