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

//! Cumulative community growth per calendar month.

use chrono::NaiveDate;
use fluxion_community_types::{
    Installation, MonthRange, MonthlyRecord, TrendPoint, TrendReport, YearMonth,
};

use crate::math::{as_f64, round_to, share_pct};
use crate::source::Snapshot;

/// Longest supported horizon
pub const MAX_HORIZON_MONTHS: u16 = 60;

/// Parse a horizon: `"12"`, `"24"`, `"all"` or any month count up to
/// [`MAX_HORIZON_MONTHS`]. Unparseable input falls back to 12 months.
#[must_use]
pub fn parse_horizon(value: &str) -> u16 {
    match value.trim() {
        "all" | "alle" => MAX_HORIZON_MONTHS,
        other => other
            .parse::<u16>()
            .map_or(12, |months| months.clamp(1, MAX_HORIZON_MONTHS)),
    }
}

/// Monthly series from `horizon_months` months before the current month
/// through the current month.
///
/// An installation counts from the month of its first record onwards.
/// Months without any installation are left out of every series.
#[must_use]
pub fn trend(snapshot: &Snapshot, horizon_months: u16, today: NaiveDate) -> TrendReport {
    let horizon = horizon_months.clamp(1, MAX_HORIZON_MONTHS);
    let current = YearMonth::of(today);
    let start = current.shifted(-i32::from(horizon));

    let first_months: Vec<(&Installation, YearMonth)> = snapshot
        .entries()
        .filter_map(|(installation, records)| {
            records
                .first()
                .map(MonthlyRecord::period)
                .map(|first| (installation, first))
        })
        .collect();

    let mut report = TrendReport {
        horizon_months: horizon,
        installations: Vec::new(),
        avg_capacity_kwp: Vec::new(),
        storage_share_pct: Vec::new(),
        heat_pump_share_pct: Vec::new(),
        ev_share_pct: Vec::new(),
    };

    for month in MonthRange::new(start, current).months() {
        let active: Vec<&Installation> = first_months
            .iter()
            .filter(|(_, first)| *first <= month)
            .map(|(installation, _)| *installation)
            .collect();
        if active.is_empty() {
            continue;
        }

        let count = active.len();
        let label = month.label();
        let point = |value: f64| TrendPoint {
            month: label.clone(),
            value,
        };
        let capacity: f64 = active.iter().map(|i| i.capacity_kwp).sum();

        report.installations.push(point(as_f64(count)));
        report
            .avg_capacity_kwp
            .push(point(round_to(capacity / as_f64(count), 1)));
        report.storage_share_pct.push(point(share_pct(
            active.iter().filter(|i| i.has_storage()).count(),
            count,
            1,
        )));
        report.heat_pump_share_pct.push(point(share_pct(
            active.iter().filter(|i| i.equipment.heat_pump).count(),
            count,
            1,
        )));
        report.ev_share_pct.push(point(share_pct(
            active.iter().filter(|i| i.equipment.ev).count(),
            count,
            1,
        )));
    }

    report
}
