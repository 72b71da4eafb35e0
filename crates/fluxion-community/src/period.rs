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

//! Resolution of named reporting windows into inclusive month ranges.
//!
//! All functions take `today` explicitly so reports are reproducible.

use chrono::{Datelike, NaiveDate};
use fluxion_community_types::{MonthRange, PeriodInfo, PeriodKind, YearMonth};

/// Requested reporting window as received from the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodRequest {
    pub kind: PeriodKind,
    /// Only used by [`PeriodKind::Year`]
    pub year: Option<i32>,
}

impl PeriodRequest {
    #[must_use]
    pub fn new(kind: PeriodKind, year: Option<i32>) -> Self {
        Self { kind, year }
    }

    /// Unrecognized identifiers fall back to the trailing twelve months
    #[must_use]
    pub fn parse(identifier: &str, year: Option<i32>) -> Self {
        Self {
            kind: PeriodKind::parse(identifier).unwrap_or_default(),
            year,
        }
    }
}

/// The month before the one containing `today`
#[must_use]
pub fn last_completed_month(today: NaiveDate) -> YearMonth {
    YearMonth::of(today).previous()
}

/// Twelve months ending with the last completed month
#[must_use]
pub fn trailing_twelve_months(today: NaiveDate) -> MonthRange {
    MonthRange::ending_at(last_completed_month(today), 12)
}

/// Resolve a request into a concrete range with a display label.
///
/// Falls back to the trailing twelve months when a required parameter
/// (explicit year, installation year) is missing.
#[must_use]
pub fn resolve_period(
    request: PeriodRequest,
    install_year: Option<i32>,
    today: NaiveDate,
) -> PeriodInfo {
    let last = last_completed_month(today);

    match (request.kind, request.year, install_year) {
        (PeriodKind::LastMonth, _, _) => PeriodInfo {
            kind: PeriodKind::LastMonth,
            range: MonthRange::new(last, last),
            label: format!("Last month ({last})"),
        },
        (PeriodKind::LastCompleteYear, _, _) => {
            let year = today.year() - 1;
            PeriodInfo {
                kind: PeriodKind::LastCompleteYear,
                range: MonthRange::calendar_year(year),
                label: format!("Year {year}"),
            }
        }
        (PeriodKind::Year, Some(year), _) => PeriodInfo {
            kind: PeriodKind::Year,
            range: MonthRange::calendar_year(year),
            label: format!("Year {year}"),
        },
        (PeriodKind::SinceInstallation, _, Some(year)) => {
            let from = YearMonth { year, month: 1 }.min(last);
            let range = MonthRange::new(from, last);
            PeriodInfo {
                kind: PeriodKind::SinceInstallation,
                range,
                label: format!("Since installation ({range})"),
            }
        }
        (PeriodKind::Trailing12Months | PeriodKind::Year | PeriodKind::SinceInstallation, _, _) => {
            let range = trailing_twelve_months(today);
            PeriodInfo {
                kind: PeriodKind::Trailing12Months,
                range,
                label: format!("Last 12 months ({range})"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u8) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_last_month_crosses_year_boundary() {
        let info = resolve_period(PeriodRequest::new(PeriodKind::LastMonth, None), None, today());
        assert_eq!(info.range, MonthRange::new(ym(2024, 12), ym(2024, 12)));
    }

    #[test]
    fn test_trailing_twelve_months_ends_with_last_completed_month() {
        let info = resolve_period(PeriodRequest::default(), None, today());
        assert_eq!(info.range.from, ym(2024, 1));
        assert_eq!(info.range.to, ym(2024, 12));
        assert_eq!(info.range.month_count(), 12);
    }

    #[test]
    fn test_year_without_year_falls_back_to_trailing() {
        let info = resolve_period(PeriodRequest::new(PeriodKind::Year, None), None, today());
        assert_eq!(info.kind, PeriodKind::Trailing12Months);
        assert_eq!(info.range, trailing_twelve_months(today()));

        let info = resolve_period(PeriodRequest::new(PeriodKind::Year, Some(2022)), None, today());
        assert_eq!(info.range, MonthRange::calendar_year(2022));
        assert_eq!(info.label, "Year 2022");
    }

    #[test]
    fn test_since_installation_starts_in_january() {
        let request = PeriodRequest::new(PeriodKind::SinceInstallation, None);
        let info = resolve_period(request, Some(2019), today());
        assert_eq!(info.range, MonthRange::new(ym(2019, 1), ym(2024, 12)));

        let fallback = resolve_period(request, None, today());
        assert_eq!(fallback.kind, PeriodKind::Trailing12Months);
    }

    #[test]
    fn test_last_complete_year() {
        let request = PeriodRequest::new(PeriodKind::LastCompleteYear, None);
        let info = resolve_period(request, None, NaiveDate::from_ymd_opt(2025, 7, 3).unwrap());
        assert_eq!(info.range, MonthRange::calendar_year(2024));
    }

    #[test]
    fn test_unknown_identifier_falls_back_to_trailing() {
        let request = PeriodRequest::parse("fortnight", Some(2020));
        assert_eq!(request.kind, PeriodKind::Trailing12Months);
        let request = PeriodRequest::parse("seit_installation", None);
        assert_eq!(request.kind, PeriodKind::SinceInstallation);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = resolve_period(PeriodRequest::default(), None, today());
        let b = resolve_period(PeriodRequest::default(), None, today());
        assert_eq!(a, b);
    }
}
