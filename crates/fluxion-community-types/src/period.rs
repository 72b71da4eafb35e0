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

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u8,
}

impl YearMonth {
    /// Returns `None` for months outside 1-12
    #[must_use]
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given date
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "chrono months are 1-12"
    )]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// Months since year 0, used for arithmetic
    #[must_use]
    pub fn index(self) -> i32 {
        self.year * 12 + i32::from(self.month) - 1
    }

    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "rem_euclid(12) + 1 is always within 1-12"
    )]
    pub fn from_index(index: i32) -> Self {
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u8,
        }
    }

    /// Shift by a signed number of months
    #[must_use]
    pub fn shifted(self, months: i32) -> Self {
        Self::from_index(self.index() + months)
    }

    #[must_use]
    pub fn previous(self) -> Self {
        self.shifted(-1)
    }

    /// `YYYY-MM`
    #[must_use]
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive range of calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub from: YearMonth,
    pub to: YearMonth,
}

impl MonthRange {
    #[must_use]
    pub fn new(from: YearMonth, to: YearMonth) -> Self {
        Self { from, to }
    }

    /// January through December of `year`
    #[must_use]
    pub fn calendar_year(year: i32) -> Self {
        Self {
            from: YearMonth { year, month: 1 },
            to: YearMonth { year, month: 12 },
        }
    }

    /// `count` months ending with (and including) `last`
    #[must_use]
    pub fn ending_at(last: YearMonth, count: u16) -> Self {
        let span = i32::from(count.max(1)) - 1;
        Self {
            from: last.shifted(-span),
            to: last,
        }
    }

    #[must_use]
    pub fn contains(&self, month: YearMonth) -> bool {
        self.from <= month && month <= self.to
    }

    /// Number of calendar months covered, 0 for an inverted range
    #[must_use]
    pub fn month_count(&self) -> usize {
        usize::try_from(self.to.index() - self.from.index() + 1).unwrap_or(0)
    }

    /// Chronological list of the months in the range
    #[must_use]
    pub fn months(&self) -> Vec<YearMonth> {
        (self.from.index()..=self.to.index())
            .map(YearMonth::from_index)
            .collect()
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{} to {}", self.from, self.to)
        }
    }
}

/// Named reporting window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// The month before the current one
    LastMonth,
    /// Twelve months ending with the last completed month
    #[default]
    #[serde(rename = "trailing_12_months")]
    Trailing12Months,
    /// January-December of the previous calendar year
    LastCompleteYear,
    /// January-December of an explicit year
    Year,
    /// From January of the installation year to the last completed month
    SinceInstallation,
}

impl PeriodKind {
    /// Parse a period identifier. Accepts the English identifiers as well as
    /// the German ones sent by the web frontend.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "last_month" | "letzter_monat" => Some(Self::LastMonth),
            "trailing_12_months" | "letzte_12_monate" => Some(Self::Trailing12Months),
            "last_complete_year" | "letztes_vollstaendiges_jahr" => Some(Self::LastCompleteYear),
            "year" | "jahr" => Some(Self::Year),
            "since_installation" | "seit_installation" => Some(Self::SinceInstallation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastMonth => "last_month",
            Self::Trailing12Months => "trailing_12_months",
            Self::LastCompleteYear => "last_complete_year",
            Self::Year => "year",
            Self::SinceInstallation => "since_installation",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u8) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_month_arithmetic_crosses_year_boundary() {
        assert_eq!(ym(2025, 1).previous(), ym(2024, 12));
        assert_eq!(ym(2024, 12).shifted(1), ym(2025, 1));
        assert_eq!(ym(2025, 3).shifted(-27), ym(2022, 12));
        assert_eq!(YearMonth::new(2025, 13), None);
    }

    #[test]
    fn test_range_ending_at_spans_requested_months() {
        let range = MonthRange::ending_at(ym(2025, 2), 12);
        assert_eq!(range.from, ym(2024, 3));
        assert_eq!(range.month_count(), 12);
        assert_eq!(range.months().len(), 12);
        assert!(range.contains(ym(2024, 12)));
        assert!(!range.contains(ym(2025, 3)));
    }

    #[test]
    fn test_period_kind_parses_frontend_identifiers() {
        assert_eq!(
            PeriodKind::parse("letzte_12_monate"),
            Some(PeriodKind::Trailing12Months)
        );
        assert_eq!(PeriodKind::parse("jahr"), Some(PeriodKind::Year));
        assert_eq!(PeriodKind::parse("quarter"), None);
    }

    #[test]
    fn test_period_kind_serializes_as_identifier() {
        for kind in [
            PeriodKind::LastMonth,
            PeriodKind::Trailing12Months,
            PeriodKind::LastCompleteYear,
            PeriodKind::Year,
            PeriodKind::SinceInstallation,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(PeriodKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_year_month_label() {
        assert_eq!(ym(2024, 3).label(), "2024-03");
        assert_eq!(MonthRange::calendar_year(2023).to_string(), "2023-01 to 2023-12");
    }
}
