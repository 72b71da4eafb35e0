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

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use fluxion_community_types::{Installation, InstallationId, MonthRange, MonthlyRecord, YearMonth};
use tracing::debug;

/// Filter for [`DataSource::list_monthly_records`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordQuery {
    /// Inclusive lower bound
    pub from: Option<YearMonth>,
    /// Inclusive upper bound
    pub to: Option<YearMonth>,
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl RecordQuery {
    #[must_use]
    pub fn range(range: MonthRange) -> Self {
        Self {
            from: Some(range.from),
            to: Some(range.to),
            ..Self::default()
        }
    }

    /// The `limit` most recent records, newest first
    #[must_use]
    pub fn latest(limit: usize) -> Self {
        Self {
            newest_first: true,
            limit: Some(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, month: YearMonth) -> bool {
        self.from.is_none_or(|from| month >= from) && self.to.is_none_or(|to| month <= to)
    }

    /// Apply the filter to records sorted oldest first
    #[must_use]
    pub fn apply(&self, records: &[MonthlyRecord]) -> Vec<MonthlyRecord> {
        let filtered = records.iter().filter(|r| self.matches(r.period()));
        let limit = self.limit.unwrap_or(usize::MAX);
        if self.newest_first {
            filtered.rev().take(limit).cloned().collect()
        } else {
            filtered.take(limit).cloned().collect()
        }
    }
}

/// Read access to the persisted community data.
///
/// Implementations must return installations in a stable order; ranking ties
/// are resolved by that order.
pub trait DataSource: Send + Sync {
    /// All installations, optionally restricted to one region
    fn list_installations(&self, region: Option<&str>) -> Result<Vec<Installation>>;

    /// Monthly records of a single installation
    fn list_monthly_records(
        &self,
        id: &InstallationId,
        query: &RecordQuery,
    ) -> Result<Vec<MonthlyRecord>>;

    /// All calendar months that have at least one record, newest first
    fn distinct_months(&self) -> Result<Vec<YearMonth>>;

    fn count_installations(&self, region: Option<&str>) -> Result<usize> {
        Ok(self.list_installations(region)?.len())
    }

    fn find_installation(&self, id: &InstallationId) -> Result<Option<Installation>> {
        Ok(self
            .list_installations(None)?
            .into_iter()
            .find(|installation| &installation.id == id))
    }

    /// Every record grouped by installation, oldest first.
    ///
    /// The default issues one query per installation; stores should override
    /// it with a single grouped fetch.
    fn records_by_installation(&self) -> Result<BTreeMap<InstallationId, Vec<MonthlyRecord>>> {
        let mut grouped = BTreeMap::new();
        for installation in self.list_installations(None)? {
            let records =
                self.list_monthly_records(&installation.id, &RecordQuery::default())?;
            grouped.insert(installation.id, records);
        }
        Ok(grouped)
    }
}

/// Immutable in-memory copy of the community data.
///
/// Every report is computed against one snapshot, so a request never sees
/// a partially updated population.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    installations: Vec<Installation>,
    records: BTreeMap<InstallationId, Vec<MonthlyRecord>>,
}

impl Snapshot {
    /// Build a snapshot. Records are sorted oldest first; a duplicate month
    /// keeps the record that comes last.
    #[must_use]
    pub fn from_parts(
        installations: Vec<Installation>,
        mut records: BTreeMap<InstallationId, Vec<MonthlyRecord>>,
    ) -> Self {
        for list in records.values_mut() {
            list.reverse();
            list.sort_by_key(MonthlyRecord::period);
            list.dedup_by_key(|record| record.period());
        }
        Self {
            installations,
            records,
        }
    }

    /// Load everything with one batched fetch
    pub fn load(source: &dyn DataSource) -> Result<Self> {
        let installations = source.list_installations(None)?;
        let records = source.records_by_installation()?;
        debug!(
            installations = installations.len(),
            grouped = records.len(),
            "Loaded community snapshot"
        );
        Ok(Self::from_parts(installations, records))
    }

    #[must_use]
    pub fn installations(&self) -> &[Installation] {
        &self.installations
    }

    #[must_use]
    pub fn installation(&self, id: &InstallationId) -> Option<&Installation> {
        self.installations.iter().find(|i| &i.id == id)
    }

    /// Records of one installation, oldest first
    #[must_use]
    pub fn records(&self, id: &InstallationId) -> &[MonthlyRecord] {
        self.records.get(id).map_or(&[], Vec::as_slice)
    }

    /// Installations paired with their records, in installation order
    pub fn entries(&self) -> impl Iterator<Item = (&Installation, &[MonthlyRecord])> + '_ {
        self.installations
            .iter()
            .map(|installation| (installation, self.records(&installation.id)))
    }

    /// Like [`Self::entries`], restricted to a region when one is given
    pub fn entries_in<'a>(
        &'a self,
        region: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a Installation, &'a [MonthlyRecord])> + 'a {
        self.entries()
            .filter(move |(installation, _)| region.is_none_or(|r| installation.region == r))
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.installations
            .iter()
            .map(|installation| self.records(&installation.id).len())
            .sum()
    }

    /// Months with at least one record, newest first
    #[must_use]
    pub fn months_desc(&self) -> Vec<YearMonth> {
        let months: BTreeSet<YearMonth> = self
            .entries()
            .flat_map(|(_, records)| records.iter().map(MonthlyRecord::period))
            .collect();
        months.into_iter().rev().collect()
    }
}

impl DataSource for Snapshot {
    fn list_installations(&self, region: Option<&str>) -> Result<Vec<Installation>> {
        Ok(self
            .entries_in(region)
            .map(|(installation, _)| installation.clone())
            .collect())
    }

    fn list_monthly_records(
        &self,
        id: &InstallationId,
        query: &RecordQuery,
    ) -> Result<Vec<MonthlyRecord>> {
        Ok(query.apply(self.records(id)))
    }

    fn distinct_months(&self) -> Result<Vec<YearMonth>> {
        Ok(self.months_desc())
    }

    fn records_by_installation(&self) -> Result<BTreeMap<InstallationId, Vec<MonthlyRecord>>> {
        Ok(self.records.clone())
    }
}
