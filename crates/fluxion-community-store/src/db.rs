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

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow, bail};
use fluxion_community::{DataSource, RecordQuery};
use fluxion_community_types::{
    BalconyPvReadings, Equipment, EvReadings, HeatPumpReadings, Installation, InstallationId,
    MonthlyRecord, Orientation, StorageReadings, WallboxReadings, YearMonth, known_region,
    region_code,
};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::submission::{ImportSummary, Submission};

const INSTALLATION_COLUMNS: &str = "i.token, i.region, i.capacity_kwp, i.orientation, i.tilt_deg, \
     i.storage_kwh, i.install_year, i.details_json";

const RECORD_COLUMNS: &str = "r.year, r.month, r.yield_kwh, r.feed_in_kwh, r.grid_import_kwh, \
     r.self_sufficiency_pct, r.self_consumption_pct, r.components_json";

/// Installation fields without a dedicated column
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct InstallationDetails {
    equipment: Equipment,
    wallbox_kw: Option<f64>,
    balcony_pv_wp: Option<f64>,
    other_label: Option<String>,
}

/// Component readings of a monthly record
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ComponentReadings {
    storage: StorageReadings,
    heat_pump: HeatPumpReadings,
    ev: EvReadings,
    wallbox: WallboxReadings,
    balcony_pv: BalconyPvReadings,
    other_consumption_kwh: Option<f64>,
}

/// SQLite backed community store.
///
/// Installations are listed in insertion order, which stays stable across
/// upserts.
#[derive(Debug)]
pub struct CommunityStore {
    conn: Mutex<Connection>,
}

impl CommunityStore {
    /// Open or create the database and its schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// In-memory store, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS installations (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                token          TEXT NOT NULL UNIQUE,
                region         TEXT NOT NULL,
                capacity_kwp   REAL NOT NULL,
                orientation    TEXT NOT NULL,
                tilt_deg       INTEGER NOT NULL,
                storage_kwh    REAL,
                install_year   INTEGER NOT NULL,
                details_json   TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_installations_region
                ON installations(region);

            CREATE TABLE IF NOT EXISTS monthly_records (
                id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                installation_id       INTEGER NOT NULL,
                year                  INTEGER NOT NULL,
                month                 INTEGER NOT NULL,
                yield_kwh             REAL NOT NULL,
                feed_in_kwh           REAL,
                grid_import_kwh       REAL,
                self_sufficiency_pct  REAL,
                self_consumption_pct  REAL,
                components_json       TEXT NOT NULL,
                UNIQUE (installation_id, year, month),
                FOREIGN KEY (installation_id) REFERENCES installations(id)
            );

            CREATE INDEX IF NOT EXISTS idx_monthly_records_period
                ON monthly_records(year, month);",
        )
        .context("Failed to initialize database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Insert an installation or update its metadata
    pub fn upsert_installation(&self, installation: &Installation) -> Result<()> {
        let conn = self.lock()?;
        write_installation(&conn, installation)
    }

    /// Insert or replace the record of one month. The installation must exist.
    pub fn upsert_monthly_record(&self, id: &InstallationId, record: &MonthlyRecord) -> Result<()> {
        let conn = self.lock()?;
        let row_id = installation_row_id(&conn, id)?
            .ok_or_else(|| anyhow!("installation not found: {id}"))?;
        write_record(&conn, row_id, record)
    }

    /// Remove an installation and all of its records.
    /// Returns `false` when the token was unknown.
    pub fn delete_installation(&self, id: &InstallationId) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(row_id) = installation_row_id(&tx, id)? else {
            return Ok(false);
        };
        let records = tx.execute(
            "DELETE FROM monthly_records WHERE installation_id = ?1",
            params![row_id],
        )?;
        tx.execute("DELETE FROM installations WHERE id = ?1", params![row_id])?;
        tx.commit()?;

        info!(installation = %id, records, "Deleted installation");
        Ok(true)
    }

    /// Write a batch of submissions in one transaction
    pub fn import(&self, submissions: &[Submission]) -> Result<ImportSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();

        for submission in submissions {
            let installation = &submission.installation;
            if known_region(&installation.region).is_none() {
                warn!(
                    installation = %installation.id,
                    region = %installation.region,
                    "Rejecting submission with unknown region"
                );
                summary.rejected += 1;
                continue;
            }
            write_installation(&tx, installation)?;
            let row_id = installation_row_id(&tx, &installation.id)?.ok_or_else(|| {
                anyhow!("installation vanished during import: {}", installation.id)
            })?;
            summary.installations += 1;

            for record in &submission.records {
                if YearMonth::new(record.year, record.month).is_none() {
                    warn!(
                        installation = %installation.id,
                        year = record.year,
                        month = record.month,
                        "Skipping record with invalid month"
                    );
                    summary.skipped += 1;
                    continue;
                }
                write_record(&tx, row_id, record)?;
                summary.records += 1;
            }
        }
        tx.commit().context("Failed to commit import")?;

        info!(
            installations = summary.installations,
            records = summary.records,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "Imported submissions"
        );
        Ok(summary)
    }
}

fn write_installation(conn: &Connection, installation: &Installation) -> Result<()> {
    if installation.id.as_str().is_empty() {
        bail!("installation token must not be empty");
    }
    let details = serde_json::to_string(&InstallationDetails {
        equipment: installation.equipment,
        wallbox_kw: installation.wallbox_kw,
        balcony_pv_wp: installation.balcony_pv_wp,
        other_label: installation.other_label.clone(),
    })?;

    conn.execute(
        "INSERT INTO installations
            (token, region, capacity_kwp, orientation, tilt_deg, storage_kwh, install_year, details_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(token) DO UPDATE SET
            region = ?2,
            capacity_kwp = ?3,
            orientation = ?4,
            tilt_deg = ?5,
            storage_kwh = ?6,
            install_year = ?7,
            details_json = ?8",
        params![
            installation.id.as_str(),
            region_code(&installation.region),
            installation.capacity_kwp,
            installation.orientation.as_str(),
            installation.tilt_deg,
            installation.storage_kwh,
            installation.install_year,
            details,
        ],
    )?;
    Ok(())
}

fn write_record(conn: &Connection, installation_row: i64, record: &MonthlyRecord) -> Result<()> {
    let components = serde_json::to_string(&ComponentReadings {
        storage: record.storage,
        heat_pump: record.heat_pump,
        ev: record.ev,
        wallbox: record.wallbox,
        balcony_pv: record.balcony_pv,
        other_consumption_kwh: record.other_consumption_kwh,
    })?;

    conn.execute(
        "INSERT INTO monthly_records
            (installation_id, year, month, yield_kwh, feed_in_kwh, grid_import_kwh,
             self_sufficiency_pct, self_consumption_pct, components_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(installation_id, year, month) DO UPDATE SET
            yield_kwh = ?4,
            feed_in_kwh = ?5,
            grid_import_kwh = ?6,
            self_sufficiency_pct = ?7,
            self_consumption_pct = ?8,
            components_json = ?9",
        params![
            installation_row,
            record.year,
            record.month,
            record.yield_kwh,
            record.feed_in_kwh,
            record.grid_import_kwh,
            record.self_sufficiency_pct,
            record.self_consumption_pct,
            components,
        ],
    )?;
    Ok(())
}

fn installation_row_id(conn: &Connection, id: &InstallationId) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM installations WHERE token = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )
        .optional()?)
}

/// Decode a JSON text column
fn json_column<T: for<'de> Deserialize<'de>>(row: &Row<'_>, index: usize) -> rusqlite::Result<T> {
    let text: String = row.get(index)?;
    serde_json::from_str(&text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

fn installation_from_row(row: &Row<'_>) -> rusqlite::Result<Installation> {
    let orientation: String = row.get(3)?;
    let details: InstallationDetails = json_column(row, 7)?;

    Ok(Installation {
        id: InstallationId::new(row.get::<_, String>(0)?),
        region: row.get(1)?,
        capacity_kwp: row.get(2)?,
        orientation: Orientation::parse(&orientation).unwrap_or_default(),
        tilt_deg: row.get(4)?,
        storage_kwh: row.get(5)?,
        install_year: row.get(6)?,
        equipment: details.equipment,
        wallbox_kw: details.wallbox_kw,
        balcony_pv_wp: details.balcony_pv_wp,
        other_label: details.other_label,
    })
}

/// Maps the [`RECORD_COLUMNS`] starting at `offset`
fn record_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<MonthlyRecord> {
    let components: ComponentReadings = json_column(row, offset + 7)?;

    Ok(MonthlyRecord {
        year: row.get(offset)?,
        month: row.get(offset + 1)?,
        yield_kwh: row.get(offset + 2)?,
        feed_in_kwh: row.get(offset + 3)?,
        grid_import_kwh: row.get(offset + 4)?,
        self_sufficiency_pct: row.get(offset + 5)?,
        self_consumption_pct: row.get(offset + 6)?,
        storage: components.storage,
        heat_pump: components.heat_pump,
        ev: components.ev,
        wallbox: components.wallbox,
        balcony_pv: components.balcony_pv,
        other_consumption_kwh: components.other_consumption_kwh,
    })
}

impl DataSource for CommunityStore {
    fn list_installations(&self, region: Option<&str>) -> Result<Vec<Installation>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INSTALLATION_COLUMNS} FROM installations i
             WHERE ?1 IS NULL OR i.region = ?1
             ORDER BY i.id ASC"
        ))?;

        let region = region.map(region_code);
        let installations = stmt
            .query_map(params![region], installation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(installations)
    }

    fn list_monthly_records(
        &self,
        id: &InstallationId,
        query: &RecordQuery,
    ) -> Result<Vec<MonthlyRecord>> {
        let conn = self.lock()?;
        let order = if query.newest_first { "DESC" } else { "ASC" };
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM monthly_records r
             JOIN installations i ON i.id = r.installation_id
             WHERE i.token = ?1
               AND (r.year * 12 + r.month - 1) BETWEEN ?2 AND ?3
             ORDER BY r.year {order}, r.month {order}
             LIMIT ?4"
        ))?;

        let from = query.from.map_or(i32::MIN, YearMonth::index);
        let to = query.to.map_or(i32::MAX, YearMonth::index);
        // SQLite treats a negative limit as unbounded
        let limit = query
            .limit
            .and_then(|limit| i64::try_from(limit).ok())
            .unwrap_or(-1);

        let records = stmt
            .query_map(params![id.as_str(), from, to, limit], |row| {
                record_from_row(row, 0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn distinct_months(&self) -> Result<Vec<YearMonth>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT year, month FROM monthly_records
             ORDER BY year DESC, month DESC",
        )?;

        let months = stmt
            .query_map([], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, u8>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|(year, month)| YearMonth::new(year, month))
            .collect();
        Ok(months)
    }

    fn count_installations(&self, region: Option<&str>) -> Result<usize> {
        let region = region.map(region_code);
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM installations WHERE ?1 IS NULL OR region = ?1",
            params![region],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count)?)
    }

    fn find_installation(&self, id: &InstallationId) -> Result<Option<Installation>> {
        let conn = self.lock()?;
        let installation = conn
            .query_row(
                &format!("SELECT {INSTALLATION_COLUMNS} FROM installations i WHERE i.token = ?1"),
                params![id.as_str()],
                installation_from_row,
            )
            .optional()?;
        Ok(installation)
    }

    fn records_by_installation(&self) -> Result<BTreeMap<InstallationId, Vec<MonthlyRecord>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT i.token, {RECORD_COLUMNS} FROM monthly_records r
             JOIN installations i ON i.id = r.installation_id
             ORDER BY i.id ASC, r.year ASC, r.month ASC"
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, record_from_row(row, 1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let mut grouped: BTreeMap<InstallationId, Vec<MonthlyRecord>> = BTreeMap::new();
        for (token, record) in rows {
            grouped
                .entry(InstallationId::new(token))
                .or_default()
                .push(record);
        }

        debug!(
            installations = grouped.len(),
            records = total,
            "Fetched monthly records"
        );
        Ok(grouped)
    }
}
