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

//! Shared community fixture for the integration tests

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fluxion_community::Snapshot;
use fluxion_community_types::{
    Equipment, HeatPumpReadings, Installation, InstallationId, MonthlyRecord, Orientation,
    StorageReadings, YearMonth,
};

/// Trailing twelve months resolve to January through December 2024
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub fn installation(id: &str, region: &str, kwp: f64, install_year: i32) -> Installation {
    Installation {
        id: InstallationId::from(id),
        region: region.to_owned(),
        capacity_kwp: kwp,
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

fn record(month: u8, yield_kwh: f64) -> MonthlyRecord {
    MonthlyRecord::new(YearMonth::new(2024, month).unwrap(), yield_kwh)
}

/// Four installations:
///
/// - `alpha` (BY, 8 kWp): twelve months of 800 kWh, 1200 kWh/kWp,
///   10 kWh battery and heat pump
/// - `bravo` (BY, 5 kWp): five months summing 3000 kWh, 600 kWh/kWp
/// - `charlie` (NW, 10 kWp): six months summing 5000 kWh, 1000 kWh/kWp
/// - `delta` (NW, 4 kWp): no records
pub fn community() -> Snapshot {
    let mut alpha = installation("alpha", "BY", 8.0, 2021);
    alpha.storage_kwh = Some(10.0);
    alpha.equipment.heat_pump = true;
    let bravo = installation("bravo", "BY", 5.0, 2023);
    let mut charlie = installation("charlie", "NW", 10.0, 2022);
    charlie.orientation = Orientation::EastWest;
    let delta = installation("delta", "NW", 4.0, 2024);

    let alpha_records = (1..=12)
        .map(|month| MonthlyRecord {
            self_sufficiency_pct: Some(70.0),
            storage: StorageReadings {
                charge_kwh: Some(100.0),
                discharge_kwh: Some(90.0),
                grid_charge_kwh: Some(10.0),
            },
            heat_pump: HeatPumpReadings {
                electricity_kwh: Some(200.0),
                space_heat_kwh: Some(600.0),
                hot_water_kwh: Some(100.0),
            },
            ..record(month, 800.0)
        })
        .collect();
    let bravo_records = (1..=5).map(|month| record(month, 600.0)).collect();
    let charlie_records = (7..=12)
        .map(|month| MonthlyRecord {
            self_sufficiency_pct: Some(50.0),
            ..record(month, 5000.0 / 6.0)
        })
        .collect();

    let mut records = BTreeMap::new();
    records.insert(alpha.id.clone(), alpha_records);
    records.insert(bravo.id.clone(), bravo_records);
    records.insert(charlie.id.clone(), charlie_records);

    Snapshot::from_parts(vec![alpha, bravo, charlie, delta], records)
}
