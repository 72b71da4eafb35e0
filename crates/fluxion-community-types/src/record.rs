// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

use serde::{Deserialize, Serialize};

use crate::period::YearMonth;

/// Monthly energy figures of one installation.
///
/// Keyed uniquely by installation and calendar month. Optional figures that
/// are `None` were not reported and must never be read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub year: i32,
    /// 1-12
    pub month: u8,
    /// PV generation (kWh)
    pub yield_kwh: f64,
    #[serde(default)]
    pub feed_in_kwh: Option<f64>,
    #[serde(default)]
    pub grid_import_kwh: Option<f64>,
    /// Share of consumption covered by own generation (0-100%)
    #[serde(default)]
    pub self_sufficiency_pct: Option<f64>,
    /// Share of generation consumed on site (0-100%)
    #[serde(default)]
    pub self_consumption_pct: Option<f64>,
    #[serde(default)]
    pub storage: StorageReadings,
    #[serde(default)]
    pub heat_pump: HeatPumpReadings,
    #[serde(default)]
    pub ev: EvReadings,
    #[serde(default)]
    pub wallbox: WallboxReadings,
    #[serde(default)]
    pub balcony_pv: BalconyPvReadings,
    #[serde(default)]
    pub other_consumption_kwh: Option<f64>,
}

impl MonthlyRecord {
    #[must_use]
    pub fn new(period: YearMonth, yield_kwh: f64) -> Self {
        Self {
            year: period.year,
            month: period.month,
            yield_kwh,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// Battery storage (kWh)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageReadings {
    pub charge_kwh: Option<f64>,
    pub discharge_kwh: Option<f64>,
    /// Portion of the charge drawn from the grid
    pub grid_charge_kwh: Option<f64>,
}

/// Heat pump (kWh)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatPumpReadings {
    pub electricity_kwh: Option<f64>,
    pub space_heat_kwh: Option<f64>,
    pub hot_water_kwh: Option<f64>,
}

/// Electric vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvReadings {
    pub charge_total_kwh: Option<f64>,
    pub charge_pv_kwh: Option<f64>,
    pub charge_external_kwh: Option<f64>,
    pub distance_km: Option<f64>,
    /// Vehicle-to-home discharge
    pub v2h_kwh: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallboxReadings {
    pub charge_kwh: Option<f64>,
    pub charge_pv_kwh: Option<f64>,
    pub sessions: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalconyPvReadings {
    pub generation_kwh: Option<f64>,
    pub self_consumption_kwh: Option<f64>,
    pub storage_charge_kwh: Option<f64>,
    pub storage_discharge_kwh: Option<f64>,
}
