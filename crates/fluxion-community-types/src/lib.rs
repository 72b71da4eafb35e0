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

//! Shared types for the FluxION community benchmark.
//!
//! - [`installation`]: anonymized installation metadata
//! - [`record`]: monthly energy records with optional component readings
//! - [`period`]: calendar month arithmetic and inclusive month ranges
//! - [`report`]: serializable report payloads produced by the engine

pub mod installation;
pub mod period;
pub mod record;
pub mod report;

pub use installation::{
    Equipment, Installation, InstallationId, KNOWN_REGIONS, Orientation, known_region, region_code,
};
pub use period::{MonthRange, PeriodKind, YearMonth};
pub use record::{
    BalconyPvReadings, EvReadings, HeatPumpReadings, MonthlyRecord, StorageReadings,
    WallboxReadings,
};
pub use report::*;
