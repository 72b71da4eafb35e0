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

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region codes accepted by the submission side (German states plus AT and CH).
pub const KNOWN_REGIONS: [&str; 18] = [
    "BW", "BY", "BE", "BB", "HB", "HH", "HE", "MV", "NI", "NW", "RP", "SL", "SN", "ST", "SH", "TH",
    "AT", "CH",
];

/// Canonical form of a region code as stored and compared (`by` -> `BY`)
#[must_use]
pub fn region_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Canonical region code, `None` when it is not one of [`KNOWN_REGIONS`]
#[must_use]
pub fn known_region(code: &str) -> Option<String> {
    let code = region_code(code);
    KNOWN_REGIONS.contains(&code.as_str()).then_some(code)
}

/// Opaque identity token of an installation.
///
/// The token is a one-way hash produced upstream; nothing in the engine
/// can map it back to an owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallationId(String);

impl InstallationId {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstallationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Roof orientation category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    #[serde(alias = "süd", alias = "sued")]
    South,
    #[serde(alias = "ost")]
    East,
    West,
    #[serde(alias = "ost-west")]
    EastWest,
    #[serde(alias = "gemischt")]
    Mixed,
}

impl Orientation {
    pub const ALL: [Self; 5] = [
        Self::South,
        Self::East,
        Self::West,
        Self::EastWest,
        Self::Mixed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::EastWest => "east-west",
            Self::Mixed => "mixed",
        }
    }

    /// Lenient parser accepting both the English and the German labels
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "south" | "süd" | "sued" => Some(Self::South),
            "east" | "ost" => Some(Self::East),
            "west" => Some(Self::West),
            "east-west" | "ost-west" => Some(Self::EastWest),
            "mixed" | "gemischt" => Some(Self::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment flags reported with an installation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "one flag per optional component"
)]
pub struct Equipment {
    pub heat_pump: bool,
    pub ev: bool,
    pub wallbox: bool,
    pub balcony_pv: bool,
    pub other: bool,
}

/// Anonymized PV installation metadata. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub id: InstallationId,
    /// Two-letter region code, see [`KNOWN_REGIONS`]
    pub region: String,
    /// Nameplate capacity (kWp)
    pub capacity_kwp: f64,
    #[serde(default)]
    pub orientation: Orientation,
    /// Tilt angle in degrees (0 = flat roof)
    #[serde(default)]
    pub tilt_deg: u8,
    /// Usable battery capacity (kWh)
    #[serde(default)]
    pub storage_kwh: Option<f64>,
    pub install_year: i32,
    #[serde(default)]
    pub equipment: Equipment,
    /// Wallbox charging power (kW)
    #[serde(default)]
    pub wallbox_kw: Option<f64>,
    /// Balcony PV module power (Wp)
    #[serde(default)]
    pub balcony_pv_wp: Option<f64>,
    #[serde(default)]
    pub other_label: Option<String>,
}

impl Installation {
    /// Installations without positive capacity carry no comparable data
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.capacity_kwp > 0.0
    }

    #[must_use]
    pub fn has_storage(&self) -> bool {
        self.storage_kwh.is_some_and(|kwh| kwh > 0.0)
    }

    /// Storage capacity when a battery is present
    #[must_use]
    pub fn storage_capacity(&self) -> Option<f64> {
        self.storage_kwh.filter(|kwh| *kwh > 0.0)
    }
}
