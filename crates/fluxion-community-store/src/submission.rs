// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! JSON submission files used to seed a store.

use std::path::Path;

use anyhow::{Context, Result};
use fluxion_community_types::{Installation, MonthlyRecord};
use serde::{Deserialize, Serialize};

/// One installation together with its monthly records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub installation: Installation,
    #[serde(default)]
    pub records: Vec<MonthlyRecord>,
}

impl Submission {
    /// Read a JSON array of submissions
    pub fn load_file(path: &Path) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read submission file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse submission file: {}", path.display()))
    }
}

/// Rows written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub installations: usize,
    pub records: usize,
    /// Records rejected because the month was outside 1-12
    pub skipped: usize,
    /// Submissions dropped because the region code is not known
    pub rejected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submission_with_defaults() {
        let json = r#"[{
            "installation": {
                "id": "tok-1",
                "region": "BY",
                "capacity_kwp": 9.8,
                "orientation": "ost-west",
                "tilt_deg": 25,
                "storage_kwh": 10.0,
                "install_year": 2022
            },
            "records": [
                {"year": 2024, "month": 6, "yield_kwh": 1100.0,
                 "storage": {"charge_kwh": 120.0, "discharge_kwh": 110.0}}
            ]
        }]"#;

        let submissions: Vec<Submission> = serde_json::from_str(json).unwrap();
        assert_eq!(submissions.len(), 1);
        let submission = &submissions[0];
        assert_eq!(submission.installation.id.as_str(), "tok-1");
        assert!(!submission.installation.equipment.heat_pump);
        assert_eq!(submission.records[0].storage.discharge_kwh, Some(110.0));
        assert_eq!(submission.records[0].ev.distance_km, None);
    }
}
