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

use anyhow::{Context, Result, bail};
use fluxion_community::trend::MAX_HORIZON_MONTHS;
use fluxion_community_types::PeriodKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "fluxion-community.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub reports: ReportSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_period")]
    pub default_period: String,
    #[serde(default = "default_ranking_limit")]
    pub ranking_limit: usize,
    #[serde(default = "default_trend_horizon_months")]
    pub trend_horizon_months: u16,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/community.db")
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_period() -> String {
    PeriodKind::Trailing12Months.as_str().to_owned()
}

fn default_ranking_limit() -> usize {
    10
}

fn default_trend_horizon_months() -> u16 {
    12
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_period: default_period(),
            ranking_limit: default_ranking_limit(),
            trend_horizon_months: default_trend_horizon_months(),
        }
    }
}

impl ReportSettings {
    /// Validated in [`CommunityConfig::validate`], so the fallback is never hit
    pub fn period_kind(&self) -> PeriodKind {
        PeriodKind::parse(&self.default_period).unwrap_or_default()
    }
}

impl CommunityConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path must exist; otherwise the default file is optional and
    /// its absence means built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            bail!("database.path must not be empty");
        }
        if self.logging.level.trim().is_empty() {
            bail!("logging.level must not be empty");
        }
        if PeriodKind::parse(&self.reports.default_period).is_none() {
            bail!(
                "reports.default_period '{}' is not a known period",
                self.reports.default_period
            );
        }
        if self.reports.ranking_limit == 0 {
            bail!("reports.ranking_limit must be at least 1");
        }
        if !(1..=MAX_HORIZON_MONTHS).contains(&self.reports.trend_horizon_months) {
            bail!("reports.trend_horizon_months must be between 1 and {MAX_HORIZON_MONTHS}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let file = write_config("");
        let config = CommunityConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.path, PathBuf::from("./data/community.db"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.reports.ranking_limit, 10);
        assert_eq!(config.reports.trend_horizon_months, 12);
        assert_eq!(config.reports.period_kind(), PeriodKind::Trailing12Months);
    }

    #[test]
    fn test_overrides_are_read() {
        let file = write_config(
            r#"
            [database]
            path = "/var/lib/fluxion/community.db"

            [reports]
            default_period = "last_complete_year"
            ranking_limit = 25
            "#,
        );
        let config = CommunityConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/fluxion/community.db")
        );
        assert_eq!(config.reports.ranking_limit, 25);
        assert_eq!(config.reports.period_kind(), PeriodKind::LastCompleteYear);
        assert_eq!(config.reports.trend_horizon_months, 12);
    }

    #[test]
    fn test_unknown_period_is_rejected() {
        let file = write_config("[reports]\ndefault_period = \"fortnight\"\n");
        let err = CommunityConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("fortnight"));
    }

    #[test]
    fn test_horizon_out_of_range_is_rejected() {
        let file = write_config("[reports]\ntrend_horizon_months = 61\n");
        assert!(CommunityConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(CommunityConfig::load(Some(&missing)).is_err());
    }
}
