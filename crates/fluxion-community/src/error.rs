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

//! Error types for the community engine

use fluxion_community_types::UnknownRankingCategory;
use thiserror::Error;

/// Hard failures of a report request.
///
/// Missing history, empty populations and zero denominators are not errors;
/// they surface as `None` values or empty payloads in the reports.
#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("installation not found: {0}")]
    InstallationNotFound(String),

    #[error(transparent)]
    UnknownCategory(#[from] UnknownRankingCategory),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("data source error: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CommunityError>;
