// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Command line interface of the community reports.

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::run;
