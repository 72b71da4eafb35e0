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

//! Histograms with fixed, metric specific bin edges.

use fluxion_community_types::{
    Distribution, DistributionBin, DistributionSummary, Installation, MonthRange, MonthlyRecord,
};

use crate::components::{heat_pump_kpis, pv_kpis};
use crate::math::{mean, median, population_std_dev, round_to};
use crate::population::kpi_values;
use crate::source::Snapshot;
use crate::yield_estimate::known_specific_yield;

const CAPACITY_EDGES: &[f64] = &[0.0, 5.0, 8.0, 10.0, 12.0, 15.0, 20.0, 30.0, 50.0, 100.0];
const STORAGE_EDGES: &[f64] = &[0.0, 5.0, 8.0, 10.0, 12.0, 15.0, 20.0, 30.0, 50.0];
const SPECIFIC_YIELD_EDGES: &[f64] = &[
    0.0, 600.0, 700.0, 800.0, 900.0, 1000.0, 1100.0, 1200.0, 1300.0, 1500.0, 2000.0,
];
const PERCENT_EDGES: &[f64] = &[0.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
const TILT_EDGES: &[f64] = &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 90.0];
const JAZ_EDGES: &[f64] = &[0.0, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 6.0];

/// Metrics that can be histogrammed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionMetric {
    Capacity,
    StorageCapacity,
    SpecificYield,
    SelfSufficiency,
    Tilt,
    HeatPumpJaz,
}

impl DistributionMetric {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "capacity" | "kwp" | "anlagengroesse" => Some(Self::Capacity),
            "storage" | "storage_kwh" | "speicher" => Some(Self::StorageCapacity),
            "specific_yield" | "spez_ertrag" | "ertrag" => Some(Self::SpecificYield),
            "self_sufficiency" | "autarkie" => Some(Self::SelfSufficiency),
            "tilt" | "neigung" => Some(Self::Tilt),
            "heat_pump_jaz" | "wp_jaz" => Some(Self::HeatPumpJaz),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::StorageCapacity => "storage",
            Self::SpecificYield => "specific_yield",
            Self::SelfSufficiency => "self_sufficiency",
            Self::Tilt => "tilt",
            Self::HeatPumpJaz => "heat_pump_jaz",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Capacity => "kWp",
            Self::StorageCapacity => "kWh",
            Self::SpecificYield => "kWh/kWp",
            Self::SelfSufficiency => "%",
            Self::Tilt => "°",
            Self::HeatPumpJaz => "",
        }
    }

    #[must_use]
    pub const fn edges(self) -> &'static [f64] {
        match self {
            Self::Capacity => CAPACITY_EDGES,
            Self::StorageCapacity => STORAGE_EDGES,
            Self::SpecificYield => SPECIFIC_YIELD_EDGES,
            Self::SelfSufficiency => PERCENT_EDGES,
            Self::Tilt => TILT_EDGES,
            Self::HeatPumpJaz => JAZ_EDGES,
        }
    }

    const fn decimals(self) -> i32 {
        match self {
            Self::Capacity | Self::StorageCapacity | Self::SelfSufficiency => 1,
            Self::SpecificYield | Self::Tilt => 0,
            Self::HeatPumpJaz => 2,
        }
    }

    /// Flat roofs have a tilt of zero, every other metric is strictly positive
    const fn allows_zero(self) -> bool {
        matches!(self, Self::Tilt)
    }

    fn value(
        self,
        installation: &Installation,
        records: &[MonthlyRecord],
        range: MonthRange,
    ) -> Option<f64> {
        match self {
            Self::Capacity => Some(installation.capacity_kwp),
            Self::StorageCapacity => installation.storage_kwh,
            Self::SpecificYield => known_specific_yield(installation, records, Some(range)),
            Self::SelfSufficiency => pv_kpis(records, range).self_sufficiency_pct,
            Self::Tilt => Some(f64::from(installation.tilt_deg)),
            Self::HeatPumpJaz => installation
                .equipment
                .heat_pump
                .then(|| heat_pump_kpis(records, range))
                .flatten()
                .map(|kpis| kpis.jaz),
        }
    }
}

/// Population values of a metric, in installation order
#[must_use]
pub fn metric_values(
    snapshot: &Snapshot,
    metric: DistributionMetric,
    range: MonthRange,
) -> Vec<f64> {
    kpi_values(snapshot.entries(), |installation, records| {
        metric
            .value(installation, records, range)
            .filter(|value| value.is_finite())
            .filter(|value| *value > 0.0 || (metric.allows_zero() && *value >= 0.0))
    })
    .into_iter()
    .map(|(_, value)| value)
    .collect()
}

/// Count values into half-open bins `[edges[i], edges[i + 1])`.
/// Values outside the edges are not counted.
#[must_use]
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<DistributionBin> {
    edges
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            DistributionBin {
                from,
                to,
                label: format!("{}-{}", format_edge(from), format_edge(to)),
                count: values.iter().filter(|v| **v >= from && **v < to).count(),
            }
        })
        .collect()
}

fn format_edge(edge: f64) -> String {
    if edge.fract().abs() < f64::EPSILON {
        format!("{edge:.0}")
    } else {
        edge.to_string()
    }
}

#[must_use]
pub fn summarize(values: &[f64], decimals: i32) -> DistributionSummary {
    if values.is_empty() {
        return DistributionSummary::default();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    DistributionSummary {
        count: values.len(),
        min: round_to(min, decimals),
        max: round_to(max, decimals),
        median: median(values).map_or(0.0, |m| round_to(m, decimals)),
        mean: mean(values).map_or(0.0, |m| round_to(m, decimals)),
        std_dev: round_to(population_std_dev(values), decimals.max(1)),
    }
}

/// Histogram and summary of a metric. An unknown metric name yields an
/// empty result rather than an error.
#[must_use]
pub fn distribution(snapshot: &Snapshot, metric_name: &str, range: MonthRange) -> Distribution {
    let Some(metric) = DistributionMetric::parse(metric_name) else {
        return Distribution {
            metric: metric_name.to_owned(),
            unit: String::new(),
            bins: Vec::new(),
            summary: DistributionSummary::default(),
        };
    };

    let values = metric_values(snapshot, metric, range);
    Distribution {
        metric: metric.as_str().to_owned(),
        unit: metric.unit().to_owned(),
        bins: histogram(&values, metric.edges()),
        summary: summarize(&values, metric.decimals()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_community_types::{Equipment, InstallationId, Orientation};
    use std::collections::BTreeMap;

    fn installation(id: &str, kwp: f64, tilt: u8) -> Installation {
        Installation {
            id: InstallationId::from(id),
            region: "BW".to_owned(),
            capacity_kwp: kwp,
            orientation: Orientation::South,
            tilt_deg: tilt,
            storage_kwh: None,
            install_year: 2021,
            equipment: Equipment::default(),
            wallbox_kw: None,
            balcony_pv_wp: None,
            other_label: None,
        }
    }

    #[test]
    fn test_seven_kwp_falls_into_five_to_eight() {
        let bins = histogram(&[7.0], CAPACITY_EDGES);
        let hit: Vec<&DistributionBin> = bins.iter().filter(|b| b.count > 0).collect();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].label, "5-8");
    }

    #[test]
    fn test_bin_labels_keep_fractional_edges() {
        let labels: Vec<String> = histogram(&[], JAZ_EDGES)
            .into_iter()
            .map(|bin| bin.label)
            .collect();
        assert_eq!(labels[0], "0-2");
        assert_eq!(labels[1], "2-2.5");
        assert_eq!(labels[2], "2.5-3");
    }

    #[test]
    fn test_bins_are_half_open() {
        let bins = histogram(&[5.0, 8.0, 100.0], CAPACITY_EDGES);
        assert_eq!(bins[0].count, 0);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[2].count, 1);
        // upper edge itself is outside every bin
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_single_value_summary() {
        let summary = summarize(&[9.5], 1);
        assert_eq!(summary.count, 1);
        assert!((summary.median - 9.5).abs() < 1e-9);
        assert!(summary.std_dev.abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_metric_is_empty() {
        let result = distribution(&Snapshot::default(), "co2", MonthRange::calendar_year(2024));
        assert!(result.bins.is_empty());
        assert_eq!(result.summary, DistributionSummary::default());
        assert_eq!(result.metric, "co2");
    }

    #[test]
    fn test_capacity_distribution_over_population() {
        let snapshot = Snapshot::from_parts(
            vec![
                installation("a", 4.0, 30),
                installation("b", 7.0, 35),
                installation("c", 9.9, 0),
                installation("d", 0.0, 20),
            ],
            BTreeMap::new(),
        );
        let result = distribution(&snapshot, "kwp", MonthRange::calendar_year(2024));
        assert_eq!(result.summary.count, 3);
        assert!((result.summary.min - 4.0).abs() < 1e-9);
        assert!((result.summary.max - 9.9).abs() < 1e-9);
        assert!((result.summary.median - 7.0).abs() < 1e-9);
        assert_eq!(result.bins[0].count, 1);
        assert_eq!(result.bins[1].count, 1);
        assert_eq!(result.bins[2].count, 1);
    }

    #[test]
    fn test_tilt_keeps_flat_roofs() {
        let snapshot = Snapshot::from_parts(
            vec![installation("a", 5.0, 0), installation("b", 5.0, 30)],
            BTreeMap::new(),
        );
        let range = MonthRange::calendar_year(2024);
        let values = metric_values(&snapshot, DistributionMetric::Tilt, range);
        assert_eq!(values, vec![0.0, 30.0]);
    }
}
