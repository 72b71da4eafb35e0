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

//! Per-installation KPI calculators for the PV system and its components.
//!
//! Every calculator filters the records to an inclusive month range and
//! reduces them to sums and ratios. A calculator returns `None` when its
//! base quantity (charge, electricity, generation) sums to zero; individual
//! ratios are `None` when their denominator is zero or was never reported.

use fluxion_community_types::{MonthRange, MonthlyRecord};
use serde::Serialize;

use crate::math::{as_f64, mean, percentage, ratio};

/// Sum of reported values and the number of months that reported one
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    sum: f64,
    months: usize,
}

impl Tally {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.months += 1;
        }
    }

    /// `None` when no month reported the figure
    fn reported(self) -> Option<f64> {
        (self.months > 0).then_some(self.sum)
    }
}

fn in_range(
    records: &[MonthlyRecord],
    range: MonthRange,
) -> impl Iterator<Item = &MonthlyRecord> + '_ {
    records
        .iter()
        .filter(move |record| range.contains(record.period()))
}

// ============= PV =============

/// Core PV figures of an installation over a range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PvKpis {
    pub months: usize,
    pub yield_kwh: f64,
    pub feed_in_kwh: Option<f64>,
    pub grid_import_kwh: Option<f64>,
    /// Mean of the reported monthly values
    pub self_sufficiency_pct: Option<f64>,
    /// Mean of the reported monthly values
    pub self_consumption_pct: Option<f64>,
}

#[must_use]
pub fn pv_kpis(records: &[MonthlyRecord], range: MonthRange) -> PvKpis {
    let mut months = 0;
    let mut yield_kwh = 0.0;
    let mut feed_in = Tally::default();
    let mut grid_import = Tally::default();
    let mut sufficiency = Vec::new();
    let mut consumption = Vec::new();

    for record in in_range(records, range) {
        months += 1;
        yield_kwh += record.yield_kwh;
        feed_in.add(record.feed_in_kwh);
        grid_import.add(record.grid_import_kwh);
        sufficiency.extend(record.self_sufficiency_pct);
        consumption.extend(record.self_consumption_pct);
    }

    PvKpis {
        months,
        yield_kwh,
        feed_in_kwh: feed_in.reported(),
        grid_import_kwh: grid_import.reported(),
        self_sufficiency_pct: mean(&sufficiency),
        self_consumption_pct: mean(&consumption),
    }
}

// ============= Storage =============

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageKpis {
    pub charge_kwh: f64,
    pub discharge_kwh: f64,
    pub grid_charge_kwh: Option<f64>,
    /// Months with a reported discharge
    pub months: usize,
    /// Full cycles per year, scaled up when fewer than twelve months reported
    pub cycles_per_year: Option<f64>,
    /// Discharge over charge (%)
    pub efficiency_pct: Option<f64>,
    /// Grid charge over total charge (%)
    pub grid_share_pct: Option<f64>,
}

#[must_use]
pub fn storage_kpis(
    capacity_kwh: Option<f64>,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<StorageKpis> {
    let mut charge = Tally::default();
    let mut discharge = Tally::default();
    let mut grid_charge = Tally::default();

    for record in in_range(records, range) {
        charge.add(record.storage.charge_kwh);
        discharge.add(record.storage.discharge_kwh);
        grid_charge.add(record.storage.grid_charge_kwh);
    }

    if charge.sum <= 0.0 {
        return None;
    }

    let cycles_per_year = capacity_kwh
        .filter(|capacity| *capacity > 0.0)
        .and_then(|capacity| ratio(discharge.sum, capacity))
        .map(|cycles| annualize(cycles, discharge.months));

    Some(StorageKpis {
        charge_kwh: charge.sum,
        discharge_kwh: discharge.sum,
        grid_charge_kwh: grid_charge.reported(),
        months: discharge.months,
        cycles_per_year,
        efficiency_pct: percentage(discharge.sum, charge.sum),
        grid_share_pct: grid_charge
            .reported()
            .and_then(|grid| percentage(grid, charge.sum)),
    })
}

/// Scale a value covering `months` months (1-11) to a full year
fn annualize(value: f64, months: usize) -> f64 {
    if (1..12).contains(&months) {
        value * 12.0 / as_f64(months)
    } else {
        value
    }
}

// ============= Heat pump =============

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPumpKpis {
    pub electricity_kwh: f64,
    pub space_heat_kwh: f64,
    pub hot_water_kwh: f64,
    pub heat_kwh: f64,
    /// Seasonal performance factor: heat delivered over electricity used
    pub jaz: f64,
}

#[must_use]
pub fn heat_pump_kpis(records: &[MonthlyRecord], range: MonthRange) -> Option<HeatPumpKpis> {
    let mut electricity = 0.0;
    let mut space_heat = 0.0;
    let mut hot_water = 0.0;

    for record in in_range(records, range) {
        electricity += record.heat_pump.electricity_kwh.unwrap_or_default();
        space_heat += record.heat_pump.space_heat_kwh.unwrap_or_default();
        hot_water += record.heat_pump.hot_water_kwh.unwrap_or_default();
    }

    if electricity <= 0.0 {
        return None;
    }
    let heat = space_heat + hot_water;

    Some(HeatPumpKpis {
        electricity_kwh: electricity,
        space_heat_kwh: space_heat,
        hot_water_kwh: hot_water,
        heat_kwh: heat,
        jaz: heat / electricity,
    })
}

// ============= EV =============

/// Raw EV sums, also used for usage classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvTotals {
    pub charge_total_kwh: f64,
    pub charge_pv_kwh: Option<f64>,
    pub charge_external_kwh: Option<f64>,
    pub distance_km: Option<f64>,
    pub v2h_kwh: Option<f64>,
    /// Months with a reported distance
    pub distance_months: usize,
}

impl EvTotals {
    #[must_use]
    pub fn collect(records: &[MonthlyRecord], range: MonthRange) -> Self {
        let mut total = 0.0;
        let mut pv = Tally::default();
        let mut external = Tally::default();
        let mut distance = Tally::default();
        let mut v2h = Tally::default();

        for record in in_range(records, range) {
            total += record.ev.charge_total_kwh.unwrap_or_default();
            pv.add(record.ev.charge_pv_kwh);
            external.add(record.ev.charge_external_kwh);
            distance.add(record.ev.distance_km);
            v2h.add(record.ev.v2h_kwh);
        }

        Self {
            charge_total_kwh: total,
            charge_pv_kwh: pv.reported(),
            charge_external_kwh: external.reported(),
            distance_km: distance.reported(),
            v2h_kwh: v2h.reported(),
            distance_months: distance.months,
        }
    }

    /// Average distance per month with a reported distance
    #[must_use]
    pub fn km_per_month(&self) -> Option<f64> {
        self.distance_km
            .and_then(|km| ratio(km, as_f64(self.distance_months)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvKpis {
    pub totals: EvTotals,
    /// PV charge over total charge (%)
    pub pv_share_pct: Option<f64>,
    /// kWh charged per 100 km driven
    pub consumption_per_100km: Option<f64>,
}

impl EvKpis {
    /// `None` when nothing was charged
    #[must_use]
    pub fn from_totals(totals: EvTotals) -> Option<Self> {
        if totals.charge_total_kwh <= 0.0 {
            return None;
        }
        Some(Self {
            totals,
            pv_share_pct: totals
                .charge_pv_kwh
                .and_then(|pv| percentage(pv, totals.charge_total_kwh)),
            consumption_per_100km: totals
                .distance_km
                .filter(|km| *km > 0.0)
                .and_then(|km| percentage(totals.charge_total_kwh, km)),
        })
    }
}

#[must_use]
pub fn ev_kpis(records: &[MonthlyRecord], range: MonthRange) -> Option<EvKpis> {
    EvKpis::from_totals(EvTotals::collect(records, range))
}

// ============= Wallbox =============

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WallboxKpis {
    pub charge_kwh: f64,
    pub charge_pv_kwh: Option<f64>,
    pub sessions: Option<u32>,
    pub pv_share_pct: Option<f64>,
}

#[must_use]
pub fn wallbox_kpis(records: &[MonthlyRecord], range: MonthRange) -> Option<WallboxKpis> {
    let mut charge = 0.0;
    let mut pv = Tally::default();
    let mut sessions: Option<u32> = None;

    for record in in_range(records, range) {
        charge += record.wallbox.charge_kwh.unwrap_or_default();
        pv.add(record.wallbox.charge_pv_kwh);
        if let Some(count) = record.wallbox.sessions {
            sessions = Some(sessions.unwrap_or_default().saturating_add(count));
        }
    }

    if charge <= 0.0 {
        return None;
    }

    Some(WallboxKpis {
        charge_kwh: charge,
        charge_pv_kwh: pv.reported(),
        sessions,
        pv_share_pct: pv.reported().and_then(|pv| percentage(pv, charge)),
    })
}

// ============= Balcony PV =============

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalconyPvKpis {
    pub generation_kwh: f64,
    pub self_consumption_kwh: Option<f64>,
    pub storage_charge_kwh: Option<f64>,
    pub storage_discharge_kwh: Option<f64>,
    /// Self-consumed share of the generation (%)
    pub self_consumption_pct: Option<f64>,
    /// kWh per kWp over the range, needs the rated module power
    pub specific_yield: Option<f64>,
}

#[must_use]
pub fn balcony_pv_kpis(
    rated_wp: Option<f64>,
    records: &[MonthlyRecord],
    range: MonthRange,
) -> Option<BalconyPvKpis> {
    let mut generation = 0.0;
    let mut self_consumption = Tally::default();
    let mut storage_charge = Tally::default();
    let mut storage_discharge = Tally::default();

    for record in in_range(records, range) {
        generation += record.balcony_pv.generation_kwh.unwrap_or_default();
        self_consumption.add(record.balcony_pv.self_consumption_kwh);
        storage_charge.add(record.balcony_pv.storage_charge_kwh);
        storage_discharge.add(record.balcony_pv.storage_discharge_kwh);
    }

    if generation <= 0.0 {
        return None;
    }

    Some(BalconyPvKpis {
        generation_kwh: generation,
        self_consumption_kwh: self_consumption.reported(),
        storage_charge_kwh: storage_charge.reported(),
        storage_discharge_kwh: storage_discharge.reported(),
        self_consumption_pct: self_consumption
            .reported()
            .and_then(|own| percentage(own, generation)),
        specific_yield: rated_wp
            .filter(|wp| *wp > 0.0)
            .and_then(|wp| ratio(generation, wp / 1000.0)),
    })
}
