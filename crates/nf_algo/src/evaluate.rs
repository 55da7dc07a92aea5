//! Evaluation: raw measurements + participant context → per-station results and total.
//!
//! Unit handling happens here, not in the table:
//! - run arrives in minutes and is rounded to whole seconds
//! - shuttle run keeps full precision for lookup
//! - everything else is passed through

use std::collections::BTreeMap;

use nf_core::time::minutes_to_seconds;
use nf_core::{EvaluationResult, Measurements, ParticipantContext, Station, StationResult};

use crate::table::{GroupKey, StandardsTable};

/// Convert a measurement into the table's native unit. `None` drops the station.
pub fn native_value(station: Station, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    match station {
        Station::Run => minutes_to_seconds(value).map(f64::from),
        _ => Some(value),
    }
}

/// Look up one station for `ctx`.
pub fn evaluate_station(
    table: &StandardsTable,
    ctx: &ParticipantContext,
    station: Station,
    value: Option<f64>,
) -> Option<StationResult> {
    let native = native_value(station, value?)?;
    table.lookup(&GroupKey::for_context(ctx, station), native)
}

/// Pure: identical inputs give identical results.
pub fn evaluate(table: &StandardsTable, ctx: &ParticipantContext, measurements: &Measurements) -> EvaluationResult {
    let stations: BTreeMap<Station, Option<StationResult>> = Station::ALL
        .into_iter()
        .map(|s| (s, evaluate_station(table, ctx, s, measurements.get(s))))
        .collect();
    EvaluationResult::from_stations(stations)
}
