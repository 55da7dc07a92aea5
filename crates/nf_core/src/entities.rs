//! Per-request entities: measurements in, results/targets/award out.
//! All immutable once built; nothing here is persisted.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grade::{AwardKind, Grade};
use crate::participant::{Level, ParticipantContext, Sex};
use crate::station::Station;

/// Raw measurements keyed by station. Absent stations are simply not present.
/// Run is in minutes; shuttle in seconds; the rest in reps or centimetres.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Measurements(BTreeMap<Station, f64>);

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `set`.
    pub fn with(mut self, station: Station, value: f64) -> Self {
        self.set(station, value);
        self
    }

    pub fn set(&mut self, station: Station, value: f64) {
        self.0.insert(station, value);
    }

    pub fn get(&self, station: Station) -> Option<f64> {
        self.0.get(&station).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Station, f64)> + '_ {
        self.0.iter().map(|(s, v)| (*s, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Station, f64)> for Measurements {
    fn from_iter<I: IntoIterator<Item = (Station, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One participant as supplied by a roster: identity, context inputs, measurements.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Participant {
    pub id: String,
    pub level: Level,
    pub sex: Sex,
    pub age: u8,
    pub measurements: Measurements,
}

impl Participant {
    pub fn context(&self, long_run_age: u8) -> ParticipantContext {
        ParticipantContext::with_long_run_age(self.level, self.sex, self.age, long_run_age)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationResult {
    pub grade: Grade,
    pub points: u32,
}

/// Outcome of one evaluation. Every station is present as a key; `None`
/// means "no measurement or no band matched".
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvaluationResult {
    pub stations: BTreeMap<Station, Option<StationResult>>,
    pub total_points: u32,
}

impl EvaluationResult {
    /// Build from per-station outcomes; fills absent stations with `None`
    /// and sums the defined points.
    pub fn from_stations(mut stations: BTreeMap<Station, Option<StationResult>>) -> Self {
        for s in Station::ALL {
            stations.entry(s).or_insert(None);
        }
        let total_points = stations.values().flatten().map(|r| r.points).sum();
        Self { stations, total_points }
    }

    pub fn get(&self, station: Station) -> Option<StationResult> {
        self.stations.get(&station).copied().flatten()
    }

    /// Stations without a result, in canonical order.
    pub fn missing_stations(&self) -> Vec<Station> {
        Station::ALL
            .into_iter()
            .filter(|s| self.get(*s).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        Station::ALL.iter().all(|s| self.get(*s).is_some())
    }

    /// Worst grade among defined results.
    pub fn min_grade(&self) -> Option<Grade> {
        self.stations.values().flatten().map(|r| r.grade).min()
    }
}

/// Minimal raw value that reaches the next-higher-points band.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NextTarget {
    pub station: Station,
    /// Native unit: reps, cm, seconds.
    pub target: f64,
    /// `M:SS` rendering, run only.
    pub target_mmss: Option<String>,
    pub grade: Grade,
    pub points: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Award {
    pub kind: AwardKind,
    pub reason: String,
}

impl Award {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}
