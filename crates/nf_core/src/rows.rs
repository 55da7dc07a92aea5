//! Standard rows: the wire shape (`RawStandardRow`, all text) and the typed
//! shape (`StandardRow`) the table compiler consumes.
//!
//! Raw rows keep every field as text so a single bad cell turns into a
//! `RowError` for that row instead of failing the whole source.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::CoreError;
use crate::grade::Grade;
use crate::participant::{Level, RunDistance, Sex};
use crate::station::{Polarity, Station};
use crate::time::parse_mmss;

/// One row as produced by the external tabular source (CSV).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawStandardRow {
    pub level: String,
    pub sex: String,
    pub age_min: String,
    pub age_max: String,
    pub station: String,
    pub grade: String,
    pub points: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub run_km: Option<String>,
}

/// Why a raw row could not be typed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RowError {
    #[error(transparent)]
    Token(#[from] CoreError),
    #[error("invalid age: {0:?}")]
    BadAge(String),
    #[error("age range inverted: {min} > {max}")]
    AgeRangeInverted { min: u8, max: u8 },
    #[error("invalid points: {0:?}")]
    BadPoints(String),
    #[error("malformed time in {field}: {value:?}")]
    BadTime { field: &'static str, value: String },
    #[error("invalid bound in {field}: {value:?}")]
    BadBound { field: &'static str, value: String },
    #[error("band has neither min nor max")]
    Unbounded,
    #[error("band inverted: min {min} > max {max}")]
    InvertedBand { min: f64, max: f64 },
    #[error("run row without run_km")]
    MissingRunDistance,
}

impl RowError {
    /// Stable short code for counting/reporting.
    pub fn code(&self) -> &'static str {
        match self {
            RowError::Token(_) => "Row.UnknownToken",
            RowError::BadAge(_) | RowError::AgeRangeInverted { .. } => "Row.BadAge",
            RowError::BadPoints(_) => "Row.BadPoints",
            RowError::BadTime { .. } => "Row.BadTime",
            RowError::BadBound { .. } => "Row.BadBound",
            RowError::Unbounded => "Row.Unbounded",
            RowError::InvertedBand { .. } => "Row.InvertedBand",
            RowError::MissingRunDistance => "Row.MissingRunDistance",
        }
    }
}

/// Raw-performance range. Open ends are `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Band {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Band {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Inclusive containment with open ends.
    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m)
    }

    /// The raw value that first qualifies for this band:
    /// `min` when higher is better; `max` (else `min`) when lower is better.
    pub fn target(&self, polarity: Polarity) -> Option<f64> {
        match polarity {
            Polarity::HigherIsBetter => Some(self.min.unwrap_or(0.0)),
            Polarity::LowerIsBetter => self.max.or(self.min),
        }
    }
}

/// Typed performance band scoped to {level, sex, age group, station[, run distance]}.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StandardRow {
    pub level: Level,
    pub sex: Sex,
    pub age_min: u8,
    pub age_max: u8,
    pub station: Station,
    pub grade: Grade,
    pub points: u32,
    pub band: Band,
    /// Set for `Station::Run` only.
    pub run_km: Option<RunDistance>,
}

impl StandardRow {
    pub fn ages(&self) -> core::ops::RangeInclusive<u8> {
        self.age_min..=self.age_max
    }
}

impl TryFrom<&RawStandardRow> for StandardRow {
    type Error = RowError;

    fn try_from(raw: &RawStandardRow) -> Result<Self, Self::Error> {
        let level: Level = raw.level.parse()?;
        let sex: Sex = raw.sex.parse()?;
        let station: Station = raw.station.parse()?;
        let grade: Grade = raw.grade.parse()?;

        let age_min = parse_age(&raw.age_min)?;
        let age_max = parse_age(&raw.age_max)?;
        if age_min > age_max {
            return Err(RowError::AgeRangeInverted { min: age_min, max: age_max });
        }

        let points: u32 = raw
            .points
            .trim()
            .parse()
            .map_err(|_| RowError::BadPoints(raw.points.clone()))?;

        let min = parse_bound(station, "min", raw.min.as_deref())?;
        let max = parse_bound(station, "max", raw.max.as_deref())?;
        match (min, max) {
            (None, None) => return Err(RowError::Unbounded),
            (Some(lo), Some(hi)) if lo > hi => {
                return Err(RowError::InvertedBand { min: lo, max: hi })
            }
            _ => {}
        }

        let run_km = if station == Station::Run {
            let token = non_empty(raw.run_km.as_deref()).ok_or(RowError::MissingRunDistance)?;
            Some(token.parse::<RunDistance>()?)
        } else {
            None
        };

        Ok(StandardRow {
            level,
            sex,
            age_min,
            age_max,
            station,
            grade,
            points,
            band: Band { min, max },
            run_km,
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}

fn parse_age(s: &str) -> Result<u8, RowError> {
    s.trim().parse::<u8>().map_err(|_| RowError::BadAge(s.to_string()))
}

/// Parse one band boundary. Timed stations accept `M:SS`; every station
/// accepts a plain non-negative number. Empty cells are open bounds.
///
/// Only the shuttle run may carry fractions. Counts and centimetres are
/// indexed by whole units and run bands by whole seconds.
fn parse_bound(station: Station, field: &'static str, cell: Option<&str>) -> Result<Option<f64>, RowError> {
    let Some(text) = non_empty(cell) else {
        return Ok(None);
    };
    if text.contains(':') {
        if !station.is_timed() {
            return Err(RowError::BadBound { field, value: text.to_string() });
        }
        return parse_mmss(text)
            .map(|s| Some(f64::from(s)))
            .ok_or_else(|| RowError::BadTime { field, value: text.to_string() });
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && (station == Station::ShuttleRun || v.fract() == 0.0) => Ok(Some(v)),
        _ => Err(RowError::BadBound { field, value: text.to_string() }),
    }
}
