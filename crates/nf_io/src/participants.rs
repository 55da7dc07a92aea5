//! Participant roster CSV loader.
//!
//! Columns: `id, level, sex`, then either `age` or `dob` + `test_date`
//! (`YYYY-MM-DD`), then one column per station:
//! `situps, broad_jump, sit_and_reach, pullups, shuttle_run, run_min`.
//! Empty station cells are absent measurements. `run_min` takes decimal
//! minutes or `M:SS`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use nf_core::time::parse_mmss;
use nf_core::{age_at, CoreError, Level, Measurements, Participant, Sex, Station};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{IoError, IoResult, Loaded, SkippedRecord};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParticipantError {
    #[error(transparent)]
    Token(#[from] CoreError),
    #[error("invalid age: {0:?}")]
    BadAge(String),
    #[error("no age: give 'age' or both 'dob' and 'test_date'")]
    MissingAge,
    #[error("invalid date in {field}: {value:?}")]
    BadDate { field: &'static str, value: String },
    #[error("test_date precedes dob")]
    DateOrder,
    #[error("invalid {station} value: {value:?}")]
    BadMeasurement { station: Station, value: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParticipantRecord {
    id: String,
    level: String,
    sex: String,
    age: Option<String>,
    dob: Option<String>,
    test_date: Option<String>,
    situps: Option<String>,
    broad_jump: Option<String>,
    sit_and_reach: Option<String>,
    pullups: Option<String>,
    shuttle_run: Option<String>,
    run_min: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ParticipantError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ParticipantError::BadDate { field, value: value.to_string() })
}

/// Parse one measurement cell in the station's input unit. Empty is absent.
pub fn parse_measurement(station: Station, cell: &str) -> Result<Option<f64>, ParticipantError> {
    let t = cell.trim();
    if t.is_empty() {
        return Ok(None);
    }
    let bad = || ParticipantError::BadMeasurement { station, value: t.to_string() };
    if station == Station::Run && t.contains(':') {
        return parse_mmss(t).map(|s| Some(f64::from(s) / 60.0)).ok_or_else(bad);
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(bad()),
    }
}

/// Age from the `age` column, else completed years between `dob` and `test_date`.
pub fn resolve_age(
    age: Option<&str>,
    dob: Option<&str>,
    test_date: Option<&str>,
) -> Result<u8, ParticipantError> {
    if let Some(a) = age {
        return a.parse::<u8>().map_err(|_| ParticipantError::BadAge(a.to_string()));
    }
    match (dob, test_date) {
        (Some(d), Some(t)) => {
            let dob = parse_date("dob", d)?;
            let on = parse_date("test_date", t)?;
            age_at(dob, on).ok_or(ParticipantError::DateOrder)
        }
        _ => Err(ParticipantError::MissingAge),
    }
}

fn to_participant(line: u64, rec: ParticipantRecord) -> Result<Participant, ParticipantError> {
    let level: Level = rec.level.parse()?;
    let sex: Sex = rec.sex.parse()?;
    let age = resolve_age(non_empty(&rec.age), non_empty(&rec.dob), non_empty(&rec.test_date))?;

    let cells = [
        (Station::SitUps, &rec.situps),
        (Station::BroadJump, &rec.broad_jump),
        (Station::SitAndReach, &rec.sit_and_reach),
        (Station::PullUps, &rec.pullups),
        (Station::ShuttleRun, &rec.shuttle_run),
        (Station::Run, &rec.run_min),
    ];
    let mut measurements = Measurements::new();
    for (station, cell) in cells {
        if let Some(v) = parse_measurement(station, cell.as_deref().unwrap_or(""))? {
            measurements.set(station, v);
        }
    }

    let id = match rec.id.trim() {
        "" => format!("row-{line}"),
        s => s.to_string(),
    };
    Ok(Participant { id, level, sex, age, measurements })
}

fn parse_record(
    record: &csv::StringRecord,
    headers: &csv::StringRecord,
) -> Result<(u64, Participant), (u64, String)> {
    let line = record.position().map_or(0, |p| p.line());
    let rec: ParticipantRecord = record.deserialize(Some(headers)).map_err(|e| (line, e.to_string()))?;
    let p = to_participant(line, rec).map_err(|e| (line, e.to_string()))?;
    Ok((line, p))
}

pub fn read_participants<R: Read>(reader: R) -> IoResult<Loaded<Participant>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for required in ["level", "sex"] {
        if !headers.iter().any(|h| h == required) {
            return Err(IoError::Csv(format!("participants header missing column '{required}'")));
        }
    }

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    let mut skipped = Vec::new();
    for rec in rdr.records() {
        let parsed = match rec {
            Ok(record) => parse_record(&record, &headers),
            Err(e) => Err((e.position().map_or(0, |p| p.line()), e.to_string())),
        };
        match parsed {
            Ok((line, p)) => {
                rows.push(p);
                lines.push(line);
            }
            Err((line, reason)) => {
                warn!(line, %reason, "skipping participant record");
                skipped.push(SkippedRecord { line, reason });
            }
        }
    }
    info!(participants = rows.len(), skipped = skipped.len(), "roster read");
    Ok(Loaded { rows, lines, skipped })
}

pub fn load_participants(path: &Path) -> IoResult<Loaded<Participant>> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    read_participants(f)
}
