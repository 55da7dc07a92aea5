//! nf_report/src/lib.rs: pure offline report model + renderers (JSON/HTML).
//!
//! Determinism rules:
//! - No I/O here. Callers hand over result docs already in memory.
//! - Fixed station order (canonical `Station::ALL`), fixed field names.
//! - Missing values render as `—`; run values as `M:SS`; shuttle times with one decimal.

#![deny(unsafe_code)]

use nf_core::time::{format_mmss, minutes_to_seconds, round_tenths};
use nf_core::{AwardKind, NextTarget, Station};
use nf_pipeline::{ResultDoc, RunRecordDoc};
use thiserror::Error;

#[cfg(feature = "render_html")]
mod render_html;
#[cfg(feature = "render_json")]
mod render_json;

#[cfg(feature = "render_html")]
pub use render_html::render_html;
#[cfg(feature = "render_json")]
pub use render_json::render_json;

/// Shown wherever a value is absent.
pub const PLACEHOLDER: &str = "—";

// ===== Errors =====
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("inconsistent artifact: {0}")]
    Inconsistent(String),
    #[error("serialize: {0}")]
    Serialize(String),
}

// ===== Model =====
#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ReportModel {
    pub cover: SectionCover,
    pub stations: Vec<StationRow>,
    pub total_points: u32,
    pub award: SectionAward,
    pub integrity: SectionIntegrity,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SectionCover {
    pub title: String,
    pub participant_id: String,
    pub level: String,
    pub sex: String,
    pub age: u8,
    pub run_km: String,
}

/// One display row per station; every cell is already formatted.
#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StationRow {
    pub station: String,
    pub unit: String,
    pub measured: String,
    pub grade: String,
    pub points: String,
    pub next_target: String,
    pub next_grade: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SectionAward {
    pub label: String,
    pub reason: String,
    /// CSS-friendly token: gold | silver | bronze | none.
    pub tone: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SectionIntegrity {
    pub result_id: String,
    pub table_id: String,
    pub run_id: Option<String>,
    pub engine: Option<String>,
    pub timestamp_utc: Option<String>,
}

// ===== API =====

/// Build the presentation model for one result, optionally tied to its run record.
pub fn build_model(result: &ResultDoc, run: Option<&RunRecordDoc>) -> Result<ReportModel, ReportError> {
    let summed: u32 = result.result.stations.values().flatten().map(|r| r.points).sum();
    if summed != result.result.total_points {
        return Err(ReportError::Inconsistent(format!(
            "total_points {} but stations sum to {summed}",
            result.result.total_points
        )));
    }
    if let Some(run) = run {
        if !run.outputs.iter().any(|id| id == &result.id) {
            return Err(ReportError::Inconsistent(format!("{} not listed in {}", result.id, run.id)));
        }
        if run.inputs.table_id != result.table_id {
            return Err(ReportError::Inconsistent(format!(
                "result graded against {} but run used {}",
                result.table_id, run.inputs.table_id
            )));
        }
    }

    let p = &result.participant;
    let cover = SectionCover {
        title: "Fitness Assessment Result".to_string(),
        participant_id: p.id.clone(),
        level: p.level.to_string(),
        sex: p.sex.to_string(),
        age: p.age,
        run_km: format!("{} km", p.run_km),
    };

    let stations = Station::ALL
        .into_iter()
        .map(|s| {
            let score = result.result.get(s);
            let target = result.targets.get(&s).and_then(Option::as_ref);
            StationRow {
                station: s.label().to_string(),
                unit: unit_of(s).to_string(),
                measured: result.measurements.get(s).map_or_else(|| PLACEHOLDER.into(), |v| fmt_measured(s, v)),
                grade: score.map_or_else(|| PLACEHOLDER.into(), |r| r.grade.to_string()),
                points: score.map_or_else(|| PLACEHOLDER.into(), |r| r.points.to_string()),
                next_target: target.map_or_else(|| PLACEHOLDER.into(), fmt_target),
                next_grade: target.map_or_else(|| PLACEHOLDER.into(), |t| t.grade.to_string()),
            }
        })
        .collect();

    let award = SectionAward {
        label: result.award.label().to_string(),
        reason: result.award.reason.clone(),
        tone: tone(result.award.kind).to_string(),
    };

    let integrity = SectionIntegrity {
        result_id: result.id.clone(),
        table_id: result.table_id.clone(),
        run_id: run.map(|r| r.id.clone()),
        engine: run.map(|r| {
            format!("{}/{} v{} ({})", r.engine.vendor, r.engine.name, r.engine.version, r.engine.build)
        }),
        timestamp_utc: run.map(|r| r.timestamp_utc.clone()),
    };

    Ok(ReportModel { cover, stations, total_points: result.result.total_points, award, integrity })
}

/// Models for a whole batch, in roster order.
pub fn build_models(results: &[ResultDoc], run: Option<&RunRecordDoc>) -> Result<Vec<ReportModel>, ReportError> {
    results.iter().map(|r| build_model(r, run)).collect()
}

// ===== Helpers =====

fn unit_of(station: Station) -> &'static str {
    match station {
        Station::Run => "M:SS",
        s => s.unit(),
    }
}

fn tone(kind: AwardKind) -> &'static str {
    match kind {
        AwardKind::Gold => "gold",
        AwardKind::Silver => "silver",
        AwardKind::Bronze => "bronze",
        AwardKind::NoAward => "none",
    }
}

/// Whole numbers without a decimal point; anything else as written.
fn fmt_count(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Raw input in display form. Run input arrives in minutes.
fn fmt_measured(station: Station, v: f64) -> String {
    match station {
        Station::Run => minutes_to_seconds(v).map_or_else(|| PLACEHOLDER.into(), format_mmss),
        Station::ShuttleRun => format!("{:.1}", round_tenths(v)),
        _ => fmt_count(v),
    }
}

fn fmt_target(t: &NextTarget) -> String {
    match t.station {
        Station::Run => t
            .target_mmss
            .clone()
            .unwrap_or_else(|| format_mmss(t.target.round() as u32)),
        Station::ShuttleRun => format!("{:.1}", round_tenths(t.target)),
        _ => fmt_count(t.target),
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use nf_core::{GradingPolicy, Level, Measurements, Participant, Sex};
    use nf_io::read_standards;
    use nf_pipeline::{grade_participant, Engine, ResultDoc};

    const STANDARDS: &str = "\
level,sex,age_min,age_max,station,grade,points,min,max,run_km
primary,female,11,11,situps,A,5,27,,
primary,female,11,11,situps,B,4,23,26,
primary,female,11,11,broad_jump,A,5,170,,
primary,female,11,11,broad_jump,B,4,160,169,
primary,female,11,11,sit_and_reach,A,5,36,,
primary,female,11,11,sit_and_reach,B,4,32,35,
primary,female,11,11,pullups,A,5,16,,
primary,female,11,11,pullups,B,4,12,15,
primary,female,11,11,shuttle_run,A,5,,11.5,
primary,female,11,11,shuttle_run,B,4,11.6,12.1,
primary,female,11,11,run,A,5,,10:20,1.6
primary,female,11,11,run,B,4,10:21,11:20,1.6
";

    pub fn graded(id: &str, m: Measurements) -> ResultDoc {
        let src = read_standards(STANDARDS.as_bytes()).unwrap();
        let (engine, _) = Engine::from_source(&src, GradingPolicy::default()).unwrap();
        let p = Participant { id: id.into(), level: Level::Primary, sex: Sex::Female, age: 11, measurements: m };
        grade_participant(&engine.snapshot(), &engine.policy, &p).unwrap()
    }
}
