//! crates/nf_pipeline/src/validate.rs
//! Structural & semantic validation of a standards source before compilation.
//! Deterministic outputs: issues are sorted by (code, where, message).
//!
//! Compilation is tolerant (bad rows are skipped, overlaps resolve to the
//! higher-points band), so this pass is where table defects become visible.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use nf_core::{DomainCaps, Grade, Level, RawStandardRow, RunDistance, Sex, StandardRow, Station};
use nf_io::Loaded;
use serde::Serialize;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One (level, sex, age range, station, distance) block of the source table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupRef {
    pub level: Level,
    pub sex: Sex,
    pub station: Station,
    pub run_km: Option<RunDistance>,
    pub age_min: u8,
    pub age_max: u8,
}

impl GroupRef {
    fn of(row: &StandardRow) -> Self {
        Self {
            level: row.level,
            sex: row.sex,
            station: row.station,
            run_km: row.run_km,
            age_min: row.age_min,
            age_max: row.age_max,
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}-{}/{}", self.level, self.sex, self.age_min, self.age_max, self.station)?;
        if let Some(km) = self.run_km {
            write!(f, "@{km}")?;
        }
        Ok(())
    }
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    Root,
    Line(u64),
    Group(GroupRef),
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(rename = "where")]
    pub where_: EntityRef,
}

/// Deterministic report: pass = (no Error); ordering of issues is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Top-level entry point.
pub fn validate_standards(source: &Loaded<RawStandardRow>, caps: &DomainCaps) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    // A) Records the CSV layer could not read, then rows that fail typing.
    for s in &source.skipped {
        issues.push(issue(Severity::Error, "Row.Unreadable", s.reason.clone(), EntityRef::Line(s.line)));
    }
    let mut typed: Vec<(u64, StandardRow)> = Vec::with_capacity(source.rows.len());
    for (line, raw) in source.iter() {
        match StandardRow::try_from(raw) {
            Ok(row) => typed.push((line, row)),
            Err(e) => issues.push(issue(Severity::Error, e.code(), e.to_string(), EntityRef::Line(line))),
        }
    }
    if typed.is_empty() {
        issues.push(issue(Severity::Error, "Table.Empty", "no usable standards rows".into(), EntityRef::Root));
    }

    // B) Age groups per (level, sex, station, distance).
    issues.extend(check_age_groups(&typed));

    // C) Bands within each group.
    let mut groups: BTreeMap<GroupRef, Vec<(u64, &StandardRow)>> = BTreeMap::new();
    for (line, row) in &typed {
        groups.entry(GroupRef::of(row)).or_default().push((*line, row));
    }
    for (g, rows) in &groups {
        issues.extend(check_grade_points(g, rows));
        issues.extend(check_coverage(g, rows));
        issues.extend(check_domain(g, rows, caps));
    }

    sort_issues_stably(&mut issues);

    ValidationReport {
        pass: !issues.iter().any(|i| i.severity == Severity::Error),
        issues,
    }
}

// ------------------------------------------------------------------------------------------------
// Helpers / checks
// ------------------------------------------------------------------------------------------------

fn issue(severity: Severity, code: &'static str, message: String, where_: EntityRef) -> ValidationIssue {
    ValidationIssue { severity, code, message, where_ }
}

fn check_age_groups(typed: &[(u64, StandardRow)]) -> Vec<ValidationIssue> {
    let mut ranges: BTreeMap<(Level, Sex, Station, Option<RunDistance>), BTreeSet<(u8, u8)>> = BTreeMap::new();
    for (_, r) in typed {
        ranges.entry((r.level, r.sex, r.station, r.run_km)).or_default().insert((r.age_min, r.age_max));
    }

    let mut out = Vec::new();
    for ((level, sex, station, run_km), set) in &ranges {
        let list: Vec<(u8, u8)> = set.iter().copied().collect();
        for (i, a) in list.iter().enumerate() {
            for b in &list[i + 1..] {
                if a.0 <= b.1 && b.0 <= a.1 {
                    let g = GroupRef {
                        level: *level,
                        sex: *sex,
                        station: *station,
                        run_km: *run_km,
                        age_min: a.0,
                        age_max: a.1,
                    };
                    out.push(issue(
                        Severity::Error,
                        "AgeGroup.Overlap",
                        format!("ages {}-{} overlap {}-{}", a.0, a.1, b.0, b.1),
                        EntityRef::Group(g),
                    ));
                }
            }
        }
    }
    out
}

/// Grade and points must agree in order; equal points are suspicious.
fn check_grade_points(g: &GroupRef, rows: &[(u64, &StandardRow)]) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    for (i, (la, a)) in rows.iter().enumerate() {
        for (lb, b) in &rows[i + 1..] {
            let (hi, lo) = if a.grade >= b.grade { ((la, a), (lb, b)) } else { ((lb, b), (la, a)) };
            if hi.1.grade > lo.1.grade && hi.1.points < lo.1.points {
                out.push(issue(
                    Severity::Error,
                    "Points.GradeOrder",
                    format!(
                        "grade {} has {} points (line {}) but grade {} has {} (line {})",
                        hi.1.grade, hi.1.points, hi.0, lo.1.grade, lo.1.points, lo.0
                    ),
                    EntityRef::Group(*g),
                ));
            }
            if a.points == b.points {
                out.push(issue(
                    Severity::Warning,
                    "Points.Duplicate",
                    format!("{} points on lines {la} and {lb}", a.points),
                    EntityRef::Group(*g),
                ));
            }
        }
    }
    out
}

/// Smallest raw-value step between adjacent bands.
fn step(station: Station) -> f64 {
    match station {
        Station::ShuttleRun => 0.1,
        _ => 1.0,
    }
}

fn interval(row: &StandardRow) -> (f64, f64) {
    (row.band.min.unwrap_or(0.0), row.band.max.unwrap_or(f64::INFINITY))
}

fn show(v: f64) -> String {
    if v.is_infinite() {
        "∞".into()
    } else if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Overlaps and gaps between bands of one group.
fn check_coverage(g: &GroupRef, rows: &[(u64, &StandardRow)]) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    let mut spans: Vec<(f64, f64, u64, Grade)> = rows
        .iter()
        .map(|(line, r)| {
            let (lo, hi) = interval(r);
            (lo, hi, *line, r.grade)
        })
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)).then(a.2.cmp(&b.2)));

    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            if b.0 <= a.1 {
                out.push(issue(
                    Severity::Warning,
                    "Band.Overlap",
                    format!(
                        "{} [{}, {}] (line {}) overlaps {} [{}, {}] (line {})",
                        a.3, show(a.0), show(a.1), a.2, b.3, show(b.0), show(b.1), b.2
                    ),
                    EntityRef::Group(*g),
                ));
            }
        }
    }

    let tolerance = step(g.station) + 1e-9;
    let mut reach = match spans.first() {
        Some(first) => first.1,
        None => return out,
    };
    for next in &spans[1..] {
        if next.0 - reach > tolerance {
            out.push(issue(
                Severity::Warning,
                "Band.Gap",
                format!("no band covers ({}, {})", show(reach), show(next.0)),
                EntityRef::Group(*g),
            ));
        }
        reach = reach.max(next.1);
    }
    out
}

/// Thresholds past the station's dense-array cap can never be reached.
fn check_domain(g: &GroupRef, rows: &[(u64, &StandardRow)], caps: &DomainCaps) -> Vec<ValidationIssue> {
    let Some(cap) = caps.cap(g.station) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|(line, r)| {
            let worst = [r.band.min, r.band.max].into_iter().flatten().fold(0.0_f64, f64::max);
            (worst > f64::from(cap)).then(|| {
                issue(
                    Severity::Warning,
                    "Band.BeyondDomain",
                    format!("line {line}: bound {} exceeds {} cap {cap}", show(worst), g.station),
                    EntityRef::Group(*g),
                )
            })
        })
        .collect()
}

fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.where_.cmp(&b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}
