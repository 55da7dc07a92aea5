//! Standards Table: compile raw rows once, then answer point lookups and
//! next-band queries against an immutable value.
//!
//! Groups are keyed by (level, sex, integer age, station, run distance). Every
//! integer age inside a row's age range gets its own group, so lookups never
//! search age ranges at query time.
//!
//! Storage per station kind:
//! - discrete (sit-ups, pull-ups, broad jump, sit-and-reach): dense array by count/cm
//! - run: dense array by whole second, with fast-finisher backfill
//! - shuttle run: sorted band list scanned at query time

mod dense;

use std::collections::BTreeMap;

use nf_core::{
    Band, DomainCaps, Grade, Level, Polarity, RawStandardRow, RunDistance, Sex, StandardRow, Station,
    StationResult,
};
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, info, warn};

// ----------------------------- Keys & bands -----------------------------

/// Lookup key for one materialised group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GroupKey {
    pub level: Level,
    pub sex: Sex,
    pub age: u8,
    pub station: Station,
    /// Only meaningful for `Station::Run`; always `None` for other stations.
    pub run_km: Option<RunDistance>,
}

impl GroupKey {
    /// Normalises `run_km` away for non-run stations.
    pub fn new(level: Level, sex: Sex, age: u8, station: Station, run_km: Option<RunDistance>) -> Self {
        let run_km = if station == Station::Run { run_km } else { None };
        Self { level, sex, age, station, run_km }
    }

    pub fn for_context(ctx: &nf_core::ParticipantContext, station: Station) -> Self {
        Self::new(ctx.level, ctx.sex, ctx.age, station, Some(ctx.run_distance))
    }
}

/// A band as stored in a compiled group.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScoredBand {
    pub grade: Grade,
    pub points: u32,
    pub band: Band,
}

impl ScoredBand {
    pub fn score(&self) -> StationResult {
        StationResult { grade: self.grade, points: self.points }
    }
}

#[derive(Clone, Debug)]
struct Group {
    /// Best first: points desc, then grade desc.
    bands: Vec<ScoredBand>,
    /// Dense per-index cells; `None` for the shuttle run.
    cells: Option<Vec<Option<StationResult>>>,
}

// ----------------------------- Compile statistics -----------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CompileStats {
    pub rows_read: usize,
    pub rows_accepted: usize,
    pub rows_skipped: usize,
    /// Skipped rows counted by `RowError::code()`.
    pub skipped_by_code: BTreeMap<String, usize>,
    pub groups: usize,
}

// ----------------------------- Table -----------------------------

#[derive(Clone, Debug)]
pub struct StandardsTable {
    groups: BTreeMap<GroupKey, Group>,
    rows: Vec<StandardRow>,
    caps: DomainCaps,
}

impl StandardsTable {
    /// Compile raw rows. Rows that fail to type are skipped, counted and
    /// logged; compilation itself never fails.
    pub fn compile(raw: &[RawStandardRow], caps: &DomainCaps) -> (Self, CompileStats) {
        let mut stats = CompileStats { rows_read: raw.len(), ..CompileStats::default() };
        let mut rows = Vec::with_capacity(raw.len());
        for (idx, r) in raw.iter().enumerate() {
            match StandardRow::try_from(r) {
                Ok(row) => rows.push(row),
                Err(err) => {
                    warn!(row = idx + 1, code = err.code(), error = %err, "skipping standards row");
                    *stats.skipped_by_code.entry(err.code().to_string()).or_insert(0) += 1;
                    stats.rows_skipped += 1;
                }
            }
        }
        stats.rows_accepted = rows.len();
        let table = Self::from_rows(rows, caps);
        stats.groups = table.groups.len();
        info!(
            rows = stats.rows_read,
            accepted = stats.rows_accepted,
            skipped = stats.rows_skipped,
            groups = stats.groups,
            "standards table compiled"
        );
        (table, stats)
    }

    /// Compile already-typed rows.
    pub fn from_rows(rows: Vec<StandardRow>, caps: &DomainCaps) -> Self {
        let mut buckets: BTreeMap<GroupKey, Vec<ScoredBand>> = BTreeMap::new();
        for row in &rows {
            let band = ScoredBand { grade: row.grade, points: row.points, band: row.band };
            for age in row.ages() {
                let key = GroupKey::new(row.level, row.sex, age, row.station, row.run_km);
                buckets.entry(key).or_default().push(band);
            }
        }

        let groups = buckets
            .into_iter()
            .map(|(key, mut bands)| {
                // Stable: equal-rank bands keep source order.
                bands.sort_by(|a, b| b.points.cmp(&a.points).then(b.grade.cmp(&a.grade)));
                let cells = match key.station {
                    Station::ShuttleRun => None,
                    Station::Run => Some(dense::second_cells(&bands, caps.run_seconds)),
                    s => Some(dense::count_cells(&bands, caps.cap(s).unwrap_or(0))),
                };
                (key, Group { bands, cells })
            })
            .collect();

        Self { groups, rows, caps: *caps }
    }

    /// Grade and points for a raw value in the table's native unit
    /// (run in whole seconds). `None` if no group or no band matches.
    pub fn lookup(&self, key: &GroupKey, raw: f64) -> Option<StationResult> {
        if !raw.is_finite() || raw < 0.0 {
            return None;
        }
        let Some(group) = self.groups.get(key) else {
            debug!(?key, "no standards group");
            return None;
        };
        let hit = match &group.cells {
            Some(cells) => {
                let pos = match key.station {
                    Station::Run => raw.round(),
                    _ => raw.floor(),
                };
                let idx = pos as usize;
                let last = cells.len().saturating_sub(1);
                cells.get(idx.min(last)).copied().flatten()
            }
            // Highest-points band whose max is at or above the value.
            None => group
                .bands
                .iter()
                .find(|b| b.band.max.map_or(true, |m| raw <= m))
                .map(ScoredBand::score),
        };
        if hit.is_none() {
            debug!(?key, raw, "no band matched");
        }
        hit
    }

    /// The band with the smallest points strictly above `current_points`.
    /// Equal-points candidates resolve to the better grade and log a warning.
    pub fn next_band(&self, key: &GroupKey, current_points: u32) -> Option<&ScoredBand> {
        let group = self.groups.get(key)?;
        let above = group.bands.iter().filter(|b| b.points > current_points);
        // `min_by_key` keeps the first minimum; bands are grade-desc within equal points.
        let next = above.clone().min_by_key(|b| b.points)?;
        let ties = above.filter(|b| b.points == next.points).count();
        if ties > 1 {
            warn!(?key, points = next.points, ties, "duplicate points in standards group");
        }
        Some(next)
    }

    /// Raw value that first qualifies for `band` at this station.
    pub fn target_value(station: Station, band: &Band) -> Option<f64> {
        let t = band.target(station.polarity())?;
        Some(match station.polarity() {
            // Count arrays index by floor, so a fractional threshold needs the next whole count.
            Polarity::HigherIsBetter if station.is_discrete() => t.ceil(),
            // Run cells end at floor(max): the slowest whole second still in the band.
            Polarity::LowerIsBetter if station == Station::Run => t.floor(),
            _ => t,
        })
    }

    pub fn bands(&self, key: &GroupKey) -> Option<&[ScoredBand]> {
        self.groups.get(key).map(|g| g.bands.as_slice())
    }

    pub fn max_points(&self, key: &GroupKey) -> Option<u32> {
        self.bands(key)?.first().map(|b| b.points)
    }

    pub fn contains(&self, key: &GroupKey) -> bool {
        self.groups.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> + '_ {
        self.groups.keys()
    }

    /// Accepted typed rows in source order.
    pub fn rows(&self) -> &[StandardRow] {
        &self.rows
    }

    pub fn caps(&self) -> &DomainCaps {
        &self.caps
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(station: Station, grade: Grade, points: u32, min: Option<f64>, max: Option<f64>) -> StandardRow {
        StandardRow {
            level: Level::Secondary,
            sex: Sex::Male,
            age_min: 13,
            age_max: 14,
            station,
            grade,
            points,
            band: Band::new(min, max),
            run_km: (station == Station::Run).then_some(RunDistance::Km2_4),
        }
    }

    fn key(station: Station, age: u8) -> GroupKey {
        GroupKey::new(Level::Secondary, Sex::Male, age, station, Some(RunDistance::Km2_4))
    }

    fn situps() -> StandardsTable {
        let rows = vec![
            row(Station::SitUps, Grade::A, 5, Some(38.0), None),
            row(Station::SitUps, Grade::B, 4, Some(35.0), Some(37.0)),
            row(Station::SitUps, Grade::C, 3, Some(31.0), Some(34.0)),
            row(Station::SitUps, Grade::D, 2, Some(27.0), Some(30.0)),
            row(Station::SitUps, Grade::E, 1, Some(23.0), Some(26.0)),
        ];
        StandardsTable::from_rows(rows, &DomainCaps::default())
    }

    #[test]
    fn discrete_lookup_by_threshold() {
        let t = situps();
        let k = key(Station::SitUps, 13);
        assert_eq!(t.lookup(&k, 22.0), None);
        assert_eq!(t.lookup(&k, 23.0).map(|r| r.grade), Some(Grade::E));
        assert_eq!(t.lookup(&k, 34.9).map(|r| r.points), Some(3));
        assert_eq!(t.lookup(&k, 38.0).map(|r| r.grade), Some(Grade::A));
        // Above the last cell clamps.
        assert_eq!(t.lookup(&k, 250.0).map(|r| r.grade), Some(Grade::A));
        assert_eq!(t.lookup(&k, -1.0), None);
        assert_eq!(t.lookup(&k, f64::NAN), None);
    }

    #[test]
    fn every_age_in_range_is_materialised() {
        let t = situps();
        assert!(t.contains(&key(Station::SitUps, 13)));
        assert!(t.contains(&key(Station::SitUps, 14)));
        assert!(!t.contains(&key(Station::SitUps, 15)));
        assert_eq!(t.len(), 2);
        assert_eq!(t.lookup(&key(Station::SitUps, 15), 40.0), None);
    }

    #[test]
    fn run_fast_finisher_and_slow_clamp() {
        let rows = vec![
            row(Station::Run, Grade::A, 5, Some(540.0), Some(585.0)),
            row(Station::Run, Grade::B, 4, Some(586.0), Some(630.0)),
            row(Station::Run, Grade::E, 1, Some(631.0), Some(900.0)),
        ];
        let t = StandardsTable::from_rows(rows, &DomainCaps::default());
        let k = key(Station::Run, 14);
        assert_eq!(t.lookup(&k, 480.0).map(|r| r.grade), Some(Grade::A));
        assert_eq!(t.lookup(&k, 585.0).map(|r| r.points), Some(5));
        assert_eq!(t.lookup(&k, 586.0).map(|r| r.points), Some(4));
        assert_eq!(t.lookup(&k, 2000.0).map(|r| r.grade), Some(Grade::E));
    }

    #[test]
    fn shuttle_scans_by_max() {
        let rows = vec![
            row(Station::ShuttleRun, Grade::A, 5, None, Some(10.2)),
            row(Station::ShuttleRun, Grade::B, 4, Some(10.3), Some(10.6)),
            row(Station::ShuttleRun, Grade::E, 1, Some(10.7), None),
        ];
        let t = StandardsTable::from_rows(rows, &DomainCaps::default());
        let k = key(Station::ShuttleRun, 13);
        assert_eq!(t.lookup(&k, 10.2).map(|r| r.grade), Some(Grade::A));
        assert_eq!(t.lookup(&k, 10.25).map(|r| r.grade), Some(Grade::B));
        assert_eq!(t.lookup(&k, 14.0).map(|r| r.grade), Some(Grade::E));
    }

    #[test]
    fn next_band_is_smallest_higher_points() {
        let t = situps();
        let k = key(Station::SitUps, 13);
        let nb = t.next_band(&k, 3).map(|b| (b.grade, b.points));
        assert_eq!(nb, Some((Grade::B, 4)));
        assert_eq!(t.next_band(&k, 0).map(|b| b.grade), Some(Grade::E));
        assert!(t.next_band(&k, 5).is_none());
        assert_eq!(t.max_points(&k), Some(5));
    }

    #[test]
    fn duplicate_points_prefer_better_grade() {
        let rows = vec![
            row(Station::PullUps, Grade::C, 3, Some(5.0), None),
            row(Station::PullUps, Grade::B, 3, Some(7.0), None),
        ];
        let t = StandardsTable::from_rows(rows, &DomainCaps::default());
        let nb = t.next_band(&key(Station::PullUps, 13), 0).map(|b| b.grade);
        assert_eq!(nb, Some(Grade::B));
    }

    #[test]
    fn compile_skips_bad_rows() {
        let good = RawStandardRow {
            level: "secondary".into(),
            sex: "female".into(),
            age_min: "12".into(),
            age_max: "12".into(),
            station: "run".into(),
            grade: "A".into(),
            points: "5".into(),
            min: None,
            max: Some("11:00".into()),
            run_km: Some("2.4".into()),
        };
        let bad_time = RawStandardRow { max: Some("11:0".into()), ..good.clone() };
        let no_km = RawStandardRow { run_km: None, ..good.clone() };
        let (t, stats) = StandardsTable::compile(&[good, bad_time, no_km], &DomainCaps::default());
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.rows_accepted, 1);
        assert_eq!(stats.rows_skipped, 2);
        assert_eq!(stats.skipped_by_code.get("Row.BadTime"), Some(&1));
        assert_eq!(stats.groups, 1);
        assert_eq!(t.rows().len(), 1);
    }

    #[test]
    fn fractional_thresholds_never_compile() {
        let sr = |grade: &str, points: &str, min: &str, max: Option<&str>| RawStandardRow {
            level: "secondary".into(),
            sex: "male".into(),
            age_min: "13".into(),
            age_max: "13".into(),
            station: "sit_and_reach".into(),
            grade: grade.into(),
            points: points.into(),
            min: Some(min.into()),
            max: max.map(Into::into),
            run_km: None,
        };
        let (t, stats) = StandardsTable::compile(
            &[sr("A", "5", "32.5", None), sr("B", "4", "20", Some("32"))],
            &DomainCaps::default(),
        );
        assert_eq!(stats.skipped_by_code.get("Row.BadBound"), Some(&1));
        // Only whole-centimetre bands reach the cells, so floor indexing agrees with them.
        let k = key(Station::SitAndReach, 13);
        assert_eq!(t.lookup(&k, 32.7).map(|r| r.grade), Some(Grade::B));
        assert_eq!(t.max_points(&k), Some(4));
    }

    #[test]
    fn run_target_is_slowest_qualifying_second() {
        let rows = vec![
            row(Station::Run, Grade::A, 5, None, Some(585.5)),
            row(Station::Run, Grade::B, 4, Some(586.0), Some(630.0)),
        ];
        let t = StandardsTable::from_rows(rows, &DomainCaps::default());
        let k = key(Station::Run, 14);
        let band = t.next_band(&k, 4).map(|b| b.band).unwrap();
        let target = StandardsTable::target_value(Station::Run, &band).unwrap();
        assert_eq!(target, 585.0);
        assert_eq!(t.lookup(&k, target).map(|r| r.points), Some(5));
    }

    #[test]
    fn target_value_by_polarity() {
        assert_eq!(
            StandardsTable::target_value(Station::Run, &Band::new(Some(586.0), Some(630.0))),
            Some(630.0)
        );
        assert_eq!(
            StandardsTable::target_value(Station::SitAndReach, &Band::new(Some(32.5), None)),
            Some(33.0)
        );
    }
}
