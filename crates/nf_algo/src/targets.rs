//! Next-target computation: the minimal raw performance that moves each
//! station into the next-higher-points band.

use std::collections::BTreeMap;

use nf_core::time::format_mmss;
use nf_core::{EvaluationResult, NextTarget, ParticipantContext, Station};
use tracing::debug;

use crate::table::{GroupKey, StandardsTable};

/// Why a station has (or lacks) a target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetStatus {
    Available,
    /// Group exists but nothing scores higher.
    AtMaximum,
    /// No group for this context/station.
    NoData,
}

/// Target for one station, with its status.
pub fn next_target(
    table: &StandardsTable,
    ctx: &ParticipantContext,
    station: Station,
    current_points: u32,
) -> (TargetStatus, Option<NextTarget>) {
    let key = GroupKey::for_context(ctx, station);
    if !table.contains(&key) {
        return (TargetStatus::NoData, None);
    }
    let Some(band) = table.next_band(&key, current_points) else {
        return (TargetStatus::AtMaximum, None);
    };
    let Some(target) = StandardsTable::target_value(station, &band.band) else {
        // Lower-is-better band with neither bound; rows like that never compile.
        return (TargetStatus::NoData, None);
    };
    let target_mmss = (station == Station::Run).then(|| format_mmss(target as u32));
    (
        TargetStatus::Available,
        Some(NextTarget { station, target, target_mmss, grade: band.grade, points: band.points }),
    )
}

/// Every station gets an entry; `None` when already at the top band or no data.
/// Stations without a result start from 0 points.
pub fn next_targets(
    table: &StandardsTable,
    ctx: &ParticipantContext,
    result: &EvaluationResult,
) -> BTreeMap<Station, Option<NextTarget>> {
    Station::ALL
        .into_iter()
        .map(|station| {
            let current = result.get(station).map_or(0, |r| r.points);
            let (status, target) = next_target(table, ctx, station, current);
            if status != TargetStatus::Available {
                debug!(%station, current, ?status, "no next target");
            }
            (station, target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::evaluate;
    use crate::test_support::sample_table;
    use nf_core::{Band, DomainCaps, Grade, Level, Measurements, RunDistance, Sex, StandardRow};

    #[test]
    fn run_target_is_band_max_in_mmss() {
        let table = sample_table();
        let ctx = ParticipantContext::new(Level::Secondary, Sex::Male, 14);
        let m = Measurements::new().with(Station::Run, 10.0);
        let r = evaluate(&table, &ctx, &m);
        assert_eq!(r.get(Station::Run).map(|x| x.grade), Some(Grade::B));
        let t = next_targets(&table, &ctx, &r);
        let run = t[&Station::Run].clone().unwrap();
        assert_eq!(run.target, 585.0);
        assert_eq!(run.target_mmss.as_deref(), Some("9:45"));
        assert_eq!(run.grade, Grade::A);
    }

    #[test]
    fn missing_station_targets_lowest_band() {
        let table = sample_table();
        let ctx = ParticipantContext::new(Level::Secondary, Sex::Male, 13);
        let r = evaluate(&table, &ctx, &Measurements::new());
        let t = next_targets(&table, &ctx, &r);
        let pull = t[&Station::PullUps].clone().unwrap();
        assert_eq!((pull.target, pull.grade, pull.points), (1.0, Grade::E, 1));
        assert_eq!(pull.target_mmss, None);
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn top_band_and_missing_group_have_no_target() {
        let table = sample_table();
        let ctx = ParticipantContext::new(Level::Secondary, Sex::Male, 14);
        assert_eq!(next_target(&table, &ctx, Station::SitUps, 5), (TargetStatus::AtMaximum, None));
        let nobody = ParticipantContext::new(Level::Primary, Sex::Female, 9);
        assert_eq!(next_target(&table, &nobody, Station::SitUps, 0), (TargetStatus::NoData, None));
    }

    #[test]
    fn run_mmss_names_a_second_inside_the_band() {
        let band = |grade, points, min, max| StandardRow {
            level: Level::Secondary,
            sex: Sex::Male,
            age_min: 14,
            age_max: 14,
            station: Station::Run,
            grade,
            points,
            band: Band::new(min, max),
            run_km: Some(RunDistance::Km2_4),
        };
        let table = StandardsTable::from_rows(
            vec![band(Grade::A, 5, None, Some(585.5)), band(Grade::B, 4, Some(586.0), Some(630.0))],
            &DomainCaps::default(),
        );
        let ctx = ParticipantContext::new(Level::Secondary, Sex::Male, 14);
        let r = evaluate(&table, &ctx, &Measurements::new().with(Station::Run, 10.0));
        let t = next_targets(&table, &ctx, &r)[&Station::Run].clone().unwrap();
        assert_eq!((t.target, t.target_mmss.as_deref(), t.points), (585.0, Some("9:45"), 5));

        let hit = evaluate(&table, &ctx, &Measurements::new().with(Station::Run, t.target / 60.0));
        assert_eq!(hit.get(Station::Run).map(|x| x.points), Some(t.points));
    }

    #[test]
    fn shuttle_target_is_band_max() {
        let table = sample_table();
        let ctx = ParticipantContext::new(Level::Secondary, Sex::Male, 13);
        let (status, t) = next_target(&table, &ctx, Station::ShuttleRun, 3);
        assert_eq!(status, TargetStatus::Available);
        let t = t.unwrap();
        assert_eq!((t.target, t.grade), (10.6, Grade::B));
    }
}
