//! Standards fixture for integration tests.
#![allow(dead_code)]

use nf_algo::StandardsTable;
use nf_core::{DomainCaps, RawStandardRow};

// level,sex,age_min,age_max,station,grade,points,min,max,run_km
pub const STANDARDS: &str = "\
secondary,male,13,14,situps,A,5,38,,
secondary,male,13,14,situps,B,4,35,37,
secondary,male,13,14,situps,C,3,31,34,
secondary,male,13,14,situps,D,2,27,30,
secondary,male,13,14,situps,E,1,23,26,
secondary,male,13,14,broad_jump,A,5,230,,
secondary,male,13,14,broad_jump,B,4,220,229,
secondary,male,13,14,broad_jump,C,3,210,219,
secondary,male,13,14,broad_jump,D,2,200,209,
secondary,male,13,14,broad_jump,E,1,190,199,
secondary,male,13,14,sit_and_reach,A,5,40,,
secondary,male,13,14,sit_and_reach,B,4,37,39,
secondary,male,13,14,sit_and_reach,C,3,33,36,
secondary,male,13,14,sit_and_reach,D,2,29,32,
secondary,male,13,14,sit_and_reach,E,1,25,28,
secondary,male,13,14,pullups,A,5,7,,
secondary,male,13,14,pullups,B,4,5,6,
secondary,male,13,14,pullups,C,3,4,4,
secondary,male,13,14,pullups,D,2,2,3,
secondary,male,13,14,pullups,E,1,1,1,
secondary,male,13,14,shuttle_run,A,5,,10.2,
secondary,male,13,14,shuttle_run,B,4,10.3,10.6,
secondary,male,13,14,shuttle_run,C,3,10.7,11.0,
secondary,male,13,14,shuttle_run,D,2,11.1,11.4,
secondary,male,13,14,shuttle_run,E,1,11.5,11.8,
secondary,male,13,14,run,A,5,8:00,9:45,2.4
secondary,male,13,14,run,B,4,9:46,10:30,2.4
secondary,male,13,14,run,C,3,10:31,11:15,2.4
secondary,male,13,14,run,D,2,11:16,12:00,2.4
secondary,male,13,14,run,E,1,12:01,12:45,2.4
primary,male,11,12,run,A,5,6:30,7:30,1.6
primary,male,11,12,run,B,4,7:31,8:10,1.6
primary,male,11,12,run,E,1,8:11,9:30,1.6
primary,male,11,12,run,A,5,9:00,10:30,2.4
primary,male,11,12,run,B,4,10:31,11:30,2.4
";

fn opt(cell: &str) -> Option<String> {
    (!cell.is_empty()).then(|| cell.to_string())
}

pub fn rows_where(keep: impl Fn(&str) -> bool) -> Vec<RawStandardRow> {
    STANDARDS
        .lines()
        .filter(|l| !l.trim().is_empty() && keep(l))
        .map(|line| {
            let c: Vec<&str> = line.split(',').collect();
            RawStandardRow {
                level: c[0].into(),
                sex: c[1].into(),
                age_min: c[2].into(),
                age_max: c[3].into(),
                station: c[4].into(),
                grade: c[5].into(),
                points: c[6].into(),
                min: opt(c[7]),
                max: opt(c[8]),
                run_km: opt(c[9]),
            }
        })
        .collect()
}

pub fn table() -> StandardsTable {
    StandardsTable::compile(&rows_where(|_| true), &DomainCaps::default()).0
}
