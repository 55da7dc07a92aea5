use std::fs;

use nf_core::{RawStandardRow, StandardRow};
use nf_io::{load_standards, std_id_from_rows};

fn typed(rows: &[RawStandardRow]) -> Vec<StandardRow> {
    rows.iter().filter_map(|r| StandardRow::try_from(r).ok()).collect()
}

#[test]
fn table_id_is_stable_across_cosmetic_csv_changes() {
    let dir = tempfile::tempdir().unwrap();
    let tidy = dir.path().join("tidy.csv");
    let messy = dir.path().join("messy.csv");
    fs::write(
        &tidy,
        "level,sex,age_min,age_max,station,grade,points,min,max,run_km\n\
         secondary,male,13,14,run,A,5,,9:45,2.4\n\
         secondary,male,13,14,situps,A,5,38,,\n",
    )
    .unwrap();
    fs::write(
        &messy,
        "level,sex,age_min,age_max,station,grade,points,min,max,run_km\n\
         Secondary , Male ,13,14,Run,a,5,,9:45,2.4km\n\
         SEC,m,13,14,sit-ups,A,5,38.0,,\n",
    )
    .unwrap();

    let a = load_standards(&tidy).unwrap();
    let b = load_standards(&messy).unwrap();
    assert_eq!(typed(&a.rows).len(), 2);
    assert_eq!(
        std_id_from_rows(&typed(&a.rows)).unwrap(),
        std_id_from_rows(&typed(&b.rows)).unwrap()
    );
}

#[test]
fn missing_file_is_a_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_standards(&dir.path().join("absent.csv")).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}
