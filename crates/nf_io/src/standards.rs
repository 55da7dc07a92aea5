//! Standards CSV loader.
//!
//! Header-based: `level, sex, age_min, age_max, station, grade, points, min, max, run_km`.
//! Cells are whitespace-trimmed; empty `min`/`max`/`run_km` cells are `None`.
//! Typing (enum tokens, `M:SS`, bounds) happens later in `StandardRow::try_from`,
//! so this loader only drops records the CSV layer itself cannot read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use nf_core::RawStandardRow;
use tracing::{info, warn};

use crate::{IoError, IoResult, Loaded, SkippedRecord};

pub const STANDARDS_HEADERS: [&str; 10] = [
    "level", "sex", "age_min", "age_max", "station", "grade", "points", "min", "max", "run_km",
];

/// Read raw standards rows from any reader.
pub fn read_standards<R: Read>(reader: R) -> IoResult<Loaded<RawStandardRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for required in &STANDARDS_HEADERS[..7] {
        if !headers.iter().any(|h| h == *required) {
            return Err(IoError::Csv(format!("standards header missing column '{required}'")));
        }
    }

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    let mut skipped = Vec::new();
    for rec in rdr.records() {
        let record = match rec {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                warn!(line, error = %e, "unreadable standards record");
                skipped.push(SkippedRecord { line, reason: e.to_string() });
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        match record.deserialize::<RawStandardRow>(Some(&headers)) {
            Ok(row) => {
                rows.push(row);
                lines.push(line);
            }
            Err(e) => {
                warn!(line, error = %e, "unreadable standards record");
                skipped.push(SkippedRecord { line, reason: e.to_string() });
            }
        }
    }
    info!(rows = rows.len(), skipped = skipped.len(), "standards source read");
    Ok(Loaded { rows, lines, skipped })
}

/// Read raw standards rows from a CSV file.
pub fn load_standards(path: &Path) -> IoResult<Loaded<RawStandardRow>> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    read_standards(f)
}
