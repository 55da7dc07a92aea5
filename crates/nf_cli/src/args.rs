// crates/nf_cli/src/args.rs
//
// Offline CLI argument surface.
// - Required: --standards (CSV)
// - Participants: --participants CSV  XOR  single-participant flags
//   (--level --sex and --age | --dob + --test-date, plus station values)
// - Optional: --policy JSON, --out dir, --render [json|html]*
// - No networked paths (reject any scheme:// like http/https/file)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use nf_core::{Level, Measurements, Participant, Sex, Station};
use nf_io::participants::{parse_measurement, resolve_age};
use thiserror::Error;

const SINGLE_FLAGS: [&str; 12] = [
    "id",
    "level",
    "sex",
    "age",
    "dob",
    "test_date",
    "situps",
    "broad_jump",
    "sit_and_reach",
    "pullups",
    "shuttle_run",
    "run",
];

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "napfa",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic fitness-test grading"
)]
pub struct Args {
    /// Standards table CSV.
    #[arg(long)]
    pub standards: PathBuf,

    /// Grading policy JSON (award thresholds, run-distance age, domain caps).
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Participant roster CSV (mutually exclusive with the single-participant flags).
    #[arg(long, conflicts_with_all = SINGLE_FLAGS)]
    pub participants: Option<PathBuf>,

    // --- Single participant ---
    #[arg(long)]
    pub id: Option<String>,
    /// primary | secondary
    #[arg(long)]
    pub level: Option<String>,
    /// male | female
    #[arg(long)]
    pub sex: Option<String>,
    #[arg(long, conflicts_with = "dob")]
    pub age: Option<u8>,
    /// Date of birth, YYYY-MM-DD.
    #[arg(long, requires = "test_date")]
    pub dob: Option<String>,
    /// Test date, YYYY-MM-DD.
    #[arg(long, requires = "dob")]
    pub test_date: Option<String>,

    /// Sit-ups, reps.
    #[arg(long)]
    pub situps: Option<String>,
    /// Standing broad jump, cm.
    #[arg(long)]
    pub broad_jump: Option<String>,
    /// Sit-and-reach, cm.
    #[arg(long)]
    pub sit_and_reach: Option<String>,
    /// Pull-ups, reps.
    #[arg(long)]
    pub pullups: Option<String>,
    /// Shuttle run, seconds.
    #[arg(long)]
    pub shuttle_run: Option<String>,
    /// Run time in minutes (e.g. 9.75) or M:SS.
    #[arg(long)]
    pub run: Option<String>,

    // --- Output & rendering ---
    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Renderer(s) to emit. Omit to skip rendering.
    #[arg(long, value_parser = ["json", "html"], num_args = 0..=2)]
    pub render: Vec<String>,

    /// Validate the standards table only; print the report and exit.
    #[arg(long)]
    pub validate_only: bool,

    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing required flag: {0}")]
    Missing(&'static str),
    #[error("path must be local file (no scheme): {0}")]
    NonLocalPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid participant: {0}")]
    Participant(String),
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    check(Args::parse())
}

fn check(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    ensure_local_exists(&args.standards, "--standards")?;
    if let Some(p) = &args.policy {
        ensure_local_exists(p, "--policy")?;
    }
    if !args.validate_only {
        match &args.participants {
            Some(p) => ensure_local_exists(p, "--participants")?,
            None => {
                if args.level.is_none() {
                    return Err(CliError::Missing("--participants or --level"));
                }
                if args.sex.is_none() {
                    return Err(CliError::Missing("--sex"));
                }
                if args.age.is_none() && args.dob.is_none() {
                    return Err(CliError::Missing("--age or --dob/--test-date"));
                }
            }
        }
    }

    args.standards = normalize_path(&args.standards);
    args.policy = args.policy.take().map(|p| normalize_path(&p));
    args.participants = args.participants.take().map(|p| normalize_path(&p));
    args.out = normalize_path(&args.out);
    Ok(args)
}

impl Args {
    /// The participant described by the single-participant flags.
    pub fn single_participant(&self) -> Result<Participant, CliError> {
        let bad = |e: &dyn std::fmt::Display| CliError::Participant(e.to_string());

        let level: Level = self.level.as_deref().ok_or(CliError::Missing("--level"))?.parse().map_err(|e| bad(&e))?;
        let sex: Sex = self.sex.as_deref().ok_or(CliError::Missing("--sex"))?.parse().map_err(|e| bad(&e))?;
        let age_text = self.age.map(|a| a.to_string());
        let age = resolve_age(age_text.as_deref(), self.dob.as_deref(), self.test_date.as_deref())
            .map_err(|e| bad(&e))?;

        let cells = [
            (Station::SitUps, &self.situps),
            (Station::BroadJump, &self.broad_jump),
            (Station::SitAndReach, &self.sit_and_reach),
            (Station::PullUps, &self.pullups),
            (Station::ShuttleRun, &self.shuttle_run),
            (Station::Run, &self.run),
        ];
        let mut measurements = Measurements::new();
        for (station, cell) in cells {
            if let Some(v) = parse_measurement(station, cell.as_deref().unwrap_or("")).map_err(|e| bad(&e))? {
                measurements.set(station, v);
            }
        }

        Ok(Participant {
            id: self.id.clone().unwrap_or_else(|| "participant".to_string()),
            level,
            sex,
            age,
            measurements,
        })
    }
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        Some(args.standards.as_path()),
        args.policy.as_deref(),
        args.participants.as_deref(),
        Some(args.out.as_path()),
    ]
    .into_iter()
    .flatten()
}

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), produce an absolute path relative to CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
