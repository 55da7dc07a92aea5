// crates/nf_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, the validate-only short-circuit
// and the full run path (engine meta → load → grade → artifacts → optional reports).

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const IO: u8 = 4;
    pub const ENGINE: u8 = 5;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use nf_io::canonical_json::write_canonical_file;
use nf_io::{load_participants, sha256_file};
use nf_pipeline::{
    build_run_record, engine_identifiers, grade_batch, load_policy_or_default, validate_standards, Engine,
    PipelineError, ResultDoc, RunRecordDoc,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, CliError};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug, Error)]
enum MainError {
    /// Malformed inputs, failing validation, inconsistent policy
    #[error("validation: {0}")]
    Validation(String),
    /// Read/write/path errors
    #[error("io: {0}")]
    Io(String),
    /// Hashing, report assembly, anything the engine itself got wrong
    #[error("engine: {0}")]
    Engine(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("napfa: error: {e}");
            let rc = match e {
                CliError::NotFound(_) => exitcodes::IO,
                _ => exitcodes::VALIDATION,
            };
            return ExitCode::from(rc);
        }
    };
    init_tracing(args.quiet);

    let outcome = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    match outcome {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("napfa: error: {e}");
            ExitCode::from(map_error(&e))
        }
    }
}

/// stderr only; stdout carries JSON. `--quiet` pins the level to warn.
fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn map_error(e: &MainError) -> u8 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
        MainError::Engine(_) => exitcodes::ENGINE,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(m) => MainError::Io(m),
        PipelineError::Input(m) | PipelineError::Policy(m) => MainError::Validation(m),
        PipelineError::Build(m) => MainError::Engine(m),
    }
}

fn map_io_err(e: nf_io::IoError) -> MainError {
    map_pipeline_err(PipelineError::from(e))
}

/// Validate-only path: no grading, no artifacts. The report goes to stdout.
/// Exit 0 when it passes, 2 when it has errors.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let policy = load_policy_or_default(args.policy.as_deref()).map_err(map_pipeline_err)?;
    let source = nf_io::load_standards(&args.standards).map_err(map_io_err)?;
    let report = validate_standards(&source, &policy.domain_caps);

    let text = serde_json::to_string_pretty(&report).map_err(|e| MainError::Engine(e.to_string()))?;
    println!("{text}");

    if report.pass {
        Ok(())
    } else {
        Err(MainError::Validation(format!("{} issue(s) in standards table", report.issues.len())))
    }
}

fn run_once(args: &Args) -> Result<(), MainError> {
    // 1) Engine metadata (compile-time env where available)
    let engine_meta = engine_identifiers();

    // 2) Standards + policy. A failing validation report is logged, not fatal:
    //    the table compiles from the rows that typed cleanly.
    let (engine, load) = Engine::load(&args.standards, args.policy.as_deref()).map_err(map_pipeline_err)?;
    if !load.validation.pass {
        warn!(issues = load.validation.issues.len(), "standards table has validation errors; grading continues");
    }

    // 3) Participants
    let (roster, participants_sha256, skipped) = match &args.participants {
        Some(path) => {
            let digest = sha256_file(path).map_err(map_io_err)?;
            let loaded = load_participants(path).map_err(map_io_err)?;
            (loaded.rows, Some(digest), loaded.skipped.len())
        }
        None => {
            let p = args
                .single_participant()
                .map_err(|e| MainError::Validation(e.to_string()))?;
            (vec![p], None, 0)
        }
    };

    // 4) Grade
    let batch = grade_batch(&engine, &roster).map_err(map_pipeline_err)?;
    let run = build_run_record(
        &engine_meta,
        &load,
        &batch,
        &engine.policy_sha256,
        participants_sha256,
        skipped,
        Utc::now(),
    )
    .map_err(map_pipeline_err)?;

    // 5) Artifacts
    write_artifacts(&args.out, args.participants.is_none(), &batch.results, &run, &load)?;

    // 6) Optional reports
    maybe_render_reports(args, &batch.results, &run)?;

    let summary = serde_json::to_string_pretty(&run).map_err(|e| MainError::Engine(e.to_string()))?;
    println!("{summary}");
    info!(out = %args.out.display(), run = %run.id, "artifacts written");
    Ok(())
}

fn write_artifacts(
    out_dir: &Path,
    single: bool,
    results: &[ResultDoc],
    run: &RunRecordDoc,
    load: &nf_pipeline::LoadReport,
) -> Result<(), MainError> {
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    match results {
        [one] if single => write_canonical_file(&out_dir.join("result.json"), one),
        _ => write_canonical_file(&out_dir.join("results.json"), &results),
    }
    .map_err(|e| MainError::Io(format!("write results: {e}")))?;

    write_canonical_file(&out_dir.join("run_record.json"), run)
        .map_err(|e| MainError::Io(format!("write run_record.json: {e}")))?;
    write_canonical_file(&out_dir.join("validation.json"), &load.validation)
        .map_err(|e| MainError::Io(format!("write validation.json: {e}")))?;
    Ok(())
}

fn maybe_render_reports(args: &Args, results: &[ResultDoc], run: &RunRecordDoc) -> Result<(), MainError> {
    if args.render.is_empty() {
        return Ok(());
    }
    let models = nf_report::build_models(results, Some(run)).map_err(|e| MainError::Engine(e.to_string()))?;

    for fmt in &args.render {
        match fmt.as_str() {
            "json" => render_json_report(&models, &args.out)?,
            "html" => render_html_report(&models, &args.out)?,
            other => return Err(MainError::Validation(format!("unknown renderer: {other}"))),
        }
    }
    Ok(())
}

// Always accept the concrete model type; gate body by feature.
fn render_json_report(models: &[nf_report::ReportModel], out_dir: &Path) -> Result<(), MainError> {
    #[cfg(feature = "report-json")]
    {
        use nf_io::canonical_json::write_atomic;
        let text = nf_report::render_json(models).map_err(|e| MainError::Engine(e.to_string()))?;
        write_atomic(&out_dir.join("report.json"), text.as_bytes()).map_err(|e| MainError::Io(format!("write report.json: {e}")))
    }
    #[cfg(not(feature = "report-json"))]
    {
        let _ = (models, out_dir);
        Err(MainError::Validation("json renderer not enabled (build with feature `report-json`)".into()))
    }
}

fn render_html_report(models: &[nf_report::ReportModel], out_dir: &Path) -> Result<(), MainError> {
    #[cfg(feature = "report-html")]
    {
        use nf_io::canonical_json::write_atomic;
        write_atomic(&out_dir.join("report.html"), nf_report::render_html(models).as_bytes())
            .map_err(|e| MainError::Io(format!("write report.html: {e}")))
    }
    #[cfg(not(feature = "report-html"))]
    {
        let _ = (models, out_dir);
        Err(MainError::Validation("html renderer not enabled (build with feature `report-html`)".into()))
    }
}
