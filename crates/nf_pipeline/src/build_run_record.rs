//! RunRecord: what a batch ran on and what it produced.
//!
//! - Engine meta is recorded verbatim (vendor/name/version/build).
//! - Inputs are named by digest: table id, standards file, roster file, policy.
//! - Run ID = `RUN:<UTC timestamp>-<first 16 hex of SHA-256 over the record without id>`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nf_algo::CompileStats;
use nf_io::{sha256_canonical, hasher::short_hex};
use serde::Serialize;

use crate::batch::BatchOutput;
use crate::load::LoadReport;
use crate::validate::Severity;
use crate::{EngineMeta, PipelineError};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunInputs {
    pub table_id: String,
    pub standards_sha256: Option<String>,
    pub participants_sha256: Option<String>,
    pub policy_sha256: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunCounts {
    pub participants: usize,
    /// Roster records that could not be read.
    pub skipped: usize,
    pub awards: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub pass: bool,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunRecordDoc {
    pub id: String,
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub inputs: RunInputs,
    pub counts: RunCounts,
    pub compile: CompileStats,
    pub validation: ValidationSummary,
    /// Result ids in roster order.
    pub outputs: Vec<String>,
}

#[derive(Serialize)]
struct RunNoId<'a> {
    timestamp_utc: &'a str,
    engine: &'a EngineMeta,
    inputs: &'a RunInputs,
    counts: &'a RunCounts,
    compile: &'a CompileStats,
    validation: &'a ValidationSummary,
    outputs: &'a [String],
}

pub fn build_run_record(
    engine_meta: &EngineMeta,
    load: &LoadReport,
    batch: &BatchOutput,
    policy_sha256: &str,
    participants_sha256: Option<String>,
    skipped: usize,
    now: DateTime<Utc>,
) -> Result<RunRecordDoc, PipelineError> {
    let timestamp_utc = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let inputs = RunInputs {
        table_id: batch.table.table_id.clone(),
        standards_sha256: batch.table.source_sha256.clone(),
        participants_sha256,
        policy_sha256: policy_sha256.to_string(),
    };
    let counts = RunCounts { participants: batch.results.len(), skipped, awards: batch.award_counts() };
    let validation = ValidationSummary {
        pass: load.validation.pass,
        errors: load.validation.count(Severity::Error),
        warnings: load.validation.count(Severity::Warning),
    };
    let outputs: Vec<String> = batch.results.iter().map(|r| r.id.clone()).collect();

    let digest = sha256_canonical(&RunNoId {
        timestamp_utc: &timestamp_utc,
        engine: engine_meta,
        inputs: &inputs,
        counts: &counts,
        compile: &load.stats,
        validation: &validation,
        outputs: &outputs,
    })?;
    let id = format!("RUN:{}-{}", now.format("%Y%m%dT%H%M%SZ"), short_hex(&digest, 16)?);

    Ok(RunRecordDoc {
        id,
        timestamp_utc,
        engine: engine_meta.clone(),
        inputs,
        counts,
        compile: load.stats.clone(),
        validation,
        outputs,
    })
}
