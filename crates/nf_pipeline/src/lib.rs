//! nf_pipeline: deterministic grading surface (load → validate → compile → evaluate → targets → award → artifacts)
//! This crate stays free of file formats; CSV, canonical JSON and hashing go through `nf_io`,
//! lookups and award math through `nf_algo`.

#![forbid(unsafe_code)]

use serde::Serialize;
use thiserror::Error;

pub mod batch;
pub mod build_result;
pub mod build_run_record;
pub mod load;
pub mod table_handle;
pub mod validate;

pub use batch::{grade_batch, BatchOutput};
pub use build_result::{grade_participant, ParticipantDoc, ResultDoc};
pub use build_run_record::{build_run_record, RunRecordDoc};
pub use load::{compile_standards, load_policy_or_default, Engine, LoadReport};
pub use table_handle::{TableHandle, TableVersion};
pub use validate::{validate_standards, EntityRef, GroupRef, Severity, ValidationIssue, ValidationReport};

/// Engine identifiers (baked by the build system in real deployments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

/// Identifiers from `NF_ENGINE_*` at compile time, package defaults otherwise.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        vendor: option_env!("NF_ENGINE_VENDOR").unwrap_or("nf").to_string(),
        name: option_env!("NF_ENGINE_NAME").unwrap_or("nf_engine").to_string(),
        version: option_env!("NF_ENGINE_VERSION")
            .unwrap_or(env!("CARGO_PKG_VERSION"))
            .to_string(),
        build: option_env!("NF_ENGINE_BUILD").unwrap_or("dev").to_string(),
    }
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(String),
    #[error("input: {0}")]
    Input(String),
    #[error("policy: {0}")]
    Policy(String),
    #[error("build: {0}")]
    Build(String),
}

impl From<nf_io::IoError> for PipelineError {
    fn from(e: nf_io::IoError) -> Self {
        use nf_io::IoError;
        use PipelineError::*;
        match e {
            IoError::Path(m) => Io(format!("path: {m}")),
            IoError::Csv(m) => Input(format!("csv: {m}")),
            IoError::Json { pointer, msg } => Input(format!("json {pointer}: {msg}")),
            IoError::Invalid(m) => Input(m),
            IoError::Hash(m) => Build(format!("hash: {m}")),
        }
    }
}

impl From<nf_core::PolicyError> for PipelineError {
    fn from(e: nf_core::PolicyError) -> Self {
        PipelineError::Policy(e.to_string())
    }
}
