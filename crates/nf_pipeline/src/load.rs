//! LOAD stage: standards source → validation report → compiled table + `STD:` id;
//! policy file (or defaults) → validated policy + digest.
//!
//! Validation never blocks compilation. Callers decide what a failing report means.

use std::path::Path;
use std::sync::Arc;

use nf_algo::{CompileStats, StandardsTable};
use nf_core::{DomainCaps, GradingPolicy, RawStandardRow};
use nf_io::{sha256_canonical, sha256_file, std_id_from_rows, Loaded};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::table_handle::{TableHandle, TableVersion};
use crate::validate::{validate_standards, Severity, ValidationReport};
use crate::PipelineError;

/// What loading one standards source produced, besides the table itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadReport {
    pub table_id: String,
    pub stats: CompileStats,
    pub validation: ValidationReport,
}

/// Validate, compile and fingerprint a standards source.
pub fn compile_standards(
    source: &Loaded<RawStandardRow>,
    caps: &DomainCaps,
    source_sha256: Option<String>,
) -> Result<(TableVersion, LoadReport), PipelineError> {
    let validation = validate_standards(source, caps);
    for issue in &validation.issues {
        match issue.severity {
            Severity::Error => warn!(code = issue.code, at = ?issue.where_, "{}", issue.message),
            Severity::Warning => debug!(code = issue.code, at = ?issue.where_, "{}", issue.message),
        }
    }
    info!(
        pass = validation.pass,
        errors = validation.count(Severity::Error),
        warnings = validation.count(Severity::Warning),
        "standards validated"
    );

    let (table, stats) = StandardsTable::compile(&source.rows, caps);
    let table_id = std_id_from_rows(table.rows())?;
    let report = LoadReport { table_id: table_id.clone(), stats, validation };
    Ok((TableVersion { table_id, source_sha256, table }, report))
}

fn compile_standards_file(path: &Path, caps: &DomainCaps) -> Result<(TableVersion, LoadReport), PipelineError> {
    let digest = sha256_file(path)?;
    let source = nf_io::load_standards(path)?;
    compile_standards(&source, caps, Some(digest))
}

/// Policy from a JSON file, or the normative defaults.
pub fn load_policy_or_default(path: Option<&Path>) -> Result<GradingPolicy, PipelineError> {
    match path {
        Some(p) => Ok(nf_io::load_policy(p)?),
        None => Ok(GradingPolicy::default()),
    }
}

/// A ready-to-grade engine: the current table plus the policy it is graded under.
#[derive(Debug)]
pub struct Engine {
    pub tables: TableHandle,
    pub policy: GradingPolicy,
    /// SHA-256 over the canonical policy JSON (defaults included).
    pub policy_sha256: String,
}

impl Engine {
    /// Build from an in-memory source.
    pub fn from_source(
        source: &Loaded<RawStandardRow>,
        policy: GradingPolicy,
    ) -> Result<(Self, LoadReport), PipelineError> {
        policy.validate_domains()?;
        let (version, report) = compile_standards(source, &policy.domain_caps, None)?;
        Ok((Self::assemble(version, policy)?, report))
    }

    /// Build from a standards CSV and an optional policy JSON.
    pub fn load(standards: &Path, policy: Option<&Path>) -> Result<(Self, LoadReport), PipelineError> {
        let policy = load_policy_or_default(policy)?;
        policy.validate_domains()?;
        let (version, report) = compile_standards_file(standards, &policy.domain_caps)?;
        Ok((Self::assemble(version, policy)?, report))
    }

    fn assemble(version: TableVersion, policy: GradingPolicy) -> Result<Self, PipelineError> {
        let policy_sha256 = sha256_canonical(&policy)?;
        Ok(Self { tables: TableHandle::new(version), policy, policy_sha256 })
    }

    /// Recompile from disk and swap the table in. In-flight snapshots keep the old one.
    pub fn reload_standards(&self, path: &Path) -> Result<LoadReport, PipelineError> {
        let (version, report) = compile_standards_file(path, &self.policy.domain_caps)?;
        self.tables.replace(version);
        Ok(report)
    }

    pub fn snapshot(&self) -> Arc<TableVersion> {
        self.tables.snapshot()
    }
}
