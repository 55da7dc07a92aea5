//! Grading policy loader (JSON). Missing keys fall back to the defaults;
//! the result must pass `validate_domains()`.

use std::fs;
use std::path::Path;

use nf_core::GradingPolicy;

use crate::{IoError, IoResult};

pub fn parse_policy(text: &str) -> IoResult<GradingPolicy> {
    let policy: GradingPolicy = serde_json::from_str(text).map_err(|e| IoError::Json {
        pointer: format!("line {} col {}", e.line(), e.column()),
        msg: e.to_string(),
    })?;
    policy.validate_domains().map_err(|e| IoError::Invalid(e.to_string()))?;
    Ok(policy)
}

pub fn load_policy(path: &Path) -> IoResult<GradingPolicy> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    parse_policy(&text)
}
