//! nf_core: core types for the fitness grading engine.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`nf_io`, `nf_algo`, `nf_pipeline`, `nf_report`, `nf_cli`).
//!
//! - Stations and their polarity (higher/lower is better)
//! - Grades (A..E, total order) and award kinds
//! - Participant context: level, sex, age, derived run distance
//! - `M:SS` time parsing/formatting
//! - Raw (wire) and typed standard rows
//! - Grading policy (award thresholds, domain caps)
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod entities;
pub mod grade;
pub mod participant;
pub mod policy;
pub mod rows;
pub mod station;
pub mod time;

pub mod errors {
    use thiserror::Error;

    /// Token parsing errors for core enums.
    #[derive(Clone, Debug, Eq, PartialEq, Error)]
    pub enum CoreError {
        #[error("unknown level: {0}")]
        UnknownLevel(String),
        #[error("unknown sex: {0}")]
        UnknownSex(String),
        #[error("unknown station: {0}")]
        UnknownStation(String),
        #[error("unknown grade: {0}")]
        UnknownGrade(String),
        #[error("invalid run distance: {0}")]
        InvalidRunDistance(String),
    }
}

/// Normalize a free-form token: lowercase, strip `_`, `-`, `.` and spaces.
pub(crate) fn fold_token(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub use entities::{Award, EvaluationResult, Measurements, NextTarget, Participant, StationResult};
pub use errors::CoreError;
pub use grade::{AwardKind, Grade};
pub use participant::{age_at, Level, ParticipantContext, RunDistance, Sex};
pub use policy::{AwardTier, DomainCaps, GradingPolicy, PolicyError};
pub use rows::{Band, RawStandardRow, RowError, StandardRow};
pub use station::{Polarity, Station};
