// crates/nf_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Grading algorithms over an immutable, compiled standards table.
//!
//! Pure and synchronous: no I/O, no globals. A compiled `StandardsTable` is
//! read-only and can be shared across threads behind an `Arc`.

// ----------------------------- Standards table -----------------------------

pub mod table;

pub use table::{CompileStats, GroupKey, ScoredBand, StandardsTable};

// ----------------------------- Evaluation & derived outputs ----------------

pub mod award;
pub mod evaluate;
pub mod targets;

pub use award::derive_award;
pub use evaluate::{evaluate, evaluate_station, native_value};
pub use targets::{next_target, next_targets, TargetStatus};

#[cfg(test)]
mod test_support;
