//! Batch grading: many participants against one table snapshot, in parallel.

use std::collections::BTreeMap;
use std::sync::Arc;

use nf_core::{AwardKind, Participant};
use rayon::prelude::*;
use tracing::info;

use crate::build_result::{grade_participant, ResultDoc};
use crate::load::Engine;
use crate::table_handle::TableVersion;
use crate::PipelineError;

#[derive(Debug)]
pub struct BatchOutput {
    /// The single table version every result was graded against.
    pub table: Arc<TableVersion>,
    /// Same order as the input participants.
    pub results: Vec<ResultDoc>,
}

impl BatchOutput {
    /// Result count per award label; every kind is present, zero included.
    pub fn award_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = [AwardKind::Gold, AwardKind::Silver, AwardKind::Bronze, AwardKind::NoAward]
            .into_iter()
            .map(|k| (k.label().to_string(), 0))
            .collect();
        for r in &self.results {
            *counts.entry(r.award.label().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Grade every participant. The snapshot is taken once, so a concurrent
/// reload never splits a batch across table versions.
pub fn grade_batch(engine: &Engine, participants: &[Participant]) -> Result<BatchOutput, PipelineError> {
    let table = engine.snapshot();
    let results = participants
        .par_iter()
        .map(|p| grade_participant(&table, &engine.policy, p))
        .collect::<Result<Vec<_>, _>>()?;

    let output = BatchOutput { table, results };
    let counts = output.award_counts();
    info!(
        participants = output.results.len(),
        table = %output.table.table_id,
        awards = ?counts,
        "batch graded"
    );
    Ok(output)
}
