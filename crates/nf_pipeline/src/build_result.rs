//! BUILD stage for one participant: evaluate → next targets → award → `ResultDoc`.
//!
//! The result id is `RES:` + SHA-256 over the canonical JSON of the document
//! without its id, so the same inputs graded against the same table always
//! produce the same id.

use std::collections::BTreeMap;

use nf_algo::{derive_award, evaluate, next_targets};
use nf_core::{
    Award, EvaluationResult, GradingPolicy, Level, Measurements, NextTarget, Participant, RunDistance, Sex,
    Station,
};
use nf_io::res_id_from_canonical;
use serde::Serialize;
use tracing::debug;

use crate::table_handle::TableVersion;
use crate::PipelineError;

/// Who was graded, with the run distance actually applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipantDoc {
    pub id: String,
    pub level: Level,
    pub sex: Sex,
    pub age: u8,
    pub run_km: RunDistance,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultDoc {
    pub id: String,
    pub table_id: String,
    pub participant: ParticipantDoc,
    pub measurements: Measurements,
    pub result: EvaluationResult,
    pub targets: BTreeMap<Station, Option<NextTarget>>,
    pub award: Award,
}

/// Hash input: every field but `id`.
#[derive(Serialize)]
struct ResultNoId<'a> {
    table_id: &'a str,
    participant: &'a ParticipantDoc,
    measurements: &'a Measurements,
    result: &'a EvaluationResult,
    targets: &'a BTreeMap<Station, Option<NextTarget>>,
    award: &'a Award,
}

/// Grade one participant against one table version.
pub fn grade_participant(
    version: &TableVersion,
    policy: &GradingPolicy,
    participant: &Participant,
) -> Result<ResultDoc, PipelineError> {
    let ctx = participant.context(policy.long_run_age);
    let result = evaluate(&version.table, &ctx, &participant.measurements);
    let targets = next_targets(&version.table, &ctx, &result);
    let award = derive_award(&result, policy);

    let participant_doc = ParticipantDoc {
        id: participant.id.clone(),
        level: ctx.level,
        sex: ctx.sex,
        age: ctx.age,
        run_km: ctx.run_distance,
    };
    let id = res_id_from_canonical(&ResultNoId {
        table_id: &version.table_id,
        participant: &participant_doc,
        measurements: &participant.measurements,
        result: &result,
        targets: &targets,
        award: &award,
    })?;
    debug!(participant = %participant.id, total = result.total_points, award = award.label(), "graded");

    Ok(ResultDoc {
        id,
        table_id: version.table_id.clone(),
        participant: participant_doc,
        measurements: participant.measurements.clone(),
        result,
        targets,
        award,
    })
}
