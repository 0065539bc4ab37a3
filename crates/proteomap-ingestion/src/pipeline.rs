//! Generation run: Normalise → Merge → Validate for every entity type.
//!
//! Entity types run in dependency order so that associations and
//! therapies can be checked against the diseases and proteins that were
//! actually accepted:
//!   1. diseases (truncated to `max_diseases`, earliest kept)
//!   2. proteins
//!   3. associations (disease + protein references, strength threshold)
//!   4. therapies (protein reference)
//!   5. trials

use tracing::info;

use proteomap_common::{CanonicalSet, EntityKind, PipelineConfig};

use crate::candidate::{CandidateRecord, GenerationBatches, SourceBatch};
use crate::merge::{merge_batches, MergePolicy};
use crate::normalise::normalise_record;
use crate::report::{GenerationReport, Stage, StageReport};
use crate::validate::{
    disease_ids, protein_ids, validate_associations, validate_diseases, validate_proteins,
    validate_therapies, validate_trials,
};

/// Normalise every candidate of one entity type. Batches are copied so the
/// caller's input is left as supplied.
pub fn normalise_batches(kind: EntityKind, batches: &[SourceBatch]) -> (Vec<SourceBatch>, StageReport) {
    let input: usize = batches.iter().map(|b| b.records.len()).sum();
    let mut report = StageReport::new(Stage::Normalise, kind, input);
    let out: Vec<SourceBatch> = batches
        .iter()
        .map(|b| {
            let records = b
                .records
                .iter()
                .map(|r| {
                    let mut r = r.clone();
                    for issue in normalise_record(kind, &mut r) {
                        report.push(issue);
                    }
                    r
                })
                .collect();
            SourceBatch::new(b.source.clone(), records)
        })
        .collect();
    report.accepted = input;
    (out, report)
}

/// Normalise and merge one entity type, recording both stage reports.
fn merged(kind: EntityKind, batches: &GenerationBatches, report: &mut GenerationReport) -> Vec<CandidateRecord> {
    let (normalised, norm_report) = normalise_batches(kind, batches.batches(kind));
    let outcome = merge_batches(&MergePolicy::for_entity(kind), &normalised);
    info!(
        entity = %kind,
        input = norm_report.input,
        repaired = norm_report.issues.len(),
        merged = outcome.report.accepted,
        duplicates = outcome.report.input - outcome.report.accepted,
        "Merged candidates"
    );
    report.stages.push(norm_report);
    report.stages.push(outcome.report);
    outcome.records
}

fn log_validated(r: &StageReport) {
    info!(entity = %r.entity, accepted = r.accepted, dropped = r.dropped(), issues = r.issues.len(), "Validated");
}

/// Run one generation pass over the supplied candidate batches.
pub fn run_generation(
    batches: &GenerationBatches,
    config: &PipelineConfig,
) -> (CanonicalSet, GenerationReport) {
    let mut report = GenerationReport { skipped_entries: batches.skipped, ..Default::default() };

    // ── 1. Diseases ───────────────────────────────────────────────────────────
    let candidates = merged(EntityKind::Disease, batches, &mut report);
    let mut diseases = validate_diseases(&candidates);
    if diseases.records.len() > config.max_diseases {
        report.diseases_over_limit = diseases.records.len() - config.max_diseases;
        info!(
            max = config.max_diseases,
            over = report.diseases_over_limit,
            "Disease count over limit, keeping earliest"
        );
        diseases.records.truncate(config.max_diseases);
        diseases.report.accepted = diseases.records.len();
    }
    log_validated(&diseases.report);
    report.stages.push(diseases.report);

    // ── 2. Proteins ───────────────────────────────────────────────────────────
    let candidates = merged(EntityKind::Protein, batches, &mut report);
    let proteins = validate_proteins(&candidates);
    log_validated(&proteins.report);
    report.stages.push(proteins.report);

    let known_diseases = disease_ids(&diseases.records);
    let known_proteins = protein_ids(&proteins.records);

    // ── 3. Associations ───────────────────────────────────────────────────────
    let candidates = merged(EntityKind::Association, batches, &mut report);
    let associations = validate_associations(
        &candidates,
        &known_diseases,
        &known_proteins,
        config.min_association_strength,
    );
    log_validated(&associations.report);
    report.stages.push(associations.report);

    // ── 4. Therapies ──────────────────────────────────────────────────────────
    let candidates = merged(EntityKind::Therapy, batches, &mut report);
    let therapies = validate_therapies(&candidates, &known_proteins);
    log_validated(&therapies.report);
    report.stages.push(therapies.report);

    // ── 5. Trials ─────────────────────────────────────────────────────────────
    let candidates = merged(EntityKind::Trial, batches, &mut report);
    let trials = validate_trials(&candidates);
    log_validated(&trials.report);
    report.stages.push(trials.report);

    let set = CanonicalSet {
        diseases: diseases.records,
        proteins: proteins.records,
        associations: associations.records,
        therapies: therapies.records,
        trials: trials.records,
    };

    info!(
        diseases = set.diseases.len(),
        proteins = set.proteins.len(),
        associations = set.associations.len(),
        therapies = set.therapies.len(),
        trials = set.trials.len(),
        "Generation complete"
    );

    (set, report)
}
