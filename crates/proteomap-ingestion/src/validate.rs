//! Typed construction of canonical entities from merged candidates.
//!
//! Each validator walks its input in order, builds the typed entity or
//! drops the record with a reported issue, and hands out identifiers via
//! an [`IdAllocator`] so collisions are renamed rather than dropped.
//! Inputs are borrowed and never reordered.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use proteomap_common::{
    Association, ClinicalTrial, Disease, EntityKind, Protein, RecordIssue, Therapy,
};

use crate::candidate::CandidateRecord;
use crate::ids::{trial_link, IdAllocator};
use crate::normalise::{clamp01, coerce_category, coerce_maturity, coerce_therapy_status, DEFAULT_BURDEN};
use crate::report::{Stage, StageReport};

#[derive(Debug, Clone)]
pub struct Validated<T> {
    pub records: Vec<T>,
    pub report: StageReport,
}

impl<T> Validated<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn require(
    record: &CandidateRecord,
    entity: EntityKind,
    field: &'static str,
    report: &mut StageReport,
) -> Option<String> {
    let value = record.get_str(field);
    if value.is_none() {
        debug!(entity = %entity, field, "Dropping record missing required field");
        report.push(RecordIssue::MissingRequiredField { entity, field });
    }
    value
}

fn dangling(
    entity: EntityKind,
    id: &str,
    field: &'static str,
    target: &str,
    report: &mut StageReport,
) {
    warn!(entity = %entity, id, field, target, "Dropping record with dangling reference");
    report.push(RecordIssue::DanglingReference {
        entity,
        id: id.to_string(),
        field,
        target: target.to_string(),
    });
}

/// Shared driver: build, then allocate a unique id for each survivor.
fn run<T>(
    entity: EntityKind,
    records: &[CandidateRecord],
    id_slot: fn(&mut T) -> &mut String,
    mut build: impl FnMut(&CandidateRecord, &mut StageReport) -> Option<T>,
) -> Validated<T> {
    let mut report = StageReport::new(Stage::Validate, entity, records.len());
    let mut ids = IdAllocator::new();
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let Some(mut item) = build(record, &mut report) else { continue };
        let slot = id_slot(&mut item);
        let (assigned, renamed) = ids.assign(slot.as_str());
        if renamed {
            debug!(entity = %entity, original = %slot, assigned = %assigned, "Identifier collision");
            report.push(RecordIssue::IdentifierCollision {
                entity,
                original: slot.clone(),
                assigned: assigned.clone(),
            });
            *slot = assigned;
        }
        out.push(item);
    }

    report.accepted = out.len();
    Validated { records: out, report }
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            debug!(value = %raw, error = %e, "Ignoring unparseable timestamp");
            None
        }
    }
}

// ── Per-type validators ──────────────────────────────────────────────────────

pub fn validate_diseases(records: &[CandidateRecord]) -> Validated<Disease> {
    let entity = EntityKind::Disease;
    run(entity, records, |d: &mut Disease| &mut d.id, |r, report| {
        let id = require(r, entity, "id", report)?;
        let name = require(r, entity, "name", report)?;
        Some(Disease {
            id,
            name,
            category: coerce_category(r.get_str("category").as_deref()),
            burden_score: clamp01(r.get_f64("burden_score"), DEFAULT_BURDEN),
            sources: r.get_str_list("sources"),
        })
    })
}

pub fn validate_proteins(records: &[CandidateRecord]) -> Validated<Protein> {
    let entity = EntityKind::Protein;
    run(entity, records, |p: &mut Protein| &mut p.id, |r, report| {
        let uniprot_id = require(r, entity, "uniprot_id", report)?;
        let id = r.get_str("id").unwrap_or_else(|| uniprot_id.clone());
        Some(Protein {
            id,
            uniprot_id,
            symbol: r.get_str("symbol"),
            name: r.get_str("name"),
            family: r.get_str("family"),
            pathways: r.get_str_list("pathways"),
            sources: r.get_str_list("sources"),
        })
    })
}

/// Associations must reference accepted diseases and proteins and meet
/// `min_strength` after clamping.
pub fn validate_associations(
    records: &[CandidateRecord],
    disease_ids: &HashSet<String>,
    protein_ids: &HashSet<String>,
    min_strength: f64,
) -> Validated<Association> {
    let entity = EntityKind::Association;
    run(entity, records, |a: &mut Association| &mut a.id, |r, report| {
        let disease_id = require(r, entity, "disease_id", report)?;
        let protein_id = require(r, entity, "protein_id", report)?;
        let id = Association::edge_id(&disease_id, &protein_id);
        let Some(raw) = r.get_f64("association_strength") else {
            report.push(RecordIssue::MissingRequiredField { entity, field: "association_strength" });
            return None;
        };

        if !disease_ids.contains(&disease_id) {
            dangling(entity, &id, "disease_id", &disease_id, report);
            return None;
        }
        if !protein_ids.contains(&protein_id) {
            dangling(entity, &id, "protein_id", &protein_id, report);
            return None;
        }

        let strength = clamp01(Some(raw), 0.0);
        if strength < min_strength {
            debug!(id = %id, strength, min_strength, "Association below threshold");
            report.push(RecordIssue::BelowThreshold { id, strength, minimum: min_strength });
            return None;
        }

        Some(Association {
            id,
            disease_id,
            protein_id,
            association_strength: strength,
            evidence_text: r.get_str("evidence_text"),
            maturity: coerce_maturity(r.get_str("maturity").as_deref()),
            citations: r.get_str_list("citations"),
            sources: r.get_str_list("sources"),
            last_updated: parse_timestamp(r.get_str("last_updated")),
        })
    })
}

/// Therapies must target an accepted protein.
pub fn validate_therapies(
    records: &[CandidateRecord],
    protein_ids: &HashSet<String>,
) -> Validated<Therapy> {
    let entity = EntityKind::Therapy;
    run(entity, records, |t: &mut Therapy| &mut t.id, |r, report| {
        let name = require(r, entity, "name", report)?;
        let target = require(r, entity, "target_protein_id", report)?;
        let id = r
            .get_str("id")
            .unwrap_or_else(|| crate::ids::therapy_id_from_name(&name));
        if !protein_ids.contains(&target) {
            dangling(entity, &id, "target_protein_id", &target, report);
            return None;
        }
        Some(Therapy {
            id,
            name,
            target_protein_id: target,
            status: coerce_therapy_status(r.get_str("status").as_deref()),
            drugbank_id: r.get_str("drugbank_id"),
            chembl_id: r.get_str("chembl_id"),
            indications: r.get_str_list("indications"),
            sources: r.get_str_list("sources"),
        })
    })
}

pub fn validate_trials(records: &[CandidateRecord]) -> Validated<ClinicalTrial> {
    let entity = EntityKind::Trial;
    run(entity, records, |t: &mut ClinicalTrial| &mut t.id, |r, report| {
        let nct_id = require(r, entity, "nct_id", report)?;
        Some(ClinicalTrial {
            id: r.get_str("id").unwrap_or_else(|| nct_id.to_lowercase()),
            link: r.get_str("link").unwrap_or_else(|| trial_link(&nct_id)),
            phase: r.get_str("phase"),
            status: r.get_str("status"),
            condition: r.get_str("condition"),
            target_protein_id: r.get_str("target_protein_id"),
            start_date: r.get_str("start_date"),
            sources: r.get_str_list("sources"),
            nct_id,
        })
    })
}

/// Ids of the given diseases, for reference checks.
pub fn disease_ids(diseases: &[Disease]) -> HashSet<String> {
    diseases.iter().map(|d| d.id.clone()).collect()
}

pub fn protein_ids(proteins: &[Protein]) -> HashSet<String> {
    proteins.iter().map(|p| p.id.clone()).collect()
}
