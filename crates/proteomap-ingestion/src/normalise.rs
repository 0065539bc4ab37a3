//! Scalar canonicalisation applied to every candidate before merging.
//!
//! The free functions are pure. `normalise_record` rewrites a candidate in
//! place and reports every repair it made; it never drops a record.

use proteomap_common::{DiseaseCategory, EntityKind, Maturity, RecordIssue};

use crate::candidate::CandidateRecord;
use crate::ids::{synthesize_nct_id, therapy_id_from_name, trial_link};

pub const DEFAULT_BURDEN: f64 = 0.5;

/// `fallback` when `x` is missing or NaN, otherwise `x` clamped to [0, 1].
pub fn clamp01(x: Option<f64>, fallback: f64) -> f64 {
    match x {
        Some(v) if !v.is_nan() => v.clamp(0.0, 1.0),
        _ => fallback,
    }
}

/// Upper-case and trim. Idempotent.
pub fn normalize_symbol(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Closed-set maturity; anything else (or nothing) is `none`.
pub fn coerce_maturity(v: Option<&str>) -> Maturity {
    v.and_then(Maturity::parse).unwrap_or(Maturity::None)
}

/// Therapy status; unknown or missing values default to `approved`.
pub fn coerce_therapy_status(v: Option<&str>) -> Maturity {
    v.and_then(Maturity::parse).unwrap_or(Maturity::Approved)
}

pub fn coerce_category(v: Option<&str>) -> DiseaseCategory {
    v.and_then(DiseaseCategory::parse).unwrap_or_default()
}

// ── Record normalisation ─────────────────────────────────────────────────────

/// Canonicalise the scalar fields of one candidate and fill derived ids.
pub fn normalise_record(kind: EntityKind, record: &mut CandidateRecord) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    match kind {
        EntityKind::Disease     => normalise_disease(record, &mut issues),
        EntityKind::Protein     => normalise_protein(record),
        EntityKind::Association => normalise_association(record, &mut issues),
        EntityKind::Therapy     => normalise_therapy(record, &mut issues),
        EntityKind::Trial       => normalise_trial(record),
    }
    issues
}

fn trim_in_place(record: &mut CandidateRecord, keys: &[&str]) {
    for key in keys {
        if let Some(v) = record.get_str(key) {
            record.set(key, v);
        }
    }
}

/// Clamp a unit-interval field, reporting values that had to move.
fn clamp_field(
    record: &mut CandidateRecord,
    entity: EntityKind,
    field: &'static str,
    fallback: Option<f64>,
    issues: &mut Vec<RecordIssue>,
) {
    match record.get_f64(field) {
        Some(raw) => {
            if !(0.0..=1.0).contains(&raw) {
                issues.push(RecordIssue::OutOfRangeValue { entity, field, value: raw });
            }
            record.set(field, clamp01(Some(raw), 0.0));
        }
        None => match fallback {
            Some(f) => record.set(field, f),
            None => {
                record.remove(field);
            }
        },
    }
}

fn coerce_enum_field(
    record: &mut CandidateRecord,
    entity: EntityKind,
    field: &'static str,
    coerce: fn(Option<&str>) -> Maturity,
    issues: &mut Vec<RecordIssue>,
) {
    let raw = record.get_str(field);
    let value = coerce(raw.as_deref());
    if let Some(raw) = raw {
        if raw != value.as_str() {
            issues.push(RecordIssue::UnknownEnumValue {
                entity,
                field,
                value: raw,
                coerced: value.as_str(),
            });
        }
    }
    record.set(field, value.as_str());
}

fn normalise_disease(record: &mut CandidateRecord, issues: &mut Vec<RecordIssue>) {
    trim_in_place(record, &["id", "name"]);

    let raw = record.get_str("category");
    let category = coerce_category(raw.as_deref());
    if let Some(raw) = raw {
        if DiseaseCategory::parse(&raw).is_none() {
            issues.push(RecordIssue::UnknownEnumValue {
                entity: EntityKind::Disease,
                field: "category",
                value: raw,
                coerced: category.as_str(),
            });
        }
    }
    record.set("category", category.as_str());

    clamp_field(record, EntityKind::Disease, "burden_score", Some(DEFAULT_BURDEN), issues);
}

fn normalise_protein(record: &mut CandidateRecord) {
    trim_in_place(record, &["id", "uniprot_id", "name", "family"]);
    if let Some(symbol) = record.get_str("symbol") {
        record.set("symbol", normalize_symbol(&symbol));
    }
    if !record.is_populated("id") {
        if let Some(id) = record.get_str("symbol").or_else(|| record.get_str("uniprot_id")) {
            record.set("id", id);
        }
    }
}

fn normalise_association(record: &mut CandidateRecord, issues: &mut Vec<RecordIssue>) {
    trim_in_place(record, &["disease_id", "protein_id"]);
    clamp_field(record, EntityKind::Association, "association_strength", None, issues);
    coerce_enum_field(record, EntityKind::Association, "maturity", coerce_maturity, issues);

    if let (Some(d), Some(p)) = (record.get_str("disease_id"), record.get_str("protein_id")) {
        record.set("id", proteomap_common::Association::edge_id(&d, &p));
    }
}

fn normalise_therapy(record: &mut CandidateRecord, issues: &mut Vec<RecordIssue>) {
    trim_in_place(record, &["id", "name", "target_protein_id"]);
    coerce_enum_field(record, EntityKind::Therapy, "status", coerce_therapy_status, issues);
    if !record.is_populated("id") {
        if let Some(name) = record.get_str("name") {
            record.set("id", therapy_id_from_name(&name));
        }
    }
}

fn normalise_trial(record: &mut CandidateRecord) {
    trim_in_place(record, &["id", "nct_id"]);
    if !record.is_populated("nct_id") {
        if let Some(id) = record.get_str("id") {
            record.set("nct_id", synthesize_nct_id(&id));
        }
    }
    if let Some(nct) = record.get_str("nct_id") {
        if !record.is_populated("id") {
            record.set("id", nct.to_lowercase());
        }
        if !record.is_populated("link") {
            record.set("link", trial_link(&nct));
        }
    }
}
