//! Natural-key merge of per-source candidate lists.
//!
//! The first record seen for a key becomes canonical. Later records with
//! the same key only fill fields the canonical record leaves empty, except
//! for the fields a [`MergePolicy`] declares as accumulating, which take the
//! set union. Output order is first-occurrence order, so earlier sources
//! have priority and the result depends on source order.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use proteomap_common::{EntityKind, RecordIssue};

use crate::candidate::{is_populated, CandidateRecord, SourceBatch};
use crate::report::{Stage, StageReport};

/// Field that every merged record accumulates its source names into.
pub const SOURCES_FIELD: &str = "sources";

/// How records of one entity type are merged.
#[derive(Debug, Clone, Copy)]
pub struct MergePolicy {
    pub entity: EntityKind,
    /// Name of the field the key is read from, for reporting.
    pub key_field: &'static str,
    pub key: fn(&CandidateRecord) -> Option<String>,
    /// List fields merged by set union rather than gap-fill.
    pub union_fields: &'static [&'static str],
}

fn lower_name(r: &CandidateRecord) -> Option<String> {
    r.get_str("name").map(|n| n.to_lowercase())
}

fn uniprot(r: &CandidateRecord) -> Option<String> {
    r.get_str("uniprot_id")
}

fn record_id(r: &CandidateRecord) -> Option<String> {
    r.get_str("id")
}

fn nct(r: &CandidateRecord) -> Option<String> {
    r.get_str("nct_id")
}

impl MergePolicy {
    pub fn for_entity(entity: EntityKind) -> Self {
        match entity {
            EntityKind::Disease => Self {
                entity,
                key_field: "name",
                key: lower_name,
                union_fields: &[SOURCES_FIELD],
            },
            EntityKind::Protein => Self {
                entity,
                key_field: "uniprot_id",
                key: uniprot,
                union_fields: &[SOURCES_FIELD],
            },
            EntityKind::Association => Self {
                entity,
                key_field: "id",
                key: record_id,
                union_fields: &[SOURCES_FIELD],
            },
            EntityKind::Therapy => Self {
                entity,
                key_field: "name",
                key: lower_name,
                union_fields: &[SOURCES_FIELD, "indications"],
            },
            EntityKind::Trial => Self {
                entity,
                key_field: "nct_id",
                key: nct,
                union_fields: &[SOURCES_FIELD],
            },
        }
    }

    fn is_union(&self, field: &str) -> bool {
        self.union_fields.contains(&field)
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<CandidateRecord>,
    pub report: StageReport,
}

/// Merge ordered source batches into one record per natural key.
pub fn merge_batches(policy: &MergePolicy, batches: &[SourceBatch]) -> MergeOutcome {
    let input: usize = batches.iter().map(|b| b.records.len()).sum();
    let mut report = StageReport::new(Stage::Merge, policy.entity, input);
    let mut records: Vec<CandidateRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for batch in batches {
        for candidate in &batch.records {
            let Some(key) = (policy.key)(candidate) else {
                debug!(entity = %policy.entity, source = %batch.source, field = policy.key_field, "Dropping candidate without merge key");
                report.push(RecordIssue::MissingRequiredField {
                    entity: policy.entity,
                    field: policy.key_field,
                });
                continue;
            };

            match index.get(&key) {
                None => {
                    let mut adopted = candidate.clone();
                    attribute(&mut adopted, &batch.source);
                    index.insert(key, records.len());
                    records.push(adopted);
                }
                Some(&pos) => {
                    let canonical = &mut records[pos];
                    fold_into(policy, canonical, candidate);
                    attribute(canonical, &batch.source);
                    report.push(RecordIssue::DuplicateKey { entity: policy.entity, key });
                }
            }
        }
    }

    report.accepted = records.len();
    MergeOutcome { records, report }
}

/// Gap-fill `canonical` from `incoming`, unioning the declared list fields.
fn fold_into(policy: &MergePolicy, canonical: &mut CandidateRecord, incoming: &CandidateRecord) {
    for (field, value) in incoming.iter() {
        if policy.is_union(field) {
            let merged = union(&canonical.get_str_list(field), &incoming.get_str_list(field));
            if !merged.is_empty() {
                canonical.set(field, merged);
            }
        } else if is_populated(value) && !canonical.is_populated(field) {
            canonical.set(field, value.clone());
        }
    }
}

fn attribute(record: &mut CandidateRecord, source: &str) {
    let source = source.trim();
    if source.is_empty() {
        return;
    }
    let merged = union(&record.get_str_list(SOURCES_FIELD), &[source.to_string()]);
    record.set(SOURCES_FIELD, merged);
}

/// Order-preserving union; earlier entries keep their position.
fn union(existing: &[String], incoming: &[String]) -> Vec<Value> {
    let mut out: Vec<String> = existing.to_vec();
    for item in incoming {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out.into_iter().map(Value::String).collect()
}
