//! Loosely-typed candidate records as produced by acquisition sources.
//!
//! A candidate is a JSON object with conventional, entity-specific keys.
//! Nothing about its shape is trusted until the validator turns it into a
//! typed entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use proteomap_common::{EntityKind, Result};

/// A single candidate record: a key-value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateRecord(Map<String, Value>);

/// Whether a value counts as present for merge purposes.
/// Null, empty strings, empty arrays and empty objects do not.
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

impl CandidateRecord {
    /// Wrap a JSON value. Returns `None` for anything that is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Trimmed, non-empty string value. Numbers are rendered as text so
    /// that numeric identifiers survive.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric value. Accepts JSON numbers and numeric strings.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(value_as_f64)
    }

    /// List of non-empty strings. A bare string is treated as a one-element list.
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => vec![],
        }
    }

    pub fn is_populated(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_populated)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (!x.is_nan()).then_some(x)
}

// ── Batches ──────────────────────────────────────────────────────────────────

/// One source's ordered list of candidates for a single entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBatch {
    pub source: String,
    pub records: Vec<CandidateRecord>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>, records: Vec<CandidateRecord>) -> Self {
        Self { source: source.into(), records }
    }

    /// Build from raw JSON values, dropping non-objects.
    /// Returns the batch and the number of values skipped.
    pub fn from_values(source: impl Into<String>, values: Vec<Value>) -> (Self, usize) {
        let total = values.len();
        let records: Vec<CandidateRecord> =
            values.into_iter().filter_map(CandidateRecord::from_value).collect();
        let skipped = total - records.len();
        (Self::new(source, records), skipped)
    }
}

/// Candidate batches for one generation run, ordered by source priority
/// (earlier batches win field conflicts).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationBatches {
    pub diseases: Vec<SourceBatch>,
    pub proteins: Vec<SourceBatch>,
    pub associations: Vec<SourceBatch>,
    pub therapies: Vec<SourceBatch>,
    pub trials: Vec<SourceBatch>,
    /// Entries dropped during decoding because they were not JSON objects.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawBatch {
    #[serde(default)]
    source: String,
    #[serde(default)]
    records: Vec<Value>,
}

#[derive(Deserialize)]
struct RawBatches {
    #[serde(default)]
    diseases: Vec<RawBatch>,
    #[serde(default)]
    proteins: Vec<RawBatch>,
    #[serde(default)]
    associations: Vec<RawBatch>,
    #[serde(default)]
    therapies: Vec<RawBatch>,
    #[serde(default)]
    trials: Vec<RawBatch>,
}

impl GenerationBatches {
    /// Decode `{"diseases": [{"source": .., "records": [..]}], "proteins": ..}`.
    /// Missing entity keys are empty; non-object records are skipped and counted.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: RawBatches = serde_json::from_str(s)?;
        let mut skipped = 0usize;
        let mut convert = |batches: Vec<RawBatch>| -> Vec<SourceBatch> {
            batches
                .into_iter()
                .map(|b| {
                    let (batch, n) = SourceBatch::from_values(b.source, b.records);
                    skipped += n;
                    batch
                })
                .collect()
        };

        let diseases = convert(raw.diseases);
        let proteins = convert(raw.proteins);
        let associations = convert(raw.associations);
        let therapies = convert(raw.therapies);
        let trials = convert(raw.trials);

        if skipped > 0 {
            tracing::debug!(skipped, "Skipped non-object candidate entries");
        }

        Ok(Self { diseases, proteins, associations, therapies, trials, skipped })
    }

    pub fn batches(&self, kind: EntityKind) -> &[SourceBatch] {
        match kind {
            EntityKind::Disease     => &self.diseases,
            EntityKind::Protein     => &self.proteins,
            EntityKind::Association => &self.associations,
            EntityKind::Therapy     => &self.therapies,
            EntityKind::Trial       => &self.trials,
        }
    }

    pub fn push(&mut self, kind: EntityKind, batch: SourceBatch) {
        match kind {
            EntityKind::Disease     => self.diseases.push(batch),
            EntityKind::Protein     => self.proteins.push(batch),
            EntityKind::Association => self.associations.push(batch),
            EntityKind::Therapy     => self.therapies.push(batch),
            EntityKind::Trial       => self.trials.push(batch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> CandidateRecord {
        CandidateRecord::from_value(v).unwrap()
    }

    #[test]
    fn test_populated_rules() {
        assert!(!is_populated(&Value::Null));
        assert!(!is_populated(&json!("  ")));
        assert!(!is_populated(&json!([])));
        assert!(!is_populated(&json!({})));
        assert!(is_populated(&json!(0)));
        assert!(is_populated(&json!(false)));
        assert!(is_populated(&json!("x")));
    }

    #[test]
    fn test_typed_getters() {
        let r = record(json!({
            "name": "  Alzheimer disease ",
            "burden_score": "0.9",
            "bad": "high",
            "pathways": ["A", "", " B "],
            "indications": "ALZ",
            "code": 42
        }));
        assert_eq!(r.get_str("name").as_deref(), Some("Alzheimer disease"));
        assert_eq!(r.get_str("code").as_deref(), Some("42"));
        assert_eq!(r.get_f64("burden_score"), Some(0.9));
        assert_eq!(r.get_f64("bad"), None);
        assert_eq!(r.get_f64("missing"), None);
        assert_eq!(r.get_str_list("pathways"), vec!["A", "B"]);
        assert_eq!(r.get_str_list("indications"), vec!["ALZ"]);
    }

    #[test]
    fn test_batches_skip_non_objects() {
        let batches = GenerationBatches::from_json(
            r#"{
                "diseases": [
                    {"source": "llm", "records": [{"id": "ALZ", "name": "Alzheimer"}, 3, "x"]}
                ],
                "proteins": [{"source": "uniprot", "records": [{"uniprot_id": "P05067"}]}]
            }"#,
        )
        .unwrap();
        assert_eq!(batches.skipped, 2);
        assert_eq!(batches.diseases[0].records.len(), 1);
        assert_eq!(batches.proteins[0].source, "uniprot");
        assert!(batches.trials.is_empty());
    }

    #[test]
    fn test_batches_reject_malformed_json() {
        assert!(GenerationBatches::from_json("{not json").is_err());
    }
}
