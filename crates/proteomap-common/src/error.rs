use serde::Serialize;
use thiserror::Error;

use crate::entities::EntityKind;

#[derive(Debug, Error)]
pub enum ProteomapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProteomapError>;

/// A recoverable problem found in a candidate record.
///
/// None of these are fatal: the record is either repaired in place
/// (clamped, coerced, renamed) or dropped, and the issue is reported
/// so callers can see what each stage lost.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordIssue {
    #[error("{entity} record missing required field `{field}`")]
    MissingRequiredField { entity: EntityKind, field: &'static str },

    #[error("{entity} field `{field}` value {value} clamped into [0, 1]")]
    OutOfRangeValue { entity: EntityKind, field: &'static str, value: f64 },

    #[error("{entity} field `{field}` value {value:?} coerced to `{coerced}`")]
    UnknownEnumValue {
        entity: EntityKind,
        field: &'static str,
        value: String,
        coerced: &'static str,
    },

    #[error("{entity} {id} references unknown {field} `{target}`")]
    DanglingReference {
        entity: EntityKind,
        id: String,
        field: &'static str,
        target: String,
    },

    #[error("{entity} id `{original}` already taken, reassigned to `{assigned}`")]
    IdentifierCollision { entity: EntityKind, original: String, assigned: String },

    #[error("association {id} strength {strength} below minimum {minimum}")]
    BelowThreshold { id: String, strength: f64, minimum: f64 },

    #[error("{entity} dedup key `{key}` already accepted")]
    DuplicateKey { entity: EntityKind, key: String },
}

/// Discriminant of [`RecordIssue`], for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingRequiredField,
    OutOfRangeValue,
    UnknownEnumValue,
    DanglingReference,
    IdentifierCollision,
    BelowThreshold,
    DuplicateKey,
}

impl RecordIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            RecordIssue::MissingRequiredField { .. } => IssueKind::MissingRequiredField,
            RecordIssue::OutOfRangeValue { .. }      => IssueKind::OutOfRangeValue,
            RecordIssue::UnknownEnumValue { .. }     => IssueKind::UnknownEnumValue,
            RecordIssue::DanglingReference { .. }    => IssueKind::DanglingReference,
            RecordIssue::IdentifierCollision { .. }  => IssueKind::IdentifierCollision,
            RecordIssue::BelowThreshold { .. }       => IssueKind::BelowThreshold,
            RecordIssue::DuplicateKey { .. }         => IssueKind::DuplicateKey,
        }
    }
}

impl IssueKind {
    /// Whether a record carrying this issue is removed from the output.
    pub fn drops_record(&self) -> bool {
        matches!(
            self,
            IssueKind::MissingRequiredField
                | IssueKind::DanglingReference
                | IssueKind::BelowThreshold
                | IssueKind::DuplicateKey
        )
    }
}
