//! proteomap-common — Shared entity types, errors, and configuration used across all proteomap crates.

pub mod error;
pub mod entities;
pub mod config;

// Re-export commonly used types
pub use config::{Config, PipelineConfig, ScoringConfig, WeightsConfig};
pub use entities::{
    Association, CanonicalSet, ClinicalTrial, Disease, DiseaseCategory, Enrich, EntityKind,
    Maturity, Protein, Therapy,
};
pub use error::{IssueKind, ProteomapError, RecordIssue, Result};
