//! proteomap-ingestion — Turns candidate records from acquisition sources
//! into the canonical entity set:
//! - Candidate record access and batch decoding
//! - Scalar normalisation (clamping, symbol casing, enum coercion)
//! - Per-type merge on natural keys (first writer wins)
//! - Validation into typed entities with identifier disambiguation
//! - Generation pipeline with per-stage reports

pub mod candidate;
pub mod ids;
pub mod merge;
pub mod normalise;
pub mod pipeline;
pub mod report;
pub mod validate;

pub use candidate::{CandidateRecord, GenerationBatches, SourceBatch};
pub use merge::{merge_batches, MergeOutcome, MergePolicy};
pub use pipeline::run_generation;
pub use report::{GenerationReport, Stage, StageReport};
pub use validate::Validated;
