//! proteomap-ranker — Opportunity and repurposing scoring over the
//! canonical entity set. All scorers are pure functions over borrowed
//! slices and never mutate their input.

pub mod opportunity;
pub mod repurposing;
pub mod weights;

pub use opportunity::{calculate_opportunities, gap_score, generate_rationale, Opportunity};
pub use repurposing::{
    find_multi_indication_proteins, find_repurposing_opportunities, repurposing_score,
    MultiIndicationTarget, RepurposingCandidate,
};
pub use weights::{OpportunityWeights, RepurposingWeights};
