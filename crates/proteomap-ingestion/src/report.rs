//! Per-stage accounting of what each pipeline stage accepted and lost.

use std::collections::BTreeMap;

use serde::Serialize;

use proteomap_common::{EntityKind, IssueKind, RecordIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Normalise,
    Merge,
    Validate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub entity: EntityKind,
    /// Records entering the stage.
    pub input: usize,
    /// Records leaving the stage.
    pub accepted: usize,
    pub issues: Vec<RecordIssue>,
}

impl StageReport {
    pub fn new(stage: Stage, entity: EntityKind, input: usize) -> Self {
        Self { stage, entity, input, accepted: 0, issues: Vec::new() }
    }

    pub fn push(&mut self, issue: RecordIssue) {
        self.issues.push(issue);
    }

    pub fn dropped(&self) -> usize {
        self.input.saturating_sub(self.accepted)
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind() == kind).count()
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for issue in &self.issues {
            *out.entry(format!("{:?}", issue.kind())).or_insert(0) += 1;
        }
        out
    }
}

/// Reports for a whole generation run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub stages: Vec<StageReport>,
    /// Non-object entries skipped while decoding batches.
    pub skipped_entries: usize,
    /// Valid diseases beyond the configured maximum.
    pub diseases_over_limit: usize,
}

impl GenerationReport {
    pub fn stage(&self, stage: Stage, entity: EntityKind) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage && r.entity == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_and_counts() {
        let mut report = StageReport::new(Stage::Validate, EntityKind::Protein, 3);
        report.push(RecordIssue::MissingRequiredField {
            entity: EntityKind::Protein,
            field: "uniprot_id",
        });
        report.accepted = 2;
        assert_eq!(report.dropped(), 1);
        assert_eq!(report.count(IssueKind::MissingRequiredField), 1);
        assert_eq!(report.counts().get("MissingRequiredField"), Some(&1));
    }
}
