//! Outcome of one migration run

use serde::Serialize;
use tracing::info;

use crate::mapping::IdentifierMapping;

/// Kind of entity an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Label,
    Milestone,
    Issue,
    Comment,
    Estimate,
    Pipeline,
    Epic,
}

/// A failure that was logged and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityError {
    pub kind: EntityKind,
    /// Name, title or URL of the entity
    pub entity: String,
    pub message: String,
}

/// How one epic was recreated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpicOutcome {
    /// Source issue number of the epic
    pub source: u64,
    /// Target issue number of the epic
    pub target: u64,
    /// Target numbers of the children attached to the new epic
    pub included: Vec<u64>,
    /// Source numbers of children that were not copied
    pub excluded: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    pub selected: usize,
    pub excluded: usize,
    pub labels_created: usize,
    pub milestones_created: usize,
    pub issues_created: usize,
    pub comments_copied: usize,
    pub target_issues_patched: usize,
    pub estimates_set: usize,
    pub pipeline_moves: usize,
    pub epics: Vec<EpicOutcome>,
    pub issues_closed: usize,
    pub milestones_closed: usize,
    pub source_issues_patched: usize,
    pub source_issues_closed: usize,
    /// Target issues whose dependencies have to be recreated by hand
    pub dependency_checks: Vec<u64>,
    pub errors: Vec<EntityError>,
    pub mapping: IdentifierMapping,
}

impl MigrationReport {
    pub fn record_error(
        &mut self,
        kind: EntityKind,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(EntityError {
            kind,
            entity: entity.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Log a one-line summary
    pub fn log_summary(&self) {
        info!(
            selected = self.selected,
            created = self.issues_created,
            comments = self.comments_copied,
            patched = self.target_issues_patched,
            epics = self.epics.len(),
            closed = self.issues_closed,
            errors = self.errors.len(),
            "Finished copying {} issue(s)",
            self.issues_created
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error() {
        let mut report = MigrationReport::default();
        assert!(!report.has_errors());

        report.record_error(EntityKind::Milestone, "Sprint 12", "2 instances found");
        assert!(report.has_errors());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"][0]["kind"], "milestone");
        assert_eq!(json["errors"][0]["entity"], "Sprint 12");
    }
}
