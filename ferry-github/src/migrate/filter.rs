//! Which source issues take part in a migration

use crate::models::Issue;

/// Decides whether a source issue is copied
pub trait InclusionPredicate: Send + Sync {
    fn include(&self, issue: &Issue) -> bool;
}

/// Copies every issue
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl InclusionPredicate for IncludeAll {
    fn include(&self, _issue: &Issue) -> bool {
        true
    }
}

/// Skips issues carrying any of the given labels
#[derive(Debug, Clone, Default)]
pub struct ExcludeLabels {
    labels: Vec<String>,
}

impl ExcludeLabels {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl InclusionPredicate for ExcludeLabels {
    fn include(&self, issue: &Issue) -> bool {
        !issue
            .labels
            .iter()
            .any(|label| self.labels.iter().any(|l| *l == label.name))
    }
}

impl<F> InclusionPredicate for F
where
    F: Fn(&Issue) -> bool + Send + Sync,
{
    fn include(&self, issue: &Issue) -> bool {
        self(issue)
    }
}
