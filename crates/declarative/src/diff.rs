//! Diff computation for resources

use crate::resource::{Resource, ResourceData};
use crate::types::{AttributeChange, PlanAction};
use serde::{Deserialize, Serialize};

/// A diff between tracked and desired state of one resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Declarative address of the instance (config key)
    pub address: String,
    /// Type of the resource
    pub resource_type: String,
    /// Remote identifier, if tracked
    pub id: Option<String>,
    /// Planned action
    pub action: PlanAction,
    /// Attributes that differ (all desired attributes for a create)
    pub changes: Vec<AttributeChange>,
}

impl ResourceDiff {
    /// Compare a tracked record against the desired attributes
    ///
    /// An untracked record counts as absent: the remote instance must be
    /// (re)created.
    pub fn compute<R: Resource + ?Sized>(
        resource: &R,
        address: &str,
        prior: Option<&ResourceData<R::Attributes>>,
        desired: Option<&R::Attributes>,
    ) -> Self {
        let tracked = prior.filter(|p| p.is_tracked());

        let (action, changes) = match (tracked, desired) {
            (Some(prior), Some(desired)) => {
                let changes = resource.changes(&prior.attributes, desired);
                let action = if changes.is_empty() {
                    PlanAction::NoOp
                } else if changes.iter().any(|c| c.forces_replacement) {
                    PlanAction::Replace
                } else {
                    PlanAction::Update
                };
                (action, changes)
            }
            (None, Some(desired)) => (PlanAction::Create, additions(resource, desired)),
            (Some(prior), None) => (PlanAction::Delete, removals(resource, &prior.attributes)),
            (None, None) => (PlanAction::NoOp, Vec::new()),
        };

        Self {
            address: address.to_string(),
            resource_type: resource.resource_type().to_string(),
            id: tracked.and_then(|p| p.id.clone()),
            action,
            changes,
        }
    }
}

fn additions<R: Resource + ?Sized>(resource: &R, desired: &R::Attributes) -> Vec<AttributeChange> {
    resource
        .flatten(desired)
        .into_iter()
        .map(|(attribute, value)| AttributeChange {
            attribute,
            from: None,
            to: Some(value),
            forces_replacement: false,
        })
        .collect()
}

fn removals<R: Resource + ?Sized>(resource: &R, prior: &R::Attributes) -> Vec<AttributeChange> {
    resource
        .flatten(prior)
        .into_iter()
        .map(|(attribute, value)| AttributeChange {
            attribute,
            from: Some(value),
            to: None,
            forces_replacement: false,
        })
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources to delete
    pub removals: usize,
    /// Number of resources to update in place
    pub modifications: usize,
    /// Number of resources to replace
    pub replacements: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs<'a>(diffs: impl IntoIterator<Item = &'a ResourceDiff>) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                PlanAction::Create => summary.additions += 1,
                PlanAction::Delete => summary.removals += 1,
                PlanAction::Update => summary.modifications += 1,
                PlanAction::Replace => summary.replacements += 1,
                PlanAction::NoOp => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications + self.replacements
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
