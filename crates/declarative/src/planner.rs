//! Execution planner - builds resource execution plans

use crate::diff::{DiffSummary, ResourceDiff};
use crate::resource::{Resource, ResourceData};
use crate::types::PlanAction;
use std::collections::{BTreeMap, BTreeSet};

/// One resource instance in a plan
#[derive(Debug, Clone)]
pub struct PlanEntry<A> {
    /// Tracked record, if any
    pub prior: Option<ResourceData<A>>,
    /// Desired attributes, `None` if the instance is no longer declared
    pub desired: Option<A>,
    /// Computed diff
    pub diff: ResourceDiff,
}

impl<A> PlanEntry<A> {
    /// Declarative address of the instance
    pub fn address(&self) -> &str {
        &self.diff.address
    }

    /// Planned action
    pub fn action(&self) -> PlanAction {
        self.diff.action
    }
}

/// An execution plan: one entry per declared or tracked address
#[derive(Debug, Clone)]
pub struct ExecutionPlan<A> {
    pub entries: Vec<PlanEntry<A>>,
}

impl<A: Clone> ExecutionPlan<A> {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Plan the changes that take `prior` to `desired`
    ///
    /// Both maps are keyed by declarative address. Entries come out in
    /// address order.
    pub fn build<R>(
        resource: &R,
        prior: &BTreeMap<String, ResourceData<A>>,
        desired: &BTreeMap<String, A>,
    ) -> Self
    where
        R: Resource<Attributes = A> + ?Sized,
    {
        let addresses: BTreeSet<&String> = prior.keys().chain(desired.keys()).collect();

        let entries = addresses
            .into_iter()
            .map(|address| {
                let prior = prior.get(address);
                let desired = desired.get(address);
                PlanEntry {
                    diff: ResourceDiff::compute(resource, address, prior, desired),
                    prior: prior.cloned(),
                    desired: desired.cloned(),
                }
            })
            .collect();

        Self { entries }
    }

    /// Plan deletion of every tracked instance
    pub fn for_destroy<R>(resource: &R, prior: &BTreeMap<String, ResourceData<A>>) -> Self
    where
        R: Resource<Attributes = A> + ?Sized,
    {
        Self::build(resource, prior, &BTreeMap::new())
    }

    /// Filter plan to only include entries matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlanEntry<A>) -> bool,
    {
        Self {
            entries: self.entries.into_iter().filter(|e| predicate(e)).collect(),
        }
    }

    /// Filter plan to only include entries matching a target pattern
    ///
    /// Target format: "type", "type.address" or "address"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => self.filter(|e| matches_target(&e.diff, t)),
        }
    }

    /// Entries that change something
    pub fn changes(&self) -> impl Iterator<Item = &PlanEntry<A>> {
        self.entries.iter().filter(|e| e.action().is_change())
    }

    /// Diffs of the entries that change something
    pub fn diffs(&self) -> Vec<&ResourceDiff> {
        self.changes().map(|e| &e.diff).collect()
    }

    /// Change counts per action
    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_diffs(self.entries.iter().map(|e| &e.diff))
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if any entry changes something
    pub fn has_changes(&self) -> bool {
        self.changes().next().is_some()
    }
}

impl<A: Clone> Default for ExecutionPlan<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a diff matches a target string
fn matches_target(diff: &ResourceDiff, target: &str) -> bool {
    if target == diff.resource_type {
        return true;
    }

    if let Some((resource_type, address)) = target.split_once('.')
        && resource_type == diff.resource_type
    {
        return address == diff.address;
    }

    target == diff.address
}
