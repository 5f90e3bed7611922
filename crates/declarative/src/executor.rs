//! Execution engine - applies plans with parallelism and delete-first batching

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::planner::{ExecutionPlan, PlanEntry};
use crate::resource::{RefreshOutcome, Resource, ResourceData, ResourceExt};
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, PlanAction};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// How the tracked record of one address changes after apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate<A> {
    /// Leave the record as it was
    Keep,
    /// Store this record
    Set(ResourceData<A>),
    /// Drop the record
    Remove,
}

/// Result of executing a plan
#[derive(Debug, Clone)]
pub struct ExecuteOutcome<A> {
    /// Counts per result kind
    pub summary: ExecuteSummary,
    /// Per-address results, in completion order
    pub results: Vec<(String, ApplyResult)>,
    /// Per-address state changes to write back
    pub updates: Vec<(String, StateUpdate<A>)>,
}

impl<A> Default for ExecuteOutcome<A> {
    fn default() -> Self {
        Self {
            summary: ExecuteSummary::default(),
            results: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl<A> ExecuteOutcome<A> {
    /// Write the state changes into a map of tracked records
    pub fn apply_to(self, states: &mut BTreeMap<String, ResourceData<A>>) -> ExecuteSummary {
        for (address, update) in self.updates {
            match update {
                StateUpdate::Keep => {}
                StateUpdate::Set(data) => {
                    states.insert(address, data);
                }
                StateUpdate::Remove => {
                    states.remove(&address);
                }
            }
        }
        self.summary
    }

    fn record(&mut self, applied: Applied<A>) {
        self.summary.add_result(&applied.result);
        self.results.push((applied.address.clone(), applied.result));
        self.updates.push((applied.address, applied.update));
    }

    /// Addresses whose apply failed, with the error text
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|(address, result)| match result {
            ApplyResult::Failed { error } => Some((address.as_str(), error.as_str())),
            _ => None,
        })
    }
}

struct Applied<A> {
    address: String,
    result: ApplyResult,
    update: StateUpdate<A>,
}

impl<A> Applied<A> {
    fn new(address: String, result: ApplyResult, update: StateUpdate<A>) -> Self {
        if let ApplyResult::Failed { error } = &result {
            log::warn!("{}: {}", address, error);
        }
        Self {
            address,
            result,
            update,
        }
    }
}

/// Work for the converge batch
enum Converge<A> {
    Entry(PlanEntry<A>),
    /// Create half of a replace whose delete already ran
    Recreate {
        address: String,
        data: ResourceData<A>,
        desired: A,
    },
}

/// What the destroy batch did with one entry
enum Destroyed<A> {
    Done(Applied<A>),
    Recreate(Converge<A>),
}

/// A unit of batch work, as announced to the progress callback
trait Step {
    fn address(&self) -> &str;
    fn action(&self) -> PlanAction;
}

impl<A> Step for PlanEntry<A> {
    fn address(&self) -> &str {
        &self.diff.address
    }

    fn action(&self) -> PlanAction {
        self.diff.action
    }
}

impl<A> Step for Converge<A> {
    fn address(&self) -> &str {
        match self {
            Self::Entry(entry) => &entry.diff.address,
            Self::Recreate { address, .. } => address,
        }
    }

    fn action(&self) -> PlanAction {
        match self {
            Self::Entry(entry) => entry.diff.action,
            Self::Recreate { .. } => PlanAction::Replace,
        }
    }
}

/// A finished unit of batch work, as reported to the progress callback
trait Finished {
    fn report(&self) -> (&str, ApplyResult);
}

impl<A> Finished for Applied<A> {
    fn report(&self) -> (&str, ApplyResult) {
        (&self.address, self.result.clone())
    }
}

impl<A> Finished for Destroyed<A> {
    fn report(&self) -> (&str, ApplyResult) {
        match self {
            Self::Done(applied) => applied.report(),
            Self::Recreate(next) => (next.address(), ApplyResult::Removed),
        }
    }
}

/// Execute a plan with the given options and callbacks
///
/// Runs in two batches. The first deletes: undeclared instances and the
/// old instance of every replace. The second creates, updates and
/// recreates the replaced instances, so an identifier freed in the first
/// batch can be claimed in the second.
///
/// # Type Parameters
/// * `R` - Resource driving the remote calls
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Returns
/// Summary, per-address results and the state changes to persist
pub fn execute<R, P, C>(
    resource: &R,
    plan: ExecutionPlan<R::Attributes>,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteOutcome<R::Attributes>>
where
    R: Resource + ?Sized,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let changes: Vec<_> = plan
        .entries
        .into_iter()
        .filter(|e| e.action().is_change())
        .collect();

    if changes.is_empty() {
        return Ok(ExecuteOutcome::default());
    }

    let mut outcome = ExecuteOutcome::default();

    // Confirm before proceeding (unless dry_run)
    if !opts.dry_run && !confirm.confirm("Apply changes?")? {
        for entry in changes {
            let skipped = ApplyResult::Skipped {
                reason: "not confirmed".to_string(),
            };
            outcome.record(Applied::new(entry.diff.address, skipped, StateUpdate::Keep));
        }
        return Ok(outcome);
    }

    if opts.dry_run {
        return Ok(outcome);
    }

    let (destroying, converging): (Vec<_>, Vec<_>) = changes
        .into_iter()
        .partition(|e| matches!(e.action(), PlanAction::Delete | PlanAction::Replace));
    let mut converging: Vec<_> = converging.into_iter().map(Converge::Entry).collect();

    if !destroying.is_empty() {
        progress.on_batch_start(destroying.len(), true);
        let destroyed = run_batch(destroying, opts.jobs, progress, |entry| {
            destroy_entry(resource, entry)
        })?;
        for done in destroyed {
            match done {
                Destroyed::Done(applied) => outcome.record(applied),
                Destroyed::Recreate(next) => converging.push(next),
            }
        }
        progress.on_batch_complete();
    }

    if !converging.is_empty() {
        progress.on_batch_start(converging.len(), false);
        let applied = run_batch(converging, opts.jobs, progress, |work| {
            converge(resource, work)
        })?;
        for done in applied {
            outcome.record(done);
        }
        progress.on_batch_complete();
    }

    Ok(outcome)
}

/// Run one batch, in parallel when `jobs > 1`
fn run_batch<T, U, F, P>(items: Vec<T>, jobs: usize, progress: &mut P, apply: F) -> Result<Vec<U>>
where
    T: Step + Send,
    U: Finished + Send,
    F: Fn(T) -> U + Sync,
    P: ProgressCallback,
{
    if jobs <= 1 || items.len() == 1 {
        // Sequential execution
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            progress.on_resource_start(item.address(), item.action());
            let done = apply(item);
            let (address, result) = done.report();
            progress.on_resource_complete(address, &result);
            results.push(done);
        }
        return Ok(results);
    }

    // The progress callback is not thread-safe, so results are reported
    // after the pool finishes.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to create thread pool")?;

    let results: Vec<U> = pool.install(|| items.into_par_iter().map(&apply).collect());

    for done in &results {
        let (address, result) = done.report();
        progress.on_resource_complete(address, &result);
    }

    Ok(results)
}

/// Delete the remote instance of a Delete or Replace entry
fn destroy_entry<R>(resource: &R, entry: PlanEntry<R::Attributes>) -> Destroyed<R::Attributes>
where
    R: Resource + ?Sized,
{
    let address = entry.diff.address.clone();
    let action = entry.action();
    log::info!("{} {}", action, address);

    let Some(mut data) = entry.prior else {
        return Destroyed::Done(unplannable(address, action));
    };

    match (resource.destroy(&mut data), action, entry.desired) {
        // A failed delete also skips the create half of a replace
        (Err(e), _, _) => Destroyed::Done(Applied::new(address, failed(&e), StateUpdate::Keep)),
        (Ok(()), PlanAction::Replace, Some(desired)) => {
            Destroyed::Recreate(Converge::Recreate {
                address,
                data,
                desired,
            })
        }
        (Ok(()), _, _) => Destroyed::Done(Applied::new(
            address,
            ApplyResult::Removed,
            StateUpdate::Remove,
        )),
    }
}

/// Create, update, or finish a replace
fn converge<R>(resource: &R, work: Converge<R::Attributes>) -> Applied<R::Attributes>
where
    R: Resource + ?Sized,
{
    let entry = match work {
        Converge::Recreate {
            address,
            data,
            desired,
        } => {
            log::info!("create {} (replacing)", address);
            return match resource.create_tracked(&desired) {
                Ok(created) => Applied::new(address, ApplyResult::Replaced, StateUpdate::Set(created)),
                // The old instance is gone: keep the record, untracked
                Err(e) => Applied::new(address, failed(&e), StateUpdate::Set(data)),
            };
        }
        Converge::Entry(entry) => entry,
    };

    let address = entry.diff.address.clone();
    log::info!("{} {}", entry.action(), address);

    match (entry.action(), entry.prior, entry.desired) {
        (PlanAction::Create, _, Some(desired)) => match resource.create_tracked(&desired) {
            Ok(data) => Applied::new(address, ApplyResult::Created, StateUpdate::Set(data)),
            Err(e) => Applied::new(address, failed(&e), StateUpdate::Keep),
        },

        (PlanAction::Update, Some(mut data), Some(desired)) => {
            match resource.update_tracked(&mut data, &desired) {
                Ok(()) => Applied::new(address, ApplyResult::Modified, StateUpdate::Set(data)),
                Err(e) => Applied::new(address, failed(&e), StateUpdate::Keep),
            }
        }

        (action, _, _) => unplannable(address, action),
    }
}

fn unplannable<A>(address: String, action: PlanAction) -> Applied<A> {
    let error = format!("plan entry for {} cannot {}", address, action);
    Applied::new(address, ApplyResult::Failed { error }, StateUpdate::Keep)
}

fn failed(err: &anyhow::Error) -> ApplyResult {
    ApplyResult::Failed {
        error: format!("{:#}", err),
    }
}

/// Refresh every tracked record against the remote system
///
/// Records whose remote instance is gone stay in the map with their
/// identifier cleared. Stops at the first failing read.
pub fn refresh_all<R: Resource + ?Sized>(
    resource: &R,
    states: &mut BTreeMap<String, ResourceData<R::Attributes>>,
) -> Result<Vec<(String, RefreshOutcome)>> {
    let mut outcomes = Vec::with_capacity(states.len());
    for (address, data) in states.iter_mut() {
        let outcome = resource
            .refresh(data)
            .with_context(|| format!("Failed to refresh {}", address))?;
        outcomes.push((address.clone(), outcome));
    }
    Ok(outcomes)
}
