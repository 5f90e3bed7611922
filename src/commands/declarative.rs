//! Declarative commands
//!
//! - `plan` - Preview what apply would change
//! - `apply` - Make the service match the config
//! - `refresh` - Pull remote state into the tracked records
//! - `destroy` - Delete tracked items

use anyhow::{Result, bail};
use blogapi::ItemClient;
use colored::Colorize;
use declarative::{
    ConfirmCallback, ExecuteOptions, ExecuteSummary, ExecutionPlan, ProgressCallback,
    RefreshOutcome, execute, refresh_all,
};

use super::Session;
use crate::Context;
use crate::engine::{display_diff, print_summary};
use crate::progress::{BarProgress, PromptConfirm};
use crate::resource::ItemAttributes;
use crate::ui;

// ============================================================================
// Refresh
// ============================================================================

/// Refresh every tracked record and save the result
fn refresh_session<C: ItemClient>(session: &mut Session<C>) -> Result<Vec<(String, RefreshOutcome)>> {
    let outcomes = refresh_all(&session.resource, session.state.items_mut())?;
    session.state.save()?;
    Ok(outcomes)
}

fn report_refresh(outcomes: &[(String, RefreshOutcome)]) {
    for (address, outcome) in outcomes {
        match outcome {
            RefreshOutcome::Drifted(changes) => {
                ui::warn(&format!(
                    "{} changed outside blogctl ({} attributes)",
                    address,
                    changes.len()
                ));
                for change in changes {
                    ui::dim(&format!("  {}", crate::engine::differ::format_change(change)));
                }
            }
            RefreshOutcome::Vanished => {
                ui::warn(&format!("{} no longer exists and will be recreated", address));
            }
            RefreshOutcome::Unchanged | RefreshOutcome::Untracked => {}
        }
    }
}

pub fn refresh(ctx: &Context) -> Result<()> {
    ui::header("Refreshing State");

    let mut session = Session::open(ctx)?;
    let outcomes = refresh_session(&mut session)?;
    report_refresh(&outcomes);

    let drifted = outcomes
        .iter()
        .filter(|(_, o)| matches!(o, RefreshOutcome::Drifted(_) | RefreshOutcome::Vanished))
        .count();

    println!();
    if drifted == 0 {
        ui::success(&format!("{} items up to date", outcomes.len()));
    } else {
        ui::info(&format!(
            "{} of {} items updated from the service",
            drifted,
            outcomes.len()
        ));
    }
    Ok(())
}

// ============================================================================
// Plan
// ============================================================================

fn build_plan<C: ItemClient>(
    session: &Session<C>,
    target: Option<&str>,
) -> ExecutionPlan<ItemAttributes> {
    ExecutionPlan::build(&session.resource, session.state.items(), session.desired())
        .filter_by_target(target)
}

pub fn plan(ctx: &Context, target: Option<&str>) -> Result<()> {
    ui::header("Planning");

    let mut session = Session::open(ctx)?;
    let outcomes = refresh_session(&mut session)?;
    if !ctx.quiet {
        report_refresh(&outcomes);
    }

    let plan = build_plan(&session, target);
    display_diff(&plan.diffs(), &plan.summary());
    Ok(())
}

// ============================================================================
// Apply / Destroy
// ============================================================================

/// Execute a plan and write the resulting records back to state
///
/// Untracked records whose address is no longer declared are dropped.
fn run_plan<C, P, K>(
    session: &mut Session<C>,
    plan: ExecutionPlan<ItemAttributes>,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut K,
) -> Result<ExecuteSummary>
where
    C: ItemClient,
    P: ProgressCallback,
    K: ConfirmCallback,
{
    let dry_run = opts.dry_run;
    let outcome = execute(&session.resource, plan, opts, progress, confirm)?;

    if dry_run {
        return Ok(outcome.summary);
    }

    let summary = outcome.apply_to(session.state.items_mut());
    let declared = &session.config.items;
    let before = session.state.items().len();
    session
        .state
        .items_mut()
        .retain(|address, data| data.is_tracked() || declared.contains_key(address));
    log::debug!(
        "Pruned {} untracked records",
        before - session.state.items().len()
    );
    session.state.save()?;

    Ok(summary)
}

fn finish(summary: &ExecuteSummary, verb: &str) -> Result<()> {
    print_summary(summary, verb);
    if !summary.is_success() {
        bail!("{} of the planned changes failed", summary.failed);
    }
    Ok(())
}

pub fn apply(
    ctx: &Context,
    target: Option<&str>,
    dry_run: bool,
    yes: bool,
    jobs: usize,
) -> Result<()> {
    ui::header("Applying Configuration");

    if dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let mut session = Session::open(ctx)?;
    let outcomes = refresh_session(&mut session)?;
    if !ctx.quiet {
        report_refresh(&outcomes);
    }

    let plan = build_plan(&session, target);
    display_diff(&plan.diffs(), &plan.summary());
    let has_changes = plan.has_changes();

    // Also runs with no changes: stale untracked records are pruned there
    let opts = ExecuteOptions {
        dry_run,
        jobs: jobs.max(1),
    };
    let summary = run_plan(
        &mut session,
        plan,
        opts,
        &mut BarProgress::new(ctx.quiet),
        &mut PromptConfirm::new(yes),
    )?;

    if !has_changes {
        return Ok(());
    }
    if dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(());
    }
    finish(&summary, "Apply")
}

pub fn destroy(ctx: &Context, target: Option<&str>, yes: bool) -> Result<()> {
    ui::header("Destroying Items");

    let mut session = Session::open(ctx)?;
    let plan = ExecutionPlan::for_destroy(&session.resource, session.state.items())
        .filter_by_target(target);
    display_diff(&plan.diffs(), &plan.summary());
    if !plan.has_changes() {
        return Ok(());
    }

    let summary = run_plan(
        &mut session,
        plan,
        ExecuteOptions::default(),
        &mut BarProgress::new(ctx.quiet),
        &mut PromptConfirm::new(yes),
    )?;
    finish(&summary, "Destroy")
}
