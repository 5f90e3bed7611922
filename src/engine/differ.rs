//! Plan and result display

use colored::{ColoredString, Colorize};
use declarative::{AttributeChange, DiffSummary, ExecuteSummary, PlanAction, ResourceDiff};

use crate::ui;

fn action_symbol(action: PlanAction) -> ColoredString {
    let symbol = action.symbol();
    match action {
        PlanAction::Create => symbol.green(),
        PlanAction::Delete => symbol.red(),
        PlanAction::Update => symbol.yellow(),
        PlanAction::Replace => symbol.magenta(),
        PlanAction::NoOp => symbol.dimmed(),
    }
}

/// Render one attribute change as `name: from → to`
pub fn format_change(change: &AttributeChange) -> String {
    let value = |v: &Option<String>| match v {
        Some(v) => ui::truncate(v, 40),
        None => "(unset)".to_string(),
    };

    let mut line = match (&change.from, &change.to) {
        (None, Some(to)) => format!("{}: {}", change.attribute, ui::truncate(to, 40)),
        (Some(from), None) => format!("{}: {}", change.attribute, ui::truncate(from, 40)),
        _ => format!(
            "{}: {} → {}",
            change.attribute,
            value(&change.from),
            value(&change.to)
        ),
    };

    if change.forces_replacement {
        line.push_str(" (forces replacement)");
    }
    line
}

/// One-line change counts shown under the plan
pub fn plan_counts(summary: &DiffSummary) -> String {
    format!(
        "Plan: {} to create, {} to update, {} to replace, {} to delete",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.replacements.to_string().magenta(),
        summary.removals.to_string().red()
    )
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[&ResourceDiff], summary: &DiffSummary) {
    if !summary.has_changes() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");

    for diff in diffs {
        let id = diff
            .id
            .as_deref()
            .map(|id| format!("(id: {})", id))
            .unwrap_or_default();

        println!(
            "│ {} {}.{} {}",
            action_symbol(diff.action),
            diff.resource_type,
            diff.address.bold(),
            id.dimmed()
        );
        for change in &diff.changes {
            println!("│     {}", format_change(change).dimmed());
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!("│ {}", plan_counts(summary));
    println!("└─────────────────────────────────────────────────────┘");
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary, verb: &str) {
    println!();
    if summary.is_success() {
        println!("  {} {} complete!", "✓".green().bold(), verb);
    } else {
        println!("  {} {} finished with errors", "⚠".yellow().bold(), verb);
    }

    if summary.created > 0 {
        println!("    • {} items created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} items updated", summary.modified);
    }
    if summary.replaced > 0 {
        println!("    • {} items replaced", summary.replaced);
    }
    if summary.removed > 0 {
        println!("    • {} items deleted", summary.removed);
    }
    if summary.skipped > 0 {
        println!("    • {} items skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "items".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(from: Option<&str>, to: Option<&str>, forces: bool) -> AttributeChange {
        AttributeChange {
            attribute: "description".into(),
            from: from.map(String::from),
            to: to.map(String::from),
            forces_replacement: forces,
        }
    }

    #[test]
    fn test_format_change_update() {
        let line = format_change(&change(Some("old"), Some("new"), false));
        assert_eq!(line, "description: old → new");
    }

    #[test]
    fn test_format_change_addition() {
        let line = format_change(&change(None, Some("new"), false));
        assert_eq!(line, "description: new");
    }

    #[test]
    fn test_format_change_forces_replacement() {
        let line = format_change(&change(Some("a"), Some("b"), true));
        assert!(line.ends_with("(forces replacement)"));
    }

    #[test]
    fn test_plan_counts() {
        colored::control::set_override(false);
        let summary = DiffSummary {
            additions: 2,
            removals: 1,
            modifications: 0,
            replacements: 3,
        };
        assert_eq!(
            plan_counts(&summary),
            "Plan: 2 to create, 0 to update, 3 to replace, 1 to delete"
        );
    }

    #[test]
    fn test_format_change_unset_side() {
        let mut c = change(Some("x"), Some("y"), false);
        c.from = None;
        c.to = None;
        assert_eq!(format_change(&c), "description: (unset) → (unset)");
    }
}
