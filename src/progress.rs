//! Terminal progress and confirmation for apply/destroy

use anyhow::Result;
use colored::Colorize;
use declarative::{ApplyResult, ConfirmCallback, PlanAction, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar with the standard blogctl style
pub fn bar(len: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb
}

/// Marker for a finished resource
pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::Created
        | ApplyResult::Modified
        | ApplyResult::Replaced
        | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

/// Progress bar per batch; hidden when quiet
pub struct BarProgress {
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, bar: None }
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize, destroying: bool) {
        if self.quiet {
            return;
        }
        let prefix = if destroying { "Deleting" } else { "Applying" };
        self.bar = Some(bar(count as u64, prefix));
    }

    fn on_resource_start(&mut self, address: &str, action: PlanAction) {
        if let Some(pb) = &self.bar {
            pb.set_message(format!("{} {}", action, address));
        }
    }

    fn on_resource_complete(&mut self, address: &str, result: &ApplyResult) {
        if let Some(pb) = &self.bar {
            pb.set_message(format!("{} {}", result_symbol(result), address));
            pb.inc(1);
            if let ApplyResult::Failed { error } = result {
                pb.println(format!("  {} {} {}", "✗".red(), address, error.dimmed()));
            }
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}

/// Interactive confirmation, skipped when `--yes` was given
pub struct PromptConfirm {
    assume_yes: bool,
}

impl PromptConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        Ok(confirmed)
    }
}
