//! `blogctl show` - print tracked state

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;

use super::state_path;
use crate::Context;
use crate::resource::tags_to_list;
use crate::state::{ItemRecords, State};
use crate::ui;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let state = State::load(&state_path(ctx)?)?;

    if json {
        println!("{}", to_json(state.items())?);
        return Ok(());
    }

    ui::header("Tracked Items");
    ui::kv("State", &state.path().display().to_string());
    if let Some(updated) = state.file.last_updated {
        ui::kv("Updated", &updated.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    }

    if state.items().is_empty() {
        println!();
        ui::info("Nothing tracked yet");
        return Ok(());
    }

    for (address, data) in state.items() {
        let (icon, id) = match &data.id {
            Some(id) => ("✓".green(), id.as_str()),
            None => ("✗".red(), "(not created)"),
        };
        println!();
        println!("  {} {} {}", icon, address.bold(), id.dimmed());
        if !ctx.quiet {
            ui::dim(&format!("  name: {}", data.attributes.name));
            ui::dim(&format!(
                "  description: {}",
                ui::truncate(&data.attributes.description, 60)
            ));
            if !data.attributes.tags.is_empty() {
                ui::dim(&format!(
                    "  tags: {}",
                    tags_to_list(&data.attributes.tags).join(", ")
                ));
            }
        }
    }
    Ok(())
}

fn to_json(items: &ItemRecords) -> Result<String> {
    serde_json::to_string_pretty(items).context("Failed to serialize state to JSON")
}
