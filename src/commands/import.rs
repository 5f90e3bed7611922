//! `blogctl import` - start tracking an item that already exists

use anyhow::{Result, bail};
use blogapi::ItemClient;
use declarative::ResourceExt;

use super::Session;
use crate::Context;
use crate::ui;

/// Read the item named `id` and track it under `address`
fn import_item<C: ItemClient>(session: &mut Session<C>, address: &str, id: &str) -> Result<()> {
    if let Some(existing) = session.state.items().get(address)
        && let Some(tracked) = &existing.id
    {
        bail!("{} is already tracked (id: {})", address, tracked);
    }

    let Some(data) = session.resource.import(id)? else {
        bail!("No item with ID {} exists", id);
    };

    log::debug!("Importing {} as {}", id, address);
    session.state.items_mut().insert(address.to_string(), data);
    session.state.save()
}

pub fn run(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let mut session = Session::open(ctx)?;
    import_item(&mut session, address, id)?;

    if !session.config.items.contains_key(address) {
        ui::warn(&format!(
            "{} is not in the config; add it or the next apply will delete it",
            address
        ));
    }
    ui::success(&format!("Imported {} as {}", id, address));
    Ok(())
}
