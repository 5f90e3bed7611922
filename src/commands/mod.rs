pub mod declarative;
pub mod import;
pub mod show;

use anyhow::Result;
use blogapi::{HttpClient, ItemClient};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::Context;
use crate::config::BlogConfig;
use crate::paths;
use crate::resource::{ItemAttributes, ItemResource};
use crate::state::State;

/// Everything a command needs: desired items, tracked records and a client
pub struct Session<C> {
    pub config: BlogConfig,
    pub state: State,
    pub resource: ItemResource<C>,
}

impl Session<HttpClient> {
    /// Load config and state from the paths selected on the command line
    pub fn open(ctx: &Context) -> Result<Self> {
        let config = BlogConfig::load(&config_path(ctx)?)?;
        let state = State::load(&state_path(ctx)?)?;
        let client = config.provider.client();
        Ok(Self::new(config, state, client))
    }
}

impl<C: ItemClient> Session<C> {
    pub fn new(config: BlogConfig, state: State, client: C) -> Self {
        Self {
            config,
            state,
            resource: ItemResource::new(client),
        }
    }

    /// Desired items by address
    pub fn desired(&self) -> &BTreeMap<String, ItemAttributes> {
        &self.config.items
    }
}

pub fn config_path(ctx: &Context) -> Result<PathBuf> {
    match &ctx.config_path {
        Some(path) => Ok(path.clone()),
        None => paths::config_file(),
    }
}

pub fn state_path(ctx: &Context) -> Result<PathBuf> {
    match &ctx.state_path {
        Some(path) => Ok(path.clone()),
        None => paths::state_file(),
    }
}
