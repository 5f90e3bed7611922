//! Tracked state: the last known record of every managed item, by address

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::ResourceData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resource::ItemAttributes;

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

pub type ItemRecords = BTreeMap<String, ResourceData<ItemAttributes>>;

/// On-disk state, stored as TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Last time the state was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// Item records keyed by address
    #[serde(default)]
    pub items: ItemRecords,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_updated: None,
            items: BTreeMap::new(),
        }
    }
}

/// A state file bound to its location on disk
#[derive(Debug)]
pub struct State {
    path: PathBuf,
    pub file: StateFile,
}

impl State {
    /// Load state from `path`, or start empty if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, using empty state", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                file: StateFile::default(),
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let file: StateFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if file.version > STATE_VERSION {
            anyhow::bail!(
                "State file {} has version {}, this blogctl understands up to {}",
                path.display(),
                file.version,
                STATE_VERSION
            );
        }

        log::debug!(
            "Loaded {} records from {}",
            file.items.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &ItemRecords {
        &self.file.items
    }

    pub fn items_mut(&mut self) -> &mut ItemRecords {
        &mut self.file.items
    }

    /// Stamp and write the state to disk
    pub fn save(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.file.version = STATE_VERSION;
        self.file.last_updated = Some(Utc::now());
        let content =
            toml::to_string_pretty(&self.file).context("Failed to serialize state to TOML")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}
