//! Resource trait for declarative state management
//!
//! A Resource knows how to create, read, update and delete instances of
//! one resource type in some remote system. The host keeps one
//! [`ResourceData`] record per instance and drives it through
//! [`ResourceExt`].

use crate::schema::Schema;
use crate::types::AttributeChange;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tracked state of one resource instance
///
/// `id` is `None` when the instance does not exist remotely (never
/// created, deleted, or found missing on refresh). The attributes are the
/// last values sent to or read from the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData<A> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub attributes: A,
}

impl<A> ResourceData<A> {
    /// A record that points at an existing remote instance
    pub fn tracked(id: impl Into<String>, attributes: A) -> Self {
        Self {
            id: Some(id.into()),
            attributes,
        }
    }

    /// A record with no remote instance
    pub fn untracked(attributes: A) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    /// Whether this record points at a remote instance
    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    /// Forget the remote instance ("must be recreated")
    pub fn clear_id(&mut self) {
        self.id = None;
    }
}

/// Core trait for declarative resources
///
/// Implementations translate plain attribute structs into calls against a
/// remote API. They hold no state of their own between calls, and each
/// call is independent of any previous one.
///
/// Absence is not an error: `read` returns `Ok(None)` and `exists`
/// returns `Ok(false)` when the remote instance is gone. Every other
/// failure is returned as an error.
pub trait Resource: Send + Sync {
    /// Plain attribute struct for this resource type
    type Attributes: Clone + PartialEq + fmt::Debug + Send + Sync;

    /// Resource type name (e.g., "blog_item")
    fn resource_type(&self) -> &'static str;

    /// Attribute schema, used for diffs and replacement rules
    fn schema(&self) -> Schema;

    /// Identifier of the remote instance described by `attributes`
    fn identify(&self, attributes: &Self::Attributes) -> String;

    /// Render attributes as strings keyed by schema name
    ///
    /// Unordered collections must render in a canonical order so that two
    /// equal sets compare equal.
    fn flatten(&self, attributes: &Self::Attributes) -> BTreeMap<String, String>;

    /// Create a remote instance, returning its identifier
    fn create(&self, desired: &Self::Attributes) -> Result<String>;

    /// Read a remote instance, `None` if it does not exist
    fn read(&self, id: &str) -> Result<Option<Self::Attributes>>;

    /// Replace all attributes of an existing remote instance
    fn update(&self, desired: &Self::Attributes) -> Result<()>;

    /// Delete a remote instance
    fn delete(&self, id: &str) -> Result<()>;

    /// Check whether a remote instance exists
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.read(id)?.is_some())
    }

    /// Attributes that differ between `prior` and `desired`
    fn changes(
        &self,
        prior: &Self::Attributes,
        desired: &Self::Attributes,
    ) -> Vec<AttributeChange> {
        let schema = self.schema();
        let from = self.flatten(prior);
        let to = self.flatten(desired);

        schema
            .attributes
            .iter()
            .filter_map(|attr| {
                let before = from.get(&attr.name);
                let after = to.get(&attr.name);
                if before == after {
                    return None;
                }
                Some(AttributeChange {
                    attribute: attr.name.clone(),
                    from: before.cloned(),
                    to: after.cloned(),
                    forces_replacement: attr.force_new,
                })
            })
            .collect()
    }
}

/// What a refresh found for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The record had no identifier, nothing was read
    Untracked,
    /// Remote state matches the record
    Unchanged,
    /// Remote state differed and was copied into the record
    Drifted(Vec<AttributeChange>),
    /// The remote instance is gone and the identifier was cleared
    Vanished,
}

/// State-store operations built on top of [`Resource`]
///
/// These keep the record invariants: after create or update the record
/// mirrors the values sent; after refresh it mirrors the remote values;
/// a missing remote instance always leaves the record untracked.
pub trait ResourceExt: Resource {
    /// Create the remote instance and return a record tracking it
    fn create_tracked(
        &self,
        desired: &Self::Attributes,
    ) -> Result<ResourceData<Self::Attributes>> {
        let id = self.create(desired)?;
        log::debug!("Created {} {}", self.resource_type(), id);
        Ok(ResourceData::tracked(id, desired.clone()))
    }

    /// Pull remote state into `data`
    fn refresh(&self, data: &mut ResourceData<Self::Attributes>) -> Result<RefreshOutcome> {
        let Some(id) = data.id.clone() else {
            return Ok(RefreshOutcome::Untracked);
        };

        if !self.exists(&id)? {
            log::info!("{} {} no longer exists", self.resource_type(), id);
            data.clear_id();
            return Ok(RefreshOutcome::Vanished);
        }

        match self.read(&id)? {
            None => {
                log::info!("{} {} disappeared during refresh", self.resource_type(), id);
                data.clear_id();
                Ok(RefreshOutcome::Vanished)
            }
            Some(remote) => {
                let drift = self.changes(&data.attributes, &remote);
                data.id = Some(self.identify(&remote));
                data.attributes = remote;
                if drift.is_empty() {
                    Ok(RefreshOutcome::Unchanged)
                } else {
                    log::info!(
                        "{} {} drifted ({} attributes)",
                        self.resource_type(),
                        id,
                        drift.len()
                    );
                    Ok(RefreshOutcome::Drifted(drift))
                }
            }
        }
    }

    /// Send the full desired attribute set and mirror it into `data`
    fn update_tracked(
        &self,
        data: &mut ResourceData<Self::Attributes>,
        desired: &Self::Attributes,
    ) -> Result<()> {
        self.update(desired)?;
        data.id = Some(self.identify(desired));
        data.attributes = desired.clone();
        Ok(())
    }

    /// Delete the remote instance and clear the identifier
    ///
    /// An untracked record has nothing to delete.
    fn destroy(&self, data: &mut ResourceData<Self::Attributes>) -> Result<()> {
        let Some(id) = data.id.clone() else {
            return Ok(());
        };
        self.delete(&id)?;
        log::debug!("Deleted {} {}", self.resource_type(), id);
        data.clear_id();
        Ok(())
    }

    /// Import an existing remote instance by identifier
    ///
    /// Pass-through: the identifier is used as-is and the attributes come
    /// from a read. Returns `None` if nothing exists under `id`.
    fn import(&self, id: &str) -> Result<Option<ResourceData<Self::Attributes>>> {
        Ok(self
            .read(id)?
            .map(|attributes| ResourceData::tracked(self.identify(&attributes), attributes)))
    }
}

impl<R: Resource + ?Sized> ResourceExt for R {}
