//! Blog item resource
//!
//! Reconciles declared items against the remote item service. The item's
//! name is its identifier: renaming an item is a delete plus a create.

use anyhow::{Context, Result};
use blogapi::{Item, ItemClient};
use declarative::{Attribute, Resource, Schema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Resource type name used in plans and targets
pub const RESOURCE_TYPE: &str = "blog_item";

/// Declared attributes of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttributes {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ItemAttributes {
    #[cfg(test)]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tags: BTreeSet::new(),
        }
    }

    #[cfg(test)]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attribute values as compared in plans
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let tags = self
            .tags
            .iter()
            .map(|t| format!("{:?}", t))
            .collect::<Vec<_>>()
            .join(", ");

        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("description".to_string(), self.description.clone()),
            ("tags".to_string(), format!("[{}]", tags)),
        ])
    }

    /// Build the full record sent on create and update
    pub fn to_remote(&self) -> Item {
        Item {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: tags_to_list(&self.tags),
        }
    }
}

impl From<Item> for ItemAttributes {
    fn from(item: Item) -> Self {
        Self {
            name: item.name,
            description: item.description,
            tags: item.tags.into_iter().collect(),
        }
    }
}

/// Tag set as the ordered list the service expects (sorted)
pub fn tags_to_list(tags: &BTreeSet<String>) -> Vec<String> {
    tags.iter().cloned().collect()
}

/// Attribute schema of a blog item
pub fn item_schema() -> Schema {
    Schema::new()
        .with(Attribute::required("name", "The name of the item, also its unique ID").force_new())
        .with(Attribute::required("description", "A description of the item"))
        .with(Attribute::optional("tags", "An optional set of tags"))
}

/// Item reconciler backed by an [`ItemClient`]
pub struct ItemResource<C> {
    client: C,
}

impl<C: ItemClient> ItemResource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: ItemClient> Resource for ItemResource<C> {
    type Attributes = ItemAttributes;

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        item_schema()
    }

    fn identify(&self, attributes: &ItemAttributes) -> String {
        attributes.name.clone()
    }

    fn flatten(&self, attributes: &ItemAttributes) -> BTreeMap<String, String> {
        attributes.flatten()
    }

    fn create(&self, desired: &ItemAttributes) -> Result<String> {
        let item = desired.to_remote();
        log::debug!("Creating item {} with {} tags", item.name, item.tags.len());

        self.client.create_item(&item)?;
        Ok(item.name)
    }

    fn read(&self, id: &str) -> Result<Option<ItemAttributes>> {
        log::debug!("Reading item {}", id);

        match self.client.get_item(id) {
            Ok(item) => Ok(Some(item.into())),
            Err(e) if e.is_not_found() => {
                log::info!("Item {} not found, treating as absent", id);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("error finding Item with ID {}", id)),
        }
    }

    fn update(&self, desired: &ItemAttributes) -> Result<()> {
        let item = desired.to_remote();
        log::debug!("Updating item {} with {} tags", item.name, item.tags.len());

        self.client.update_item(&item)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        log::debug!("Deleting item {}", id);

        self.client.delete_item(id)?;
        Ok(())
    }

    fn exists(&self, id: &str) -> Result<bool> {
        log::debug!("Checking item {}", id);

        match self.client.get_item(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogapi::{Error, MockClient};
    use declarative::{PlanAction, RefreshOutcome, ResourceData, ResourceDiff, ResourceExt};

    fn resource() -> (ItemResource<MockClient>, MockClient) {
        let mock = MockClient::new();
        (ItemResource::new(mock.clone()), mock)
    }

    fn first_post() -> ItemAttributes {
        ItemAttributes::new("post-1", "first post").with_tags(["go", "infra"])
    }

    #[test]
    fn test_create_then_read() {
        let (resource, _mock) = resource();

        let id = resource.create(&first_post()).unwrap();
        assert_eq!(id, "post-1");

        let read = resource.read("post-1").unwrap().unwrap();
        assert_eq!(read, first_post());
    }

    #[test]
    fn test_create_sends_every_tag_once() {
        let (resource, mock) = resource();
        let desired = ItemAttributes::new("post-1", "x").with_tags(["b", "a", "c"]);

        resource.create(&desired).unwrap();
        let stored = mock.peek("post-1").unwrap();
        assert_eq!(stored.tags.len(), desired.tags.len());
        assert_eq!(stored.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_create_with_empty_tags() {
        let (resource, mock) = resource();
        resource
            .create(&ItemAttributes::new("post-1", "no tags"))
            .unwrap();
        assert!(mock.peek("post-1").unwrap().tags.is_empty());
    }

    #[test]
    fn test_create_propagates_client_error() {
        let (resource, mock) = resource();
        mock.fail_next(Error::http("HTTP 500", Some(500)));

        let err = resource.create(&first_post()).unwrap_err();
        let cause = err.downcast_ref::<Error>().unwrap();
        assert!(matches!(cause, Error::HttpError { status: Some(500), .. }));
        assert!(mock.is_empty());
    }

    #[test]
    fn test_create_existing_name_conflicts() {
        let (resource, mock) = resource();
        mock.insert(Item::new("post-1", "already there"));

        let err = resource.create(&first_post()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_read_absent_is_not_an_error() {
        let (resource, _mock) = resource();
        assert!(resource.read("missing").unwrap().is_none());
    }

    #[test]
    fn test_read_absent_clears_tracked_id() {
        let (resource, _mock) = resource();
        let mut data = ResourceData::tracked("missing", ItemAttributes::new("missing", "x"));

        let outcome = resource.refresh(&mut data).unwrap();
        assert_eq!(outcome, RefreshOutcome::Vanished);
        assert!(data.id.is_none());
    }

    #[test]
    fn test_read_failure_keeps_cause() {
        let (resource, mock) = resource();
        mock.insert(first_post().to_remote());
        mock.fail_next(Error::http("connection refused", None));

        let err = resource.read("post-1").unwrap_err();
        assert_eq!(err.to_string(), "error finding Item with ID post-1");

        let cause = err.downcast_ref::<Error>().unwrap();
        assert!(!cause.is_not_found());
        assert!(format!("{:#}", err).contains("connection refused"));
    }

    #[test]
    fn test_read_message_with_404_text_is_still_a_failure() {
        let (resource, mock) = resource();
        mock.fail_next(Error::Other("proxy echoed 404 page".to_string()));

        assert!(resource.read("post-1").is_err());
    }

    #[test]
    fn test_read_overwrites_drifted_attributes() {
        let (resource, mock) = resource();
        let mut data = resource.create_tracked(&first_post()).unwrap();

        mock.insert(Item::new("post-1", "edited by hand").with_tags(["rust"]));

        let outcome = resource.refresh(&mut data).unwrap();
        assert!(matches!(outcome, RefreshOutcome::Drifted(_)));
        assert_eq!(data.id.as_deref(), Some("post-1"));
        assert_eq!(data.attributes.description, "edited by hand");
        assert_eq!(data.attributes.tags, BTreeSet::from(["rust".to_string()]));
    }

    #[test]
    fn test_read_round_trips_unordered_tags() {
        let (resource, mock) = resource();
        mock.insert(Item::new("post-1", "x").with_tags(["zeta", "alpha"]));

        let read = resource.read("post-1").unwrap().unwrap();
        assert_eq!(read, ItemAttributes::new("post-1", "x").with_tags(["alpha", "zeta"]));
    }

    #[test]
    fn test_update_then_read() {
        let (resource, _mock) = resource();
        resource.create(&first_post()).unwrap();

        let revised = ItemAttributes::new("post-1", "revised");
        resource.update(&revised).unwrap();

        let read = resource.read("post-1").unwrap().unwrap();
        assert_eq!(read.description, "revised");
        assert!(read.tags.is_empty());
    }

    #[test]
    fn test_update_tag_list_matches_set_cardinality() {
        let (resource, mock) = resource();
        resource.create(&first_post()).unwrap();

        let desired = ItemAttributes::new("post-1", "x").with_tags(["a", "b", "c"]);
        resource.update(&desired).unwrap();

        let stored = mock.peek("post-1").unwrap();
        assert_eq!(stored.tags.len(), 3);
        assert!(stored.tags.iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_update_propagates_client_error() {
        let (resource, _mock) = resource();
        let err = resource.update(&first_post()).unwrap_err();
        assert!(err.downcast_ref::<Error>().unwrap().is_not_found());
    }

    #[test]
    fn test_delete_then_exists() {
        let (resource, _mock) = resource();
        resource.create(&first_post()).unwrap();
        assert!(resource.exists("post-1").unwrap());

        resource.delete("post-1").unwrap();
        assert!(!resource.exists("post-1").unwrap());
    }

    #[test]
    fn test_delete_propagates_client_error() {
        let (resource, mock) = resource();
        mock.insert(first_post().to_remote());
        mock.fail_next(Error::http("HTTP 503", Some(503)));

        assert!(resource.delete("post-1").is_err());
        assert!(mock.peek("post-1").is_some());
    }

    #[test]
    fn test_exists_other_failure_is_error() {
        let (resource, mock) = resource();
        mock.fail_next(Error::http("timeout", None));
        assert!(resource.exists("post-1").is_err());
    }

    #[test]
    fn test_exists_404_text_is_still_a_failure() {
        let (resource, mock) = resource();
        mock.insert(first_post().to_remote());
        mock.fail_next(Error::Other("upstream returned 404 page".to_string()));

        let err = resource.exists("post-1").unwrap_err();
        assert!(!err.downcast_ref::<Error>().unwrap().is_not_found());
        assert!(resource.exists("post-1").unwrap());
    }

    #[test]
    fn test_exists_makes_one_call() {
        let (resource, mock) = resource();
        resource.exists("post-1").unwrap();
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_identifier_is_name() {
        let (resource, _mock) = resource();
        assert_eq!(resource.identify(&first_post()), "post-1");
    }

    #[test]
    fn test_rename_forces_replacement() {
        let (resource, _mock) = resource();
        let prior = ResourceData::tracked("post-1", first_post());
        let renamed = ItemAttributes {
            name: "post-2".to_string(),
            ..first_post()
        };

        let diff = ResourceDiff::compute(&resource, "post", Some(&prior), Some(&renamed));
        assert_eq!(diff.action, PlanAction::Replace);

        let retagged = first_post().with_tags(["go"]);
        let diff = ResourceDiff::compute(&resource, "post", Some(&prior), Some(&retagged));
        assert_eq!(diff.action, PlanAction::Update);
    }

    #[test]
    fn test_tag_order_is_not_a_change() {
        let (resource, _mock) = resource();
        let a = ItemAttributes::new("p", "d").with_tags(["x", "y"]);
        let b = ItemAttributes::new("p", "d").with_tags(["y", "x"]);
        assert!(resource.changes(&a, &b).is_empty());
    }

    #[test]
    fn test_import_passthrough() {
        let (resource, mock) = resource();
        mock.insert(first_post().to_remote());

        let data = resource.import("post-1").unwrap().unwrap();
        assert_eq!(data.id.as_deref(), Some("post-1"));
        assert_eq!(data.attributes, first_post());
    }
}
