//! Client trait and implementations for the item service.
//!
//! This module provides the [`ItemClient`] trait and two implementations:
//! [`http::HttpClient`] for talking to a running service, and
//! [`MockClient`] for tests.
//!
//! # Testing
//!
//! Use [`MockClient`] for testing without network access:
//!
//! ```
//! use blogapi::{Item, ItemClient, MockClient};
//!
//! let mock = MockClient::new();
//! mock.create_item(&Item::new("post-1", "first post")).unwrap();
//!
//! let item = mock.get_item("post-1").unwrap();
//! assert_eq!(item.description, "first post");
//! assert!(mock.get_item("missing").unwrap_err().is_not_found());
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::Item;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Remote item service operations.
///
/// Each call is one blocking round trip. Absence is reported as
/// [`Error::NotFound`], never through message text.
pub trait ItemClient: Send + Sync {
    /// Create a new item.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` if an item with the same name exists.
    fn create_item(&self, item: &Item) -> Result<()>;

    /// Fetch an item by identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the item doesn't exist.
    fn get_item(&self, id: &str) -> Result<Item>;

    /// Replace an existing item with the given record.
    fn update_item(&self, item: &Item) -> Result<()>;

    /// Delete an item by identifier.
    fn delete_item(&self, id: &str) -> Result<()>;
}

impl<C: ItemClient + ?Sized> ItemClient for Box<C> {
    fn create_item(&self, item: &Item) -> Result<()> {
        (**self).create_item(item)
    }

    fn get_item(&self, id: &str) -> Result<Item> {
        (**self).get_item(id)
    }

    fn update_item(&self, item: &Item) -> Result<()> {
        (**self).update_item(item)
    }

    fn delete_item(&self, id: &str) -> Result<()> {
        (**self).delete_item(id)
    }
}

/// In-memory item service for testing without network access.
///
/// Clones share the same storage, so a test can keep one handle to edit
/// items "out of band" while another handle is used by the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    items: Arc<Mutex<BTreeMap<String, Item>>>,
    failure: Arc<Mutex<Option<Error>>>,
    calls: Arc<AtomicUsize>,
}

impl MockClient {
    /// Create a new empty mock client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an item directly, bypassing the client API.
    pub fn insert(&self, item: Item) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(item.name.clone(), item);
    }

    /// Remove an item directly, bypassing the client API.
    pub fn remove(&self, name: &str) -> Option<Item> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).remove(name)
    }

    /// Look at a stored item without counting a call.
    pub fn peek(&self, name: &str) -> Option<Item> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next client call fail with `error`.
    pub fn fail_next(&self, error: Error) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Number of client calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ItemClient for MockClient {
    fn create_item(&self, item: &Item) -> Result<()> {
        self.begin_call()?;
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.contains_key(&item.name) {
            return Err(Error::AlreadyExists {
                name: item.name.clone(),
            });
        }
        items.insert(item.name.clone(), item.clone());
        Ok(())
    }

    fn get_item(&self, id: &str) -> Result<Item> {
        self.begin_call()?;
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(id).cloned().ok_or_else(|| Error::not_found(id))
    }

    fn update_item(&self, item: &Item) -> Result<()> {
        self.begin_call()?;
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(&item.name) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(Error::not_found(&item.name)),
        }
    }

    fn delete_item(&self, id: &str) -> Result<()> {
        self.begin_call()?;
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_client_new() {
        let mock = MockClient::new();
        assert!(mock.is_empty());
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_mock_client_create_and_get() {
        let mock = MockClient::new();
        mock.create_item(&Item::new("post-1", "first post").with_tags(["go"]))
            .unwrap();

        let item = mock.get_item("post-1").unwrap();
        assert_eq!(item.description, "first post");
        assert_eq!(item.tags, vec!["go"]);
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn test_mock_client_duplicate_create() {
        let mock = MockClient::new();
        mock.create_item(&Item::new("post-1", "a")).unwrap();

        let err = mock.create_item(&Item::new("post-1", "b")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert_eq!(mock.peek("post-1").unwrap().description, "a");
    }

    #[test]
    fn test_mock_client_update_replaces_record() {
        let mock = MockClient::new();
        mock.create_item(&Item::new("post-1", "a").with_tags(["x", "y"]))
            .unwrap();
        mock.update_item(&Item::new("post-1", "b")).unwrap();

        let item = mock.peek("post-1").unwrap();
        assert_eq!(item.description, "b");
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_mock_client_missing_item() {
        let mock = MockClient::new();
        assert!(mock.get_item("missing").unwrap_err().is_not_found());
        assert!(mock.update_item(&Item::new("missing", "x")).unwrap_err().is_not_found());
        assert!(mock.delete_item("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_mock_client_delete() {
        let mock = MockClient::new();
        mock.insert(Item::new("post-1", "a"));
        mock.delete_item("post-1").unwrap();
        assert!(mock.is_empty());
    }

    #[test]
    fn test_mock_client_fail_next_is_one_shot() {
        let mock = MockClient::new();
        mock.insert(Item::new("post-1", "a"));
        mock.fail_next(Error::http("HTTP 500", Some(500)));

        assert!(mock.get_item("post-1").is_err());
        assert!(mock.get_item("post-1").is_ok());
    }

    #[test]
    fn test_mock_client_clones_share_storage() {
        let mock = MockClient::new();
        let other = mock.clone();
        other.insert(Item::new("post-1", "a"));
        assert_eq!(mock.len(), 1);
    }

    #[test]
    fn test_boxed_client() {
        let mock = MockClient::new();
        let boxed: Box<dyn ItemClient> = Box::new(mock.clone());
        boxed.create_item(&Item::new("post-1", "a")).unwrap();
        assert!(mock.peek("post-1").is_some());
    }
}
