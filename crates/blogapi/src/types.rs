//! Wire types for the blog item service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An item record as stored by the remote service.
///
/// Tags are an ordered list on the wire. The service does not give the
/// order any meaning, but it returns them exactly as they were sent.
///
/// # Example
///
/// ```
/// use blogapi::Item;
///
/// let item = Item::new("post-1", "first post").with_tags(["go", "infra"]);
/// assert_eq!(item.tags, vec!["go".to_string(), "infra".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique name of the item. The service uses it as the item's key.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Tags attached to the item.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    /// Create an item without tags.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
        }
    }

    /// Replace the item's tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
