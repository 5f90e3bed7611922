//! Attribute schema for a resource type

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attribute of a resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name as it appears in config and state
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Whether the attribute must be set
    pub required: bool,
    /// Whether changing the attribute forces a new remote resource
    pub force_new: bool,
}

impl Attribute {
    /// A required attribute that can change in place
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            force_new: false,
        }
    }

    /// An optional attribute that can change in place
    pub fn optional(name: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    /// Mark the attribute as forcing replacement when it changes
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

/// Ordered list of attributes describing a resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub attributes: Vec<Attribute>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Names of all required attributes
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name.as_str())
    }

    /// Required attributes that are absent or blank in flattened `values`
    pub fn missing<'a>(
        &'a self,
        values: &'a BTreeMap<String, String>,
    ) -> impl Iterator<Item = &'a str> {
        self.required()
            .filter(|name| values.get(*name).is_none_or(|v| v.trim().is_empty()))
    }
}
