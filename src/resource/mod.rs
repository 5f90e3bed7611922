//! Resources managed by blogctl
//!
//! Each resource implements [`declarative::Resource`] on top of a remote
//! client. Blog items are the only resource type.

pub mod item;

pub use item::{ItemAttributes, ItemResource, item_schema, tags_to_list};
