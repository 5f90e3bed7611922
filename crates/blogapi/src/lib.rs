//! # blogapi
//!
//! Blocking client for the blog item service.
//!
//! The service stores items (name, description, tags) keyed by name and
//! exposes four calls: create, get, update and delete. This crate provides:
//! - The [`Item`] wire record
//! - The [`ItemClient`] trait
//! - [`HttpClient`], a `ureq`-based implementation
//! - [`MockClient`], an in-memory implementation for tests
//! - Typed errors, where an absent item is always [`Error::NotFound`]
//!
//! ## Example
//!
//! ```no_run
//! use blogapi::{HttpClient, Item, ItemClient};
//!
//! let client = HttpClient::new("http://localhost:3001");
//! client.create_item(&Item::new("post-1", "first post").with_tags(["go"]))?;
//!
//! match client.get_item("post-2") {
//!     Ok(item) => println!("found {}", item),
//!     Err(e) if e.is_not_found() => println!("post-2 does not exist"),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), blogapi::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, HttpClient};
pub use backend::{ItemClient, MockClient};
pub use error::{Error, ErrorCategory, Result};
pub use types::Item;
