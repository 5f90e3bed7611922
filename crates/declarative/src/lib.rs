//! # Declarative
//!
//! A framework for declarative resource lifecycle management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! tracking what exists remotely, and reconciling the two through plain
//! create/read/update/delete calls.
//!
//! ## Core Concepts
//!
//! - **Resource**: Translates an attribute struct into CRUD calls on a remote system
//! - **ResourceData**: The tracked record of one instance (identifier + attributes)
//! - **Schema**: Attribute metadata, including which attributes force replacement
//! - **ExecutionPlan**: Per-address diff between tracked and desired state
//! - **Executor**: Applies a plan, deletions first, with parallelism
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     Attribute, AutoConfirm, ExecuteOptions, ExecutionPlan, NoProgress, Resource, Schema,
//!     execute,
//! };
//! use std::collections::BTreeMap;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Page { slug: String, title: String }
//!
//! struct PageResource { client: MyClient }
//!
//! impl Resource for PageResource {
//!     type Attributes = Page;
//!
//!     fn resource_type(&self) -> &'static str { "page" }
//!
//!     fn schema(&self) -> Schema {
//!         Schema::new()
//!             .with(Attribute::required("slug", "Page slug").force_new())
//!             .with(Attribute::required("title", "Page title"))
//!     }
//!
//!     fn identify(&self, page: &Page) -> String { page.slug.clone() }
//!
//!     fn flatten(&self, page: &Page) -> BTreeMap<String, String> {
//!         BTreeMap::from([
//!             ("slug".into(), page.slug.clone()),
//!             ("title".into(), page.title.clone()),
//!         ])
//!     }
//!
//!     fn create(&self, page: &Page) -> anyhow::Result<String> { /* ... */ }
//!     fn read(&self, id: &str) -> anyhow::Result<Option<Page>> { /* ... */ }
//!     fn update(&self, page: &Page) -> anyhow::Result<()> { /* ... */ }
//!     fn delete(&self, id: &str) -> anyhow::Result<()> { /* ... */ }
//! }
//!
//! let plan = ExecutionPlan::build(&resource, &tracked, &desired);
//! let outcome = execute(
//!     &resource,
//!     plan,
//!     ExecuteOptions::default(),
//!     &mut NoProgress,
//!     &mut AutoConfirm,
//! )?;
//! outcome.apply_to(&mut tracked);
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod schema;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, ResourceDiff};
pub use executor::{ExecuteOutcome, StateUpdate, execute, refresh_all};
pub use planner::{ExecutionPlan, PlanEntry};
pub use resource::{RefreshOutcome, Resource, ResourceData, ResourceExt};
pub use schema::{Attribute, Schema};
pub use types::{
    ApplyResult, AttributeChange, ExecuteOptions, ExecuteSummary, PlanAction,
};
