//! Terminal rendering for the declarative engine
//!
//! Planning and execution live in the `declarative` crate; this module only
//! decides how plans and results look on screen.

pub mod differ;

pub use differ::{display_diff, print_summary};
