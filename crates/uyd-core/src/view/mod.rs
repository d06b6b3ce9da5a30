//! View layer: page model, patch planning and formatting.
//!
//! Reconcilers are pure: they read a `Container` and records and return
//! `PatchOp`s. Hosts apply the ops to their own markup, or to a `Page`
//! with `Page::apply`.

pub mod format;
pub mod page;
pub mod reconcile;
pub mod templates;

pub use page::{Container, ContainerId, ElementId, Field, Node, Page, PatchOp};
