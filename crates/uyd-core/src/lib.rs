//! uyd-core: data layer for the UYD website.
//!
//! - `api`: HTTP client for the backend, with bearer-token session handling
//! - `auth`: durable token storage
//! - `cache`: five-minute response cache with stale fallback
//! - `view`: page model and the reconcilers that patch it
//! - `data`: loaders that read through the cache and patch the page
//! - `forms`: validation, event registration and newsletter sign-up
//! - `notify`: user-facing notifications

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod data;
pub mod forms;
pub mod models;
pub mod notify;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheManager, StalePolicy};
pub use config::Config;
pub use data::{DataManager, InitReport};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use view::{Page, PatchOp};
