//! Data models for UYD backend records.
//!
//! This module contains the records the site displays:
//!
//! - `Program`: a featured or listed program
//! - `Event`: calendar events with dates, location and capacity
//! - `NewsArticle`, `NewsCategory`: news posts
//! - `SiteStats`: counters shown in the hero and impact sections
//! - `Listing`: list responses, bare or paginated
//! - `EventRegistration`, `RegistrationResponse`: event sign-up payloads
//!
//! Only `id` is relied upon; every other field is optional so a record
//! missing fields still decodes and renders.

pub mod event;
pub mod listing;
pub mod news;
pub mod program;
pub mod registration;
pub mod stats;

pub use event::Event;
pub use listing::Listing;
pub use news::{NewsArticle, NewsCategory};
pub use program::Program;
pub use registration::{EventRegistration, RegistrationResponse, SubscriptionResponse};
pub use stats::{EngagementStats, SiteStats, TotalCount};
