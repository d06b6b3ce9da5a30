//! REST API client module for the UYD backend.
//!
//! This module provides the `ApiClient` for fetching programs, events,
//! news and site statistics, submitting event registrations and newsletter
//! subscriptions, and managing the bearer-token session.
//!
//! The backend uses bearer-token authentication; tokens are obtained from
//! the `/token/` endpoint and persisted through a `TokenStore`.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResponse, RequestOptions, TokenResponse, DEFAULT_BASE_URL, DEFAULT_SUBSCRIPTION_TYPE};
pub use error::ApiError;
