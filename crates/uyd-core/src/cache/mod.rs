//! In-memory response caching.
//!
//! This module provides the `CacheManager`, a keyed store of fetched
//! payloads. Entries are fresh for 5 minutes; when a refetch fails the
//! previous payload is served instead, according to the `StalePolicy`.
//!
//! Nothing is persisted: the cache lives as long as the manager does.

pub mod manager;

pub use manager::{CacheManager, CachedData, StalePolicy, CACHE_TTL_MINUTES};
