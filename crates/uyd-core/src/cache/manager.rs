use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

/// Entries are fresh for 5 minutes after they were fetched.
pub const CACHE_TTL_MINUTES: i64 = 5;

/// What `get_data` hands back when a refetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Serve the last good payload however old it is
    #[default]
    ServeStale,
    /// Treat an expired payload as gone
    Discard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    pub fn age_minutes(&self) -> i64 {
        self.age().num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

pub struct CacheManager {
    entries: Mutex<HashMap<String, CachedData<Value>>>,
    ttl: Duration,
    stale_policy: StalePolicy,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}

impl CacheManager {
    pub fn new(stale_policy: StalePolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
            stale_policy,
        }
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CachedData<Value>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True iff an entry exists for `key` and is within the TTL
    pub fn is_cache_valid(&self, key: &str) -> bool {
        self.entries()
            .get(key)
            .is_some_and(|cached| cached.is_fresh(self.ttl))
    }

    /// Return the cached payload for `key` when fresh, otherwise call
    /// `fetch` and cache its result.
    ///
    /// A failed fetch is logged and never returned: the previous payload is
    /// served instead (subject to the stale policy), or `None` when there is
    /// nothing to fall back on.
    pub async fn get_data<T, E, F, Fut>(&self, key: &str, fetch: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.is_cache_valid(key) {
            if let Some(data) = self.load(key) {
                debug!(cache = key, "Cache hit");
                return Some(data);
            }
        }

        debug!(cache = key, "Cache miss, fetching");
        match fetch().await {
            Ok(data) => {
                self.save(key, &data);
                Some(data)
            }
            Err(e) => {
                error!(cache = key, error = %e, "Error fetching data");
                self.fallback(key)
            }
        }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries().get(key).map(|cached| cached.data.clone())?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(cache = key, error = %e, "Cached payload has a different shape, ignoring");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => {
                // Replaced wholesale, never merged
                self.entries().insert(key.to_string(), CachedData::new(value));
            }
            Err(e) => warn!(cache = key, error = %e, "Failed to cache payload"),
        }
    }

    fn fallback<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let usable = match self.entries().get(key) {
            Some(cached) => {
                self.stale_policy == StalePolicy::ServeStale || cached.is_fresh(self.ttl)
            }
            None => false,
        };
        if !usable {
            return None;
        }
        let data = self.load(key);
        if data.is_some() {
            warn!(cache = key, "Serving stale data after failed refresh");
        }
        data
    }

    /// Drop the entry for `key`
    pub fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Human-readable age of the entry for `key`
    pub fn age(&self, key: &str) -> Option<String> {
        self.entries().get(key).map(CachedData::age_display)
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, by: Duration) {
        if let Some(cached) = self.entries().get_mut(key) {
            cached.cached_at = cached.cached_at - by;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
