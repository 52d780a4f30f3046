//! Tag-based read-through cache for query results.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::api::endpoint::CacheTag;

#[derive(Clone, Debug)]
struct CacheEntry {
    tags: Vec<CacheTag>,
    value: serde_json::Value,
    stored_at: DateTime<Utc>,
}

/// In-memory cache of query responses, keyed by
/// [`EndpointCall::cache_key`](crate::api::EndpointCall::cache_key).
///
/// Entries carry the tags of the query that produced them and are dropped
/// when a matching tag is invalidated. The cache is never authoritative; it
/// only saves repeated reads.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached body for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Returns when `key` was stored.
    #[must_use]
    pub fn stored_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|entry| entry.stored_at)
    }

    /// Stores a body under `key` with the given tags.
    pub fn insert(&self, key: impl Into<String>, tags: Vec<CacheTag>, value: serde_json::Value) {
        self.lock().insert(
            key.into(),
            CacheEntry {
                tags,
                value,
                stored_at: Utc::now(),
            },
        );
    }

    /// Drops every entry carrying a tag matched by any of `tags`.
    ///
    /// Returns the number of entries dropped.
    pub fn invalidate(&self, tags: &[CacheTag]) -> usize {
        if tags.is_empty() {
            return 0;
        }

        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            !entry
                .tags
                .iter()
                .any(|provided| tags.iter().any(|tag| tag.matches(provided)))
        });
        let dropped = before - entries.len();

        if dropped > 0 {
            tracing::debug!(dropped, "Invalidated cached queries");
        }
        dropped
    }

    /// Drops everything.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
