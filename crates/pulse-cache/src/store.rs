//! Generic keyed entity store
//!
//! One `Store<T>` per entity type, backed by `DashMap` for concurrent reads
//! while the single writer (the event reconciler) mutates entries.

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::merge::merge_value;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Result of a keyed merge: the previously cached value (if any) and the
/// merged value now stored.
#[derive(Debug, Clone)]
pub struct MergeOutcome<T> {
    pub before: Option<T>,
    pub after: T,
}

/// Keyed store for one entity type
#[derive(Debug)]
pub struct Store<T> {
    entries: DashMap<CacheKey, T>,
}

impl<T> Store<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get a clone of the cached value for `key`
    pub fn get(&self, key: CacheKey) -> Option<T> {
        self.entries.get(&key).map(|entry| entry.clone())
    }

    /// Insert or replace the value for `key`
    pub fn add(&self, key: CacheKey, value: T) {
        self.entries.insert(key, value);
        tracing::trace!(key = %key, "Cache entry stored");
    }

    /// Merge a partial wire payload onto the cached value for `key`.
    ///
    /// If nothing is cached yet, the payload decodes as-is and becomes the
    /// stored value (with `before` empty). Otherwise the payload's non-null
    /// fields overlay the cached value, and both the prior and merged values
    /// are returned so consumers can diff.
    pub fn merge(&self, key: CacheKey, patch: &Value) -> Result<MergeOutcome<T>, CacheError> {
        let before = self.get(key);

        let after: T = match &before {
            Some(existing) => {
                let mut base = serde_json::to_value(existing)?;
                merge_value(&mut base, patch);
                serde_json::from_value(base)?
            }
            None => serde_json::from_value(patch.clone())?,
        };

        self.entries.insert(key, after.clone());
        Ok(MergeOutcome { before, after })
    }

    /// Remove and return the value for `key`
    pub fn pop(&self, key: CacheKey) -> Option<T> {
        let evicted = self.entries.remove(&key).map(|(_, value)| value);
        if evicted.is_some() {
            tracing::trace!(key = %key, "Cache entry evicted");
        }
        evicted
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Store<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}
