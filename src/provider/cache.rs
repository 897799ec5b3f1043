//! Client identifier -> provider-internal UUID cache.
//!
//! Append-only: the first value written for a client identifier wins.
//! Concurrent resolvers racing on the same identifier fetch the same UUID,
//! so the race is harmless.

use dashmap::DashMap;

/// Injected cache of resolved client UUIDs.
#[derive(Debug, Default)]
pub struct ClientUuidCache {
    inner: DashMap<String, String>,
}

impl ClientUuidCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with known mappings.
    pub fn seeded<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cache = Self::new();
        for (client_id, uuid) in entries {
            cache.insert(client_id, uuid);
        }
        cache
    }

    /// Cached UUID for `client_id`
    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<String> {
        self.inner.get(client_id).map(|v| v.value().clone())
    }

    /// Record a mapping; an existing entry is kept. Returns the cached value.
    pub fn insert(&self, client_id: impl Into<String>, uuid: impl Into<String>) -> String {
        self.inner
            .entry(client_id.into())
            .or_insert_with(|| uuid.into())
            .value()
            .clone()
    }

    /// Number of cached clients
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_wins() {
        let cache = ClientUuidCache::new();
        assert_eq!(cache.insert("oauth", "a"), "a");
        assert_eq!(cache.insert("oauth", "b"), "a");
        assert_eq!(cache.get("oauth").as_deref(), Some("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn seeded_cache_resolves() {
        let cache = ClientUuidCache::seeded([("oauth", "0b5e")]);
        assert_eq!(cache.get("oauth").as_deref(), Some("0b5e"));
        assert!(cache.get("other").is_none());
    }
}
