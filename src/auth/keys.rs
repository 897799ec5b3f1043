//! Signing key store: `kid` -> decoding key, populated from the provider's
//! key set endpoint.
//!
//! The cache is append-only. A miss fetches the whole key set once and
//! caches every usable key it contains; an entry, once written, is never
//! replaced. Refetches are serialized so that tasks missing on the same
//! `kid` re-check the cache instead of stampeding the provider.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use jsonwebtoken::{
    DecodingKey,
    jwk::{Jwk, KeyAlgorithm, PublicKeyUse},
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Key resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    /// The key set does not contain the requested `kid`, even after a fetch.
    #[error("Signing key not found: {0}")]
    KeyNotFound(String),

    /// Network or decode error while fetching the key set.
    #[error("Key set fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The key set endpoint answered with a non-success status.
    #[error("Key set endpoint returned HTTP {0}")]
    Status(u16),
}

/// A verification key published by the provider.
#[derive(Clone)]
pub struct SigningKey {
    /// Key identifier (`kid`)
    pub key_id: String,
    /// Algorithm advertised for the key, if any
    pub algorithm: Option<KeyAlgorithm>,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Build from a JWK. Returns `None` for keys without a `kid`, encryption
    /// keys, and key types `jsonwebtoken` cannot verify with.
    #[must_use]
    pub fn from_jwk(jwk: &Jwk) -> Option<Self> {
        if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
            return None;
        }
        let key_id = jwk.common.key_id.clone()?;
        let decoding = DecodingKey::from_jwk(jwk).ok()?;
        Some(Self {
            key_id,
            algorithm: jwk.common.key_algorithm,
            decoding,
        })
    }

    /// Key material for signature verification
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Key set document; keys stay raw so one odd entry cannot poison the set.
#[derive(Debug, Deserialize)]
struct RawKeySet {
    #[serde(default)]
    keys: Vec<serde_json::Value>,
}

/// Process-wide signing key cache.
pub struct KeyStore {
    keys: DashMap<String, Arc<SigningKey>>,
    http: reqwest::Client,
    jwks_url: String,
    refresh: Mutex<()>,
}

impl KeyStore {
    /// Create an empty store that fetches from `jwks_url`.
    #[must_use]
    pub fn new(http: reqwest::Client, jwks_url: impl Into<String>) -> Self {
        Self {
            keys: DashMap::new(),
            http,
            jwks_url: jwks_url.into(),
            refresh: Mutex::new(()),
        }
    }

    /// Key set endpoint this store fetches from
    #[must_use]
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Resolve a signing key by `kid`.
    ///
    /// On a miss the full key set is fetched once and every usable key is
    /// cached. Fails with [`KeyStoreError::KeyNotFound`] if the fetched set
    /// still lacks `kid`.
    pub async fn get_signing_key(&self, kid: &str) -> Result<Arc<SigningKey>, KeyStoreError> {
        if let Some(key) = self.cached(kid) {
            return Ok(key);
        }

        let _guard = self.refresh.lock().await;

        // Populated by another task while we waited
        if let Some(key) = self.cached(kid) {
            return Ok(key);
        }

        debug!(kid = %kid, "Signing key not cached, fetching key set");
        let added = self.fetch().await?;
        debug!(kid = %kid, added, total = self.keys.len(), "Key set fetched");

        self.cached(kid)
            .ok_or_else(|| KeyStoreError::KeyNotFound(kid.to_string()))
    }

    /// Cached key for `kid`, without any I/O.
    #[must_use]
    pub fn cached(&self, kid: &str) -> Option<Arc<SigningKey>> {
        self.keys.get(kid).map(|entry| Arc::clone(entry.value()))
    }

    /// Cache every usable key from a raw key list. Existing entries are kept.
    ///
    /// Returns the number of newly cached keys.
    pub fn insert_key_set(&self, keys: &[serde_json::Value]) -> usize {
        keys.iter()
            .filter_map(|raw| match serde_json::from_value::<Jwk>(raw.clone()) {
                Ok(jwk) => SigningKey::from_jwk(&jwk),
                Err(e) => {
                    debug!(error = %e, "Skipping unparseable JWK");
                    None
                }
            })
            .filter(|key| self.insert(key.clone()))
            .count()
    }

    /// Cache a single key. Returns `false` if `kid` was already cached.
    pub fn insert(&self, key: SigningKey) -> bool {
        let mut inserted = false;
        self.keys.entry(key.key_id.clone()).or_insert_with(|| {
            inserted = true;
            Arc::new(key)
        });
        inserted
    }

    /// Number of cached keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is cached yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    async fn fetch(&self) -> Result<usize, KeyStoreError> {
        let response = self.http.get(&self.jwks_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KeyStoreError::Status(status.as_u16()));
        }
        let set: RawKeySet = response.json().await?;
        Ok(self.insert_key_set(&set.keys))
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("jwks_url", &self.jwks_url)
            .field("cached", &self.keys.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn oct_key(kid: &str) -> serde_json::Value {
        json!({"kty": "oct", "kid": kid, "alg": "HS256", "k": "c2VjcmV0LWtleS1tYXRlcmlhbA"})
    }

    fn store() -> KeyStore {
        KeyStore::new(reqwest::Client::new(), "http://127.0.0.1:9/certs")
    }

    #[test]
    fn insert_key_set_caches_every_usable_key() {
        // GIVEN: a set with two signing keys, one encryption key and one junk entry
        let keys = vec![
            oct_key("k1"),
            oct_key("k2"),
            json!({"kty": "oct", "kid": "enc", "use": "enc", "k": "c2VjcmV0"}),
            json!({"kty": "nonsense"}),
        ];
        let store = store();

        // WHEN: inserted
        let added = store.insert_key_set(&keys);

        // THEN: only the two signing keys are cached
        assert_eq!(added, 2);
        assert!(store.cached("k1").is_some());
        assert!(store.cached("k2").is_some());
        assert!(store.cached("enc").is_none());
    }

    #[test]
    fn key_without_kid_is_skipped() {
        let store = store();
        let added = store.insert_key_set(&[json!({"kty": "oct", "k": "c2VjcmV0"})]);
        assert_eq!(added, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn cached_entries_are_never_replaced() {
        // GIVEN: k1 cached
        let store = store();
        store.insert_key_set(&[oct_key("k1")]);
        let first = store.cached("k1").unwrap();

        // WHEN: the same kid arrives again
        let added = store.insert_key_set(&[oct_key("k1")]);

        // THEN: nothing new, same Arc
        assert_eq!(added, 0);
        assert!(Arc::ptr_eq(&first, &store.cached("k1").unwrap()));
    }

    #[tokio::test]
    async fn pre_seeded_key_resolves_without_io() {
        // GIVEN: a store whose endpoint is unreachable but that holds k1
        let store = store();
        store.insert_key_set(&[oct_key("k1")]);

        // WHEN/THEN: lookup succeeds from cache
        let key = store.get_signing_key("k1").await.unwrap();
        assert_eq!(key.key_id, "k1");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_fetch_error() {
        let store = store();
        let err = store.get_signing_key("missing").await.unwrap_err();
        assert!(matches!(err, KeyStoreError::Fetch(_)));
    }
}
