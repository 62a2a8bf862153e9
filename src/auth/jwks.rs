// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Cache Semantics
//!
//! - The key set is fetched on first use and kept for the life of the process
//! - `get_keys(true)` bypasses the cache and replaces it (key rotation)
//! - Concurrent refreshes are allowed; the last writer wins
//! - An optional TTL can be set, after which the next read refetches

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::AuthError;

/// A single published signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key ID, matched against the token header
    #[serde(default)]
    pub kid: Option<String>,
    /// Key type ("RSA" for every key we can use)
    pub kty: String,
    /// Declared algorithm, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Declared use ("sig")
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl SigningKey {
    /// Build the RSA verification key for this entry.
    pub fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        let kid = self.kid.as_deref().unwrap_or("<none>");
        if self.kty != "RSA" {
            return Err(AuthError::InvalidKey(format!(
                "key {kid} has type {}, expected RSA",
                self.kty
            )));
        }
        let (n, e) = match (self.n.as_deref(), self.e.as_deref()) {
            (Some(n), Some(e)) => (n, e),
            _ => {
                return Err(AuthError::InvalidKey(format!(
                    "key {kid} is missing its modulus or exponent"
                )))
            }
        };
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AuthError::InvalidKey(format!("key {kid}: {e}")))
    }
}

/// The provider's key set, as published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeySet {
    pub keys: Vec<SigningKey>,
}

impl SigningKeySet {
    /// Resolve a key by ID. Only the first entry with a given `kid` counts.
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

struct CacheEntry {
    keys: Arc<SigningKeySet>,
    fetched_at: Instant,
}

/// Fetches and caches the identity provider's signing keys.
#[derive(Clone)]
pub struct KeyProvider {
    /// JWKS URL
    jwks_url: String,
    /// Optional expiry for the cached set
    cache_ttl: Option<Duration>,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl KeyProvider {
    /// Create a key provider.
    ///
    /// # Arguments
    /// - `jwks_url`: e.g. `https://cognito-idp.<region>.amazonaws.com/<pool>/.well-known/jwks.json`
    /// - `client`: shared HTTP client; its timeout bounds every fetch
    pub fn new(jwks_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: None,
            cache: Arc::new(RwLock::new(None)),
            client,
        }
    }

    /// Expire the cached key set after `ttl`.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Return the key set, fetching it on first use or when `force_refresh` is set.
    pub async fn get_keys(&self, force_refresh: bool) -> Result<Arc<SigningKeySet>, AuthError> {
        if !force_refresh {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if self.is_fresh(entry) {
                    return Ok(entry.keys.clone());
                }
            }
        }

        self.refresh().await
    }

    /// Fetch the key set and replace the cache with it.
    pub async fn refresh(&self) -> Result<Arc<SigningKeySet>, AuthError> {
        let keys = Arc::new(self.fetch_keys().await?);
        info!(count = keys.len(), url = %self.jwks_url, "Fetched signing key set");

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    /// Check if a usable key set is cached.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        cache.as_ref().is_some_and(|entry| self.is_fresh(entry))
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.cache_ttl
            .is_none_or(|ttl| entry.fetched_at.elapsed() < ttl)
    }

    async fn fetch_keys(&self) -> Result<SigningKeySet, AuthError> {
        debug!(url = %self.jwks_url, "Fetching signing key set");
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<SigningKeySet>()
            .await
            .map_err(|e| AuthError::KeyFetch(format!("invalid JWKS payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::http_client;
    use crate::test_support::{jwks_json, refused_base_url, TEST_KID};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> KeyProvider {
        KeyProvider::new(
            format!("{}/.well-known/jwks.json", server.uri()),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn first_call_fetches_then_serves_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_json(&[TEST_KID])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(!provider.is_cached().await);

        let first = provider.get_keys(false).await.unwrap();
        let second = provider.get_keys(false).await.unwrap();

        assert!(provider.is_cached().await);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.find(TEST_KID).is_some());
    }

    #[tokio::test]
    async fn forced_refresh_refetches_and_replaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_json(&["old"])))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_json(&["new"])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let before = provider.get_keys(false).await.unwrap();
        assert!(before.find("old").is_some());

        let after = provider.get_keys(true).await.unwrap();
        assert!(after.find("new").is_some());
        assert!(after.find("old").is_none());

        let cached = provider.get_keys(false).await.unwrap();
        assert!(Arc::ptr_eq(&after, &cached));
    }

    #[tokio::test]
    async fn non_success_status_is_key_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.get_keys(false).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyFetch(_)));
        assert!(!provider.is_cached().await);
    }

    #[tokio::test]
    async fn malformed_payload_is_key_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"nope\": true}"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.get_keys(false).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyFetch(msg) if msg.contains("invalid JWKS payload")));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_key_fetch_error() {
        let provider = KeyProvider::new(
            format!("{}/.well-known/jwks.json", refused_base_url()),
            reqwest::Client::new(),
        );
        let err = provider.get_keys(false).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyFetch(_)), "got {err:?}");
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn slow_endpoint_times_out_as_key_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(jwks_json(&[TEST_KID]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = KeyProvider::new(
            format!("{}/.well-known/jwks.json", server.uri()),
            http_client(Duration::from_millis(200)).unwrap(),
        );
        let err = provider.get_keys(false).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyFetch(_)), "got {err:?}");
        assert!(!provider.is_cached().await);
    }

    #[tokio::test]
    async fn expired_ttl_triggers_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_json(&[TEST_KID])))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await.with_cache_ttl(Duration::ZERO);
        provider.get_keys(false).await.unwrap();
        assert!(!provider.is_cached().await);
        provider.get_keys(false).await.unwrap();
    }

    #[test]
    fn find_uses_first_entry_for_duplicate_kid() {
        let set = SigningKeySet {
            keys: vec![
                SigningKey {
                    kid: Some("dup".into()),
                    kty: "RSA".into(),
                    alg: None,
                    key_use: None,
                    n: Some("first".into()),
                    e: Some("AQAB".into()),
                },
                SigningKey {
                    kid: Some("dup".into()),
                    kty: "RSA".into(),
                    alg: None,
                    key_use: None,
                    n: Some("second".into()),
                    e: Some("AQAB".into()),
                },
            ],
        };
        assert_eq!(set.find("dup").unwrap().n.as_deref(), Some("first"));
        assert!(set.find("missing").is_none());
    }

    #[test]
    fn non_rsa_key_is_rejected() {
        let key = SigningKey {
            kid: Some("ec".into()),
            kty: "EC".into(),
            alg: Some("ES256".into()),
            key_use: None,
            n: None,
            e: None,
        };
        assert!(matches!(key.decoding_key(), Err(AuthError::InvalidKey(_))));
    }
}
