//! Signing-key sources for token verification.
//!
//! `RemoteJwks` fetches the identity provider's published key set and keeps
//! it for a fixed TTL. `StaticKeys` serves a key set supplied up front.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::AuthError;

#[async_trait]
pub trait KeySource: Send + Sync {
    async fn key_set(&self) -> Result<JwkSet, AuthError>;
}

/// Key set fixed at construction.
pub struct StaticKeys {
    keys: JwkSet,
}

impl StaticKeys {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }
}

#[async_trait]
impl KeySource for StaticKeys {
    async fn key_set(&self) -> Result<JwkSet, AuthError> {
        Ok(self.keys.clone())
    }
}

struct CachedJwks {
    keys: JwkSet,
    fetched_at: Instant,
}

/// JWKS endpoint of the identity provider, cached for `ttl`.
pub struct RemoteJwks {
    jwks_url: String,
    http_client: reqwest::Client,
    ttl: Duration,
    cache: RwLock<Option<CachedJwks>>,
}

impl RemoteJwks {
    pub fn new(jwks_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            http_client: reqwest::Client::new(),
            ttl,
            cache: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> Result<JwkSet, reqwest::Error> {
        info!(jwks_url = %self.jwks_url, "Fetching signing keys");
        self.http_client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn key_set(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!(jwks_url = %self.jwks_url, "Using cached signing keys");
                    return Ok(cached.keys.clone());
                }
            }
        }

        let keys = self.fetch().await.map_err(|e| {
            warn!(jwks_url = %self.jwks_url, error = %e, "Signing key fetch failed");
            AuthError::keys_unavailable()
        })?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }
}
