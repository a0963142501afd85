use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{bearer_token, AuthError, Claims, KeySource, Permissions, RemoteJwks, TokenVerifier};
use crate::config::AuthConfig;

/// Verifies bearer tokens against the identity provider's signing keys and
/// the configured audience and issuer.
pub struct JwtVerifier {
    keys: Arc<dyn KeySource>,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(
        keys: Arc<dyn KeySource>,
        audience: &str,
        issuer: &str,
        algorithms: &[Algorithm],
    ) -> Self {
        let mut validation = Validation::new(algorithms.first().copied().unwrap_or(Algorithm::RS256));
        if !algorithms.is_empty() {
            validation.algorithms = algorithms.to_vec();
        }
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);

        Self { keys, validation }
    }

    /// Verifier backed by the provider's published JWKS.
    pub fn from_config(config: &AuthConfig) -> Self {
        let keys = RemoteJwks::new(config.jwks_url(), Duration::from_secs(config.jwks_cache_secs));
        Self::new(
            Arc::new(keys),
            &config.audience,
            &config.issuer(),
            &config.algorithms,
        )
    }

    async fn decoding_key(&self, token: &str) -> Result<DecodingKey, AuthError> {
        let header = decode_header(token)
            .map_err(|_| AuthError::invalid_header("Authorization malformed."))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::invalid_header("Authorization malformed."))?;

        let keys = self.keys.key_set().await?;
        let jwk = keys.find(&kid).ok_or_else(AuthError::key_not_found)?;

        DecodingKey::from_jwk(jwk).map_err(|e| {
            debug!(kid = %kid, error = %e, "Signing key is unusable");
            AuthError::key_not_found()
        })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, authorization: Option<&str>) -> Result<Permissions, AuthError> {
        let token = bearer_token(authorization)?;
        let key = self.decoding_key(token).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::token_expired(),
                ErrorKind::InvalidAudience
                | ErrorKind::InvalidIssuer
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::ImmatureSignature => AuthError::invalid_claims(),
                ErrorKind::InvalidSignature => AuthError::invalid_signature(),
                _ => AuthError::invalid_header("Unable to parse authentication token."),
            }
        })?;

        Permissions::try_from(data.claims)
    }
}
