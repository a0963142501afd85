pub mod jwks;
pub mod validator;

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

pub use jwks::{KeySource, RemoteJwks, StaticKeys};
pub use validator::JwtVerifier;

/// Authorization failure with the status the identity layer assigns to it.
/// The HTTP status of the response is decided by the error responder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub status: u16,
    pub code: &'static str,
    pub description: String,
}

impl AuthError {
    pub fn new(status: u16, code: &'static str, description: impl Into<String>) -> Self {
        Self {
            status,
            code,
            description: description.into(),
        }
    }

    pub fn header_missing() -> Self {
        Self::new(401, "authorization_header_missing", "Authorization header is expected.")
    }

    pub fn invalid_header(description: impl Into<String>) -> Self {
        Self::new(401, "invalid_header", description)
    }

    pub fn key_not_found() -> Self {
        Self::invalid_header("Unable to find the appropriate key.")
    }

    pub fn token_expired() -> Self {
        Self::new(401, "token_expired", "Token expired.")
    }

    pub fn invalid_claims() -> Self {
        Self::new(
            401,
            "invalid_claims",
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    pub fn invalid_signature() -> Self {
        Self::new(401, "invalid_signature", "Token signature is invalid.")
    }

    pub fn keys_unavailable() -> Self {
        Self::new(503, "jwks_unavailable", "Unable to fetch signing keys.")
    }

    /// The token verified but carries no permissions claim: the API in the
    /// identity provider is not configured for RBAC.
    pub fn permissions_missing() -> Self {
        Self::new(400, "invalid_claims", "Permissions not included in JWT.")
    }

    pub fn permission_denied() -> Self {
        Self::new(403, "unauthorized", "Permission not found.")
    }
}

/// Claims read from a verified access token.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Permission scopes granted to the caller of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    subject: Option<String>,
    scopes: HashSet<String>,
}

impl Permissions {
    pub fn new<I, S>(subject: Option<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject,
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.scopes.contains(permission)
    }

    /// Allow the request only when `permission` was granted.
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if self.contains(permission) {
            Ok(())
        } else {
            Err(AuthError::permission_denied())
        }
    }
}

impl TryFrom<Claims> for Permissions {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let scopes = claims.permissions.ok_or_else(AuthError::permissions_missing)?;
        Ok(Permissions::new(claims.sub, scopes))
    }
}

/// Turns the raw `Authorization` header value into a verified permission set.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, authorization: Option<&str>) -> Result<Permissions, AuthError>;
}

/// Extract the token from a `Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or_else(AuthError::header_missing)?;
    let parts: Vec<&str> = header.split_whitespace().collect();

    match parts.as_slice() {
        [] => Err(AuthError::header_missing()),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::invalid_header(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::invalid_header("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
        )),
    }
}
