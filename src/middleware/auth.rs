use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{AuthError, TokenVerifier};
use crate::error::ApiError;

/// Required permission for one route plus the verifier that checks it.
#[derive(Clone)]
pub struct PermissionGate {
    verifier: Arc<dyn TokenVerifier>,
    permission: &'static str,
}

impl PermissionGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, permission: &'static str) -> Self {
        Self { verifier, permission }
    }
}

/// Verifies the bearer token, demands the gate's permission, and injects the
/// caller's `Permissions` into the request before running the handler.
///
/// Attach with `axum::middleware::from_fn_with_state(gate, require_permission)`.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::invalid_header("Authorization malformed."))?
                .to_string(),
        ),
        None => None,
    };

    let permissions = gate
        .verifier
        .verify(authorization.as_deref())
        .await
        .and_then(|permissions| {
            permissions.require(gate.permission)?;
            Ok(permissions)
        })
        .map_err(|e| {
            tracing::warn!(permission = gate.permission, "Request rejected: {}", e);
            e
        })?;

    request.extensions_mut().insert(permissions);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Permissions;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    /// Grants a fixed permission set to any caller presenting a header.
    struct FakeVerifier(Vec<&'static str>);

    #[async_trait]
    impl TokenVerifier for FakeVerifier {
        async fn verify(&self, authorization: Option<&str>) -> Result<Permissions, AuthError> {
            authorization.ok_or_else(AuthError::header_missing)?;
            Ok(Permissions::new(Some("fake".to_string()), self.0.clone()))
        }
    }

    fn router(granted: Vec<&'static str>) -> Router {
        let gate = PermissionGate::new(Arc::new(FakeVerifier(granted)), "get:drinks-detail");
        Router::new().route(
            "/secret",
            get(|Extension(p): Extension<Permissions>| async move {
                p.subject().unwrap_or_default().to_string()
            })
            .layer(from_fn_with_state(gate, require_permission)),
        )
    }

    async fn call(router: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/secret");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn passes_through_when_permission_granted() {
        let (status, body) = call(router(vec!["get:drinks-detail"]), Some("Bearer x")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "fake");
    }

    #[tokio::test]
    async fn rejects_missing_permission_with_401() {
        let (status, body) = call(router(vec!["post:drinks"]), Some("Bearer x")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], 403);
        assert_eq!(json["message"], "Permission not found.");
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let (status, body) = call(router(vec!["get:drinks-detail"]), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], 401);
        assert_eq!(json["success"], false);
    }
}
