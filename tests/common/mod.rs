#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use drinks_api::auth::{JwtVerifier, StaticKeys};
use drinks_api::config::AppConfig;
use drinks_api::database::{DatabaseError, Drink, DrinkStore, MemoryDrinkStore, Recipe};
use drinks_api::AppState;

pub const DOMAIN: &str = "coffee.example.auth0.com";
pub const AUDIENCE: &str = "drinks";
pub const KEY_ID: &str = "test-key-1";

const JWKS: &str = include_str!("../fixtures/jwks.json");
const PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa_private.pem");
const OTHER_PRIVATE_KEY: &str = include_str!("../fixtures/other_rsa_private.pem");

pub const BARISTA: &[&str] = &["get:drinks-detail"];
pub const MANAGER: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

/// Router wired to a drink store and the fixture signing keys.
pub struct TestApp<S = MemoryDrinkStore> {
    pub router: Router,
    pub store: Arc<S>,
}

/// Store whose backend is always unreachable.
pub struct FailingStore;

fn unreachable() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl DrinkStore for FailingStore {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        Err(unreachable())
    }

    async fn find_by_id(&self, _id: i32) -> Result<Option<Drink>, DatabaseError> {
        Err(unreachable())
    }

    async fn create(&self, _title: &str, _recipe: &Recipe) -> Result<Drink, DatabaseError> {
        Err(unreachable())
    }

    async fn update(&self, _drink: &Drink) -> Result<(), DatabaseError> {
        Err(unreachable())
    }

    async fn delete(&self, _drink: &Drink) -> Result<(), DatabaseError> {
        Err(unreachable())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        Err(unreachable())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(unreachable())
    }
}

pub fn config(collapse_errors_to_401: bool) -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "AUTH0_DOMAIN" => Some(DOMAIN.to_string()),
        "API_AUDIENCE" => Some(AUDIENCE.to_string()),
        "API_COLLAPSE_ERRORS_TO_401" => Some(collapse_errors_to_401.to_string()),
        _ => None,
    })
    .expect("test configuration")
}

pub fn test_app() -> TestApp {
    test_app_with(config(true))
}

pub fn test_app_with(config: AppConfig) -> TestApp {
    test_app_on(config, MemoryDrinkStore::new())
}

pub fn test_app_on<S: DrinkStore + 'static>(config: AppConfig, store: S) -> TestApp<S> {
    let keys = StaticKeys::from_json(JWKS).expect("fixture JWKS");
    let verifier = JwtVerifier::new(
        Arc::new(keys),
        &config.auth.audience,
        &config.auth.issuer(),
        &config.auth.algorithms,
    );
    let store = Arc::new(store);
    let state = AppState::new(config, store.clone(), Arc::new(verifier));

    TestApp {
        router: drinks_api::app(state),
        store,
    }
}

pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|test-user",
        "aud": AUDIENCE,
        "iss": format!("https://{}/", DOMAIN),
        "exp": chrono::Utc::now().timestamp() + 3600,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value) -> String {
    sign_with(PRIVATE_KEY, claims)
}

pub fn sign_with_other_key(claims: &Value) -> String {
    sign_with(OTHER_PRIVATE_KEY, claims)
}

fn sign_with(pem: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KEY_ID.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture private key");
    encode(&header, claims, &key).expect("signed token")
}

/// Valid token granting `permissions`.
pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions))
}

impl<S: DrinkStore> TestApp<S> {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send_request(request).await
    }

    pub async fn store_is_empty(&self) -> bool {
        self.store.list_all().await.expect("list drinks").is_empty()
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        (status, body)
    }
}
