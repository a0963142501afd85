use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::handlers::{protected, public};
use crate::middleware::{require_permission, PermissionGate};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let verifier = state.verifier.clone();
    let gate = move |permission: &'static str| {
        from_fn_with_state(PermissionGate::new(verifier.clone(), permission), require_permission)
    };

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Drinks
        .route(
            "/drinks",
            get(public::drinks::list)
                .post(protected::drinks::create.layer(gate(protected::POST_DRINKS))),
        )
        .route(
            "/drinks-detail",
            get(protected::drinks::list_detail.layer(gate(protected::GET_DRINKS_DETAIL))),
        )
        .route(
            "/drinks/:id",
            patch(protected::drinks::update.layer(gate(protected::PATCH_DRINKS)))
                .delete(protected::drinks::delete.layer(gate(protected::DELETE_DRINKS))),
        )
        // Global middleware
        .layer(cors_layer(&state.config.api))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
