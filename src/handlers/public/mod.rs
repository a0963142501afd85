// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Anonymous callers may browse the menu; ingredient proportions stay hidden.

pub mod drinks;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Drinks API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "drinks": "GET /drinks (public), POST /drinks (post:drinks)",
                "drinks_detail": "GET /drinks-detail (get:drinks-detail)",
                "drink": "PATCH /drinks/:id (patch:drinks), DELETE /drinks/:id (delete:drinks)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": 503,
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
