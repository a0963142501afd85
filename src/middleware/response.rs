use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, DrinkError};

/// Success envelope: `{success: true, drinks: <payload>}`
///
/// The payload is serialized up front so a failure can go through the
/// handler's error policy like any other.
#[derive(Debug)]
pub struct DrinksResponse {
    pub drinks: Value,
}

impl DrinksResponse {
    pub fn new<T: Serialize>(drinks: T) -> Result<Self, DrinkError> {
        Ok(Self {
            drinks: serde_json::to_value(drinks)?,
        })
    }
}

impl IntoResponse for DrinksResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(json!({ "success": true, "drinks": self.drinks }))).into_response()
    }
}

pub type DrinksResult = Result<DrinksResponse, ApiError>;
