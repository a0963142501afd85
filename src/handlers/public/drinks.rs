use axum::extract::State;

use crate::database::models::drink::{Drink, ShortDrink};
use crate::error::DrinkError;
use crate::middleware::{DrinksResponse, DrinksResult};
use crate::state::AppState;

/// GET /drinks - every drink in short form
pub async fn list(State(state): State<AppState>) -> DrinksResult {
    list_short(&state)
        .await
        .map_err(|e| state.error_policy().apply(e))
}

async fn list_short(state: &AppState) -> Result<DrinksResponse, DrinkError> {
    let drinks = state.store.list_all().await?;
    DrinksResponse::new(drinks.iter().map(Drink::short).collect::<Vec<ShortDrink>>())
}
