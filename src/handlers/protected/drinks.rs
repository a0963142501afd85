use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::Permissions;
use crate::database::models::drink::{Drink, LongDrink, Recipe};
use crate::error::DrinkError;
use crate::middleware::{DrinksResponse, DrinksResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

/// PATCH body. Blank titles and empty recipes leave the field unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

/// Longest title the `drinks.title` column holds.
pub const MAX_TITLE_CHARS: usize = 80;

type Payload<T> = Result<Json<T>, JsonRejection>;

fn body<T>(payload: Payload<T>) -> Result<T, DrinkError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| DrinkError::InvalidBody(e.body_text()))
}

fn check_title(title: &str) -> Result<(), DrinkError> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(DrinkError::InvalidBody(format!(
            "title longer than {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

/// Ids that are not integers cannot name a drink.
fn parse_id(raw: &str) -> Result<i32, DrinkError> {
    raw.parse().map_err(|_| DrinkError::NotFound)
}

async fn load(state: &AppState, raw_id: &str) -> Result<Drink, DrinkError> {
    let id = parse_id(raw_id)?;
    state.store.find_by_id(id).await?.ok_or(DrinkError::NotFound)
}

/// GET /drinks-detail - every drink in long form
pub async fn list_detail(State(state): State<AppState>) -> DrinksResult {
    list_long(&state)
        .await
        .map_err(|e| state.error_policy().apply(e))
}

async fn list_long(state: &AppState) -> Result<DrinksResponse, DrinkError> {
    let drinks = state.store.list_all().await?;
    DrinksResponse::new(drinks.iter().map(Drink::long).collect::<Vec<LongDrink>>())
}

/// POST /drinks - create a drink from `{title, recipe}`
pub async fn create(
    State(state): State<AppState>,
    Extension(permissions): Extension<Permissions>,
    payload: Payload<NewDrink>,
) -> DrinksResult {
    let drink = create_drink(&state, payload)
        .await
        .map_err(|e| state.error_policy().apply(e))?;

    info!(subject = ?permissions.subject(), "Created drink {}", drink.id);
    DrinksResponse::new(vec![drink.long()]).map_err(|e| state.error_policy().apply(e))
}

async fn create_drink(state: &AppState, payload: Payload<NewDrink>) -> Result<Drink, DrinkError> {
    let new_drink = body(payload)?;
    if new_drink.title.trim().is_empty() {
        return Err(DrinkError::InvalidBody("title must not be blank".to_string()));
    }
    check_title(&new_drink.title)?;

    Ok(state.store.create(&new_drink.title, &new_drink.recipe).await?)
}

/// PATCH /drinks/:id - update title and/or recipe
pub async fn update(
    State(state): State<AppState>,
    Extension(permissions): Extension<Permissions>,
    Path(id): Path<String>,
    payload: Payload<DrinkPatch>,
) -> DrinksResult {
    let drink = update_drink(&state, &id, payload)
        .await
        .map_err(|e| state.error_policy().apply(e))?;

    info!(subject = ?permissions.subject(), "Updated drink {}", drink.id);
    DrinksResponse::new(vec![drink.long()]).map_err(|e| state.error_policy().apply(e))
}

async fn update_drink(
    state: &AppState,
    id: &str,
    payload: Payload<DrinkPatch>,
) -> Result<Drink, DrinkError> {
    let patch = body(payload)?;
    let mut drink = load(state, id).await?;

    if let Some(title) = patch.title.filter(|t| !t.trim().is_empty()) {
        check_title(&title)?;
        drink.title = title;
    }
    if let Some(recipe) = patch.recipe.filter(|r| !r.ingredients().is_empty()) {
        drink.recipe = recipe;
    }

    state.store.update(&drink).await?;
    Ok(drink)
}

/// DELETE /drinks/:id - answers with the bare id of the removed drink
pub async fn delete(
    State(state): State<AppState>,
    Extension(permissions): Extension<Permissions>,
    Path(id): Path<String>,
) -> DrinksResult {
    let deleted = delete_drink(&state, &id)
        .await
        .map_err(|e| state.error_policy().apply(e))?;

    info!(subject = ?permissions.subject(), "Deleted drink {}", deleted);
    DrinksResponse::new(deleted).map_err(|e| state.error_policy().apply(e))
}

async fn delete_drink(state: &AppState, id: &str) -> Result<i32, DrinkError> {
    let drink = load(state, id).await?;
    state.store.delete(&drink).await?;
    Ok(drink.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert!(matches!(parse_id("abc"), Err(DrinkError::NotFound)));
        assert!(matches!(parse_id("-"), Err(DrinkError::NotFound)));
        assert_eq!(parse_id("12").unwrap(), 12);
    }

    #[test]
    fn patch_fields_are_optional() {
        let patch: DrinkPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.title.is_none());
        assert!(patch.recipe.is_none());

        let patch: DrinkPatch = serde_json::from_str(r#"{"title": "Mocha"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Mocha"));
    }

    #[test]
    fn titles_fit_the_column() {
        assert!(check_title(&"a".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(check_title(&"é".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(matches!(
            check_title(&"a".repeat(MAX_TITLE_CHARS + 1)),
            Err(DrinkError::InvalidBody(_))
        ));
    }
}
