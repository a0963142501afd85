use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::drink::{seed_drink, Drink, Recipe};
use crate::database::repository::DrinkStore;

/// Drinks kept in process memory. Recipes are held encoded, like the
/// Postgres column, so both stores share one encode/decode boundary.
#[derive(Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    rows: BTreeMap<i32, (String, String)>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode(id: i32, title: &str, recipe: &str) -> Result<Drink, DatabaseError> {
        Ok(Drink {
            id,
            title: title.to_string(),
            recipe: Recipe::decode(recipe).map_err(|source| DatabaseError::RecipeDecode { id, source })?,
        })
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let inner = self.inner.read().await;
        inner
            .rows
            .iter()
            .map(|(id, (title, recipe))| Self::decode(*id, title, recipe))
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let inner = self.inner.read().await;
        inner
            .rows
            .get(&id)
            .map(|(title, recipe)| Self::decode(id, title, recipe))
            .transpose()
    }

    async fn create(&self, title: &str, recipe: &Recipe) -> Result<Drink, DatabaseError> {
        let encoded = recipe.encode().map_err(DatabaseError::RecipeEncode)?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.insert(id, (title.to_string(), encoded.clone()));

        Self::decode(id, title, &encoded)
    }

    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let encoded = drink.recipe.encode().map_err(DatabaseError::RecipeEncode)?;

        let mut inner = self.inner.write().await;
        let row = inner
            .rows
            .get_mut(&drink.id)
            .ok_or(DatabaseError::NotFound(drink.id))?;
        *row = (drink.title.clone(), encoded);
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        inner
            .rows
            .remove(&drink.id)
            .map(|_| ())
            .ok_or(DatabaseError::NotFound(drink.id))
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        {
            let mut inner = self.inner.write().await;
            *inner = Inner::default();
        }
        let (title, recipe) = seed_drink();
        self.create(&title, &recipe).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
