use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::drink::{seed_drink, Drink, DrinkRow, Recipe};

/// CRUD access to drinks. Recipes cross this boundary as typed values and
/// are encoded to text only inside the store.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks in storage order; no ordering is guaranteed.
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError>;

    async fn create(&self, title: &str, recipe: &Recipe) -> Result<Drink, DatabaseError>;

    /// Persist the title and recipe of an already loaded drink.
    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError>;

    async fn delete(&self, drink: &Drink) -> Result<(), DatabaseError>;

    /// Remove every drink and insert the seed drink.
    async fn reset(&self) -> Result<(), DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode(row: DrinkRow) -> Result<Drink, DatabaseError> {
        let id = row.id;
        row.into_drink()
            .map_err(|source| DatabaseError::RecipeDecode { id, source })
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::decode).transpose()
    }

    async fn create(&self, title: &str, recipe: &Recipe) -> Result<Drink, DatabaseError> {
        let encoded = recipe.encode().map_err(DatabaseError::RecipeEncode)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(title)
        .bind(&encoded)
        .fetch_one(&self.pool)
        .await?;

        Self::decode(row)
    }

    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let encoded = drink.recipe.encode().map_err(DatabaseError::RecipeEncode)?;

        let result = sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(&encoded)
            .bind(drink.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(drink.id));
        }
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(drink.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(drink.id));
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        DatabaseManager::drop_and_create(&self.pool).await?;
        let (title, recipe) = seed_drink();
        self.create(&title, &recipe).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::models::drink::Ingredient;

    /// Connects only when DATABASE_URL points at a reachable Postgres.
    async fn store() -> Option<PgDrinkStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let config = DatabaseConfig { url: Some(url), max_connections: 1, reset_on_start: false };
        match DatabaseManager::connect(&config).await {
            Ok(pool) => {
                DatabaseManager::ensure_schema(&pool).await.ok()?;
                Some(PgDrinkStore::new(pool))
            }
            Err(e) => {
                println!("Skipping Postgres store test: {}", e);
                None
            }
        }
    }

    #[tokio::test]
    async fn pg_store_round_trip() {
        let Some(store) = store().await else { return };

        let recipe = Recipe::One(Ingredient::new("tea", "green", 2));
        let mut drink = store.create("Green tea", &recipe).await.unwrap();
        assert_eq!(drink.recipe, recipe);

        drink.title = "Matcha".into();
        store.update(&drink).await.unwrap();
        let found = store.find_by_id(drink.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Matcha");

        store.delete(&drink).await.unwrap();
        assert!(store.find_by_id(drink.id).await.unwrap().is_none());
        assert!(matches!(store.delete(&drink).await, Err(DatabaseError::NotFound(_))));
    }
}
