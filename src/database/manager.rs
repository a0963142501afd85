use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the drink stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Drink {0} not found")]
    NotFound(i32),

    #[error("Recipe could not be encoded: {0}")]
    RecipeEncode(#[source] serde_json::Error),

    #[error("Stored recipe for drink {id} is not valid JSON: {source}")]
    RecipeDecode {
        id: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS drinks (
    id SERIAL PRIMARY KEY,
    title VARCHAR(80) NOT NULL,
    recipe TEXT NOT NULL
)";

/// Builds the Postgres pool and owns the `drinks` table layout.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(connection_string)
            .await?;

        info!(
            "Created database pool for {}{}",
            url.host_str().unwrap_or("localhost"),
            url.path()
        );
        Ok(pool)
    }

    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(pool).await?;
        Ok(())
    }

    /// Drops every drink and recreates the table. Destroys all records.
    pub async fn drop_and_create(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("DROP TABLE IF EXISTS drinks").execute(pool).await?;
        Self::ensure_schema(pool).await?;
        info!("Recreated drinks table");
        Ok(())
    }
}
