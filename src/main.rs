use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use drinks_api::auth::JwtVerifier;
use drinks_api::config::AppConfig;
use drinks_api::database::{DatabaseManager, DrinkStore, MemoryDrinkStore, PgDrinkStore};
use drinks_api::AppState;

#[derive(Parser)]
#[command(name = "drinks-api")]
#[command(about = "Coffee shop drinks catalog API")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Address to bind (overrides DRINKS_API_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides DRINKS_API_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Drop all drinks and seed the default drink on startup")]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.reset_db {
        config.database.reset_on_start = true;
    }

    let store: Arc<dyn DrinkStore> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::ensure_schema(&pool).await?;
            Arc::new(PgDrinkStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; drinks are kept in memory");
            Arc::new(MemoryDrinkStore::new())
        }
    };

    if config.database.reset_on_start {
        store.reset().await.context("failed to reset drinks")?;
        tracing::info!("Drinks reset to the seed menu");
    }

    let verifier = Arc::new(JwtVerifier::from_config(&config.auth));
    tracing::info!(
        issuer = %config.auth.issuer(),
        audience = %config.auth.audience,
        "Verifying tokens"
    );

    let bind_addr = config.bind_addr();
    let app = drinks_api::app(AppState::new(config, store, verifier));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
