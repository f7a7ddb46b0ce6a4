use std::sync::Arc;

use anyhow::Context;
use tinylink::{
    config::{AppConfig, StorageBackend},
    registry::{sqlite, LinkRegistry, MemoryRegistry, SqliteRegistry},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env; a missing file is fine when the env is already populated
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tinylink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    tracing::info!("Starting TinyLink on {}", config.bind_addr());
    tracing::info!("Base URL: {}", config.base_url);

    let registry: Arc<dyn LinkRegistry> = match config.storage_backend {
        StorageBackend::Sqlite => {
            let pool = sqlite::connect(&config.database_url, config.max_connections)
                .await
                .with_context(|| format!("failed to open database {}", config.database_url))?;
            Arc::new(SqliteRegistry::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; links will not survive a restart");
            Arc::new(MemoryRegistry::new())
        }
    };

    let bind_addr = config.bind_addr();
    let app = tinylink::router(Arc::new(AppState::new(config, registry)));

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
