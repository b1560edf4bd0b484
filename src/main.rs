use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cinerec_api::config::Config;
use cinerec_api::db;
use cinerec_api::routes::create_router;
use cinerec_api::services::EngineConfig;
use cinerec_api::state::AppState;
use cinerec_api::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(store.clone(), store, EngineConfig::from(&config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
