use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fitplan_api::{
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache},
    routes::{create_router, AppState},
    services::{PostgresCatalog, PostgresProfileStore, RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;

    let catalog = Arc::new(PostgresCatalog::new(pool.clone()));
    let profiles = Arc::new(PostgresProfileStore::new(pool));
    let mut engine = RecommendationEngine::new(catalog, profiles, config.engine_settings());

    let mut cache_handle = None;
    if let Some(redis_url) = &config.redis_url {
        let client = create_redis_client(redis_url)?;
        let (cache, handle) = Cache::new(client).await;
        engine = engine.with_cache(cache);
        cache_handle = Some(handle);
        tracing::info!("Recommendation cache enabled");
    }

    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
