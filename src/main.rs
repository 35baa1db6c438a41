use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use watchlist_api::{
    config::Config,
    db::{create_pool, MemoryStore, PgRecordStore, RecordStore},
    models::MediaKind,
    routes::{create_router, AppState},
    services::{Catalog, Recommender, TmdbCatalog},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let (movies, tvshows) = init_stores(&config).await?;

    let catalog: Arc<dyn Catalog> = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_base_url.clone(),
    ));
    let recommender = Recommender::with_seed(catalog.clone(), config.rng_seed);

    let state = AppState::new(movies, tvshows, catalog, recommender);
    let app = create_router(state.clone(), &config.allowed_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Opens both collections. Any failure here aborts startup.
async fn init_stores(
    config: &Config,
) -> anyhow::Result<(Arc<dyn RecordStore>, Arc<dyn RecordStore>)> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory record store; data is lost on exit");
        return Ok((Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new())));
    }

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection initialized");

    Ok((
        Arc::new(PgRecordStore::new(pool.clone(), MediaKind::Movie)),
        Arc::new(PgRecordStore::new(pool, MediaKind::Tv)),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
