//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development when you only want the HTTP surface (with OpenAPI/Swagger UI). The
//! workspace's main `medilink-run` binary also runs the periodic backup task.
//!
//! The registry is saved once on shutdown (Ctrl-C).

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{rest_addr_from_env_value, router, AppState};
use medilink_core::{CoreConfig, DataStore, SharedRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medilink_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("MEDILINK_DATA_DIR").ok(),
        std::env::var("MEDILINK_BACKUP_INTERVAL_SECS").ok(),
        std::env::var("MEDILINK_EMAIL").ok(),
        std::env::var("MEDILINK_SEED_PROVIDERS").ok(),
    )?);
    let addr = rest_addr_from_env_value(std::env::var("MEDILINK_REST_ADDR").ok());

    let store = DataStore::from_config(&cfg);
    let registry = SharedRegistry::new(store.load_seeded(&cfg)?);

    tracing::info!("-- Starting MediLink REST API on {}", addr);

    let app = router(AppState {
        registry: registry.clone(),
        store: store.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    store.save(&registry.snapshot()?)?;
    tracing::info!("-- MediLink REST API stopped; data saved to {}", cfg.data_dir().display());
    Ok(())
}
