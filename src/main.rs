use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{rest_addr_from_env_value, router, AppState};
use medilink_core::{BackupScheduler, CoreConfig, DataStore, SharedRegistry};

/// Enables info logs for this binary's own target.
const LOG_DIRECTIVE: &str = concat!(env!("CARGO_CRATE_NAME"), "=info");

/// Main entry point for the MediLink service
///
/// Runs the REST API and the periodic backup task side by side over one shared registry.
/// On Ctrl-C the server drains, the backup task stops, and the registry is saved one last
/// time.
///
/// # Environment Variables
/// - `MEDILINK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDILINK_DATA_DIR`: Directory for persisted data (default: "medilink_data")
/// - `MEDILINK_BACKUP_INTERVAL_SECS`: Seconds between automatic saves (default: 300)
/// - `MEDILINK_EMAIL`: Sender address for appointment reminders
/// - `MEDILINK_SEED_PROVIDERS`: `name:password` pairs registered on a fresh data directory
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse()?)
                .add_directive("medilink_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("MEDILINK_DATA_DIR").ok(),
        std::env::var("MEDILINK_BACKUP_INTERVAL_SECS").ok(),
        std::env::var("MEDILINK_EMAIL").ok(),
        std::env::var("MEDILINK_SEED_PROVIDERS").ok(),
    )?);
    let rest_addr = rest_addr_from_env_value(std::env::var("MEDILINK_REST_ADDR").ok());

    let store = DataStore::from_config(&cfg);
    let registry = SharedRegistry::new(store.load_seeded(&cfg)?);

    tracing::info!("++ Starting MediLink REST on {}", rest_addr);
    tracing::info!(
        "++ Backing up {} every {:?}",
        cfg.data_dir().display(),
        cfg.backup_interval()
    );

    // Start backup task
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = BackupScheduler::new(registry.clone(), store.clone(), cfg.backup_interval());
    let backup = tokio::spawn(scheduler.run(shutdown_rx));

    // Start REST server
    let rest_app = router(AppState {
        registry: registry.clone(),
        store: store.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let served = axum::serve(listener, rest_app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await;

    // The scheduler performs the final save on shutdown.
    shutdown_tx.send(true).ok();
    backup.await?;
    served?;

    tracing::info!("-- MediLink stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directive_names_this_crate() {
        assert_eq!(LOG_DIRECTIVE, "medilink_run=info");
        assert!(LOG_DIRECTIVE
            .parse::<tracing_subscriber::filter::Directive>()
            .is_ok());
    }
}
