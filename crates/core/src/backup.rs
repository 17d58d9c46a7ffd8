//! Periodic background saving of the registry.

use crate::persistence::DataStore;
use crate::shared::SharedRegistry;
use crate::MediLinkResult;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Clone, Debug)]
pub struct BackupScheduler {
    registry: SharedRegistry,
    store: DataStore,
    interval: Duration,
}

impl BackupScheduler {
    pub fn new(registry: SharedRegistry, store: DataStore, interval: Duration) -> Self {
        Self {
            registry,
            store,
            interval,
        }
    }

    /// Snapshots under the read lock, then writes without holding it.
    pub fn run_once(&self) -> MediLinkResult<()> {
        let snapshot = self.registry.snapshot()?;
        self.store.save(&snapshot)
    }

    async fn save_in_background(&self) {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || this.run_once()).await {
            Ok(Ok(())) => tracing::debug!("backup written to {}", self.store.data_dir().display()),
            Ok(Err(e)) => tracing::error!("backup failed: {}", e),
            Err(e) => tracing::error!("backup task panicked: {}", e),
        }
    }

    /// Saves on every tick until `shutdown` becomes `true`, then saves once more.
    ///
    /// The first tick fires immediately. Failures are logged and the loop keeps going.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "backup scheduler started (every {}s)",
            self.interval.as_secs_f64()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.save_in_background().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.save_in_background().await;
        tracing::info!("backup scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PATIENTS_FILENAME, PROVIDERS_FILENAME};
    use crate::registry::Registry;
    use medilink_types::NonEmptyText;
    use tempfile::TempDir;

    fn registry() -> SharedRegistry {
        let mut registry = Registry::new();
        registry
            .register_provider(
                NonEmptyText::new("City Hospital").unwrap(),
                &NonEmptyText::new("pw").unwrap(),
            )
            .unwrap();
        SharedRegistry::new(registry)
    }

    #[test]
    fn run_once_writes_registry() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let scheduler = BackupScheduler::new(registry(), store.clone(), Duration::from_secs(60));

        scheduler.run_once().expect("backup should succeed");
        assert!(temp_dir.path().join(PROVIDERS_FILENAME).is_file());
        assert_eq!(store.load().unwrap().providers().len(), 1);
    }

    #[tokio::test]
    async fn run_saves_immediately_and_on_shutdown() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let shared = registry();
        let scheduler =
            BackupScheduler::new(shared.clone(), store.clone(), Duration::from_secs(3600));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(rx));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(temp_dir.path().join(PATIENTS_FILENAME).is_file());

        shared.try_write(|r| r.set_inventory("Gauze", 9)).unwrap();
        tx.send(true).unwrap();
        handle.await.unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.clinic().inventory.get("Gauze"), Some(9));
    }
}
