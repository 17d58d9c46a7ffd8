//! HealthLink console.
//!
//! Without a subcommand this starts the interactive menus, with the registry saved in the
//! background every backup interval. The subcommands cover the few operations that are useful
//! from scripts.

mod menus;
mod pages;
mod prompt;

use clap::{Parser, Subcommand};
use medilink_core::export::{export_file, export_to_path};
use medilink_core::{BackupScheduler, CoreConfig, DataStore, NonEmptyText, SharedRegistry};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menus::Console;
use prompt::RustylinePrompter;

#[derive(Parser)]
#[command(name = "medilink")]
#[command(about = "HealthLink patient record console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menus (default)
    Menu,
    /// Export every patient's record entries as CSV
    Export {
        /// Output file (defaults to patient_data.csv in the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Save the registry once and exit
    Backup,
    /// List hospital staff profiles
    ListStaff,
    /// Register a healthcare provider login
    RegisterProvider {
        /// Provider name
        name: String,
        /// Provider password
        password: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the menus.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medilink=warn".parse()?)
                .add_directive("medilink_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::from_env_values(
        std::env::var("MEDILINK_DATA_DIR").ok(),
        std::env::var("MEDILINK_BACKUP_INTERVAL_SECS").ok(),
        std::env::var("MEDILINK_EMAIL").ok(),
        std::env::var("MEDILINK_SEED_PROVIDERS").ok(),
    )?;
    let store = DataStore::from_config(&cfg);
    let registry = SharedRegistry::new(store.load_seeded(&cfg)?);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_menu(&cfg, registry, store)?,
        Commands::Export { out } => {
            let patients = registry.patients()?;
            let path = match out {
                Some(path) => {
                    export_file(&patients, &path)?;
                    path
                }
                None => export_to_path(&patients, store.data_dir())?,
            };
            println!("Patient data exported to {}", path.display());
        }
        Commands::Backup => {
            BackupScheduler::new(registry, store.clone(), cfg.backup_interval()).run_once()?;
            println!("Data saved to {}", store.data_dir().display());
        }
        Commands::ListStaff => {
            let names = registry.read(|r| {
                r.staff()
                    .names()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })?;
            if names.is_empty() {
                println!("No hospital staff profiles found.");
            }
            for name in names {
                println!("{}", name);
            }
        }
        Commands::RegisterProvider { name, password } => {
            let name = NonEmptyText::new(&name)?;
            let password = NonEmptyText::new(&password)?;
            registry.try_write(|r| r.register_provider(name, &password).map(|_| ()))?;
            store.save(&registry.snapshot()?)?;
            println!("Provider registered.");
        }
    }

    Ok(())
}

/// Runs the menus on this thread while the backup scheduler ticks on a runtime worker.
fn run_menu(cfg: &CoreConfig, registry: SharedRegistry, store: DataStore) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = BackupScheduler::new(registry.clone(), store.clone(), cfg.backup_interval());
    let backup = runtime.spawn(scheduler.run(shutdown_rx));

    let mut console = Console::new(
        registry,
        store,
        cfg,
        RustylinePrompter::new()?,
        std::io::stdout(),
    );
    let result = console.run();

    shutdown_tx.send(true).ok();
    runtime.block_on(backup)?;
    Ok(result?)
}
