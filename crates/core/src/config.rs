//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Binaries read environment variables and hand the raw values to
//! the `*_from_env_value` helpers here; nothing in the core reads the process environment
//! while the menus or request handlers are running.

use crate::constants::{
    DEFAULT_BACKUP_INTERVAL_SECS, DEFAULT_DATA_DIR, DEFAULT_REMINDER_FROM, OUTBOX_DIR_NAME,
    PATIENT_RECORDS_DIR_NAME,
};
use crate::{MediLinkError, MediLinkResult};
use medilink_types::{EmailAddress, NonEmptyText};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Provider credentials registered on first start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedProvider {
    pub name: NonEmptyText,
    pub password: NonEmptyText,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    backup_interval: Duration,
    reminder_from: EmailAddress,
    seed_providers: Vec<SeedProvider>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        data_dir: PathBuf,
        backup_interval: Duration,
        reminder_from: EmailAddress,
        seed_providers: Vec<SeedProvider>,
    ) -> MediLinkResult<Self> {
        if backup_interval.is_zero() {
            return Err(MediLinkError::InvalidInput(
                "backup interval must be greater than zero".into(),
            ));
        }

        Ok(Self {
            data_dir,
            backup_interval,
            reminder_from,
            seed_providers,
        })
    }

    /// Configuration with every default applied, rooted at `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> MediLinkResult<Self> {
        Self::new(
            data_dir,
            Duration::from_secs(DEFAULT_BACKUP_INTERVAL_SECS),
            EmailAddress::parse(DEFAULT_REMINDER_FROM)?,
            Vec::new(),
        )
    }

    /// Builds a configuration from raw environment values, applying defaults for unset ones.
    ///
    /// The arguments correspond to `MEDILINK_DATA_DIR`, `MEDILINK_BACKUP_INTERVAL_SECS`,
    /// `MEDILINK_EMAIL` and `MEDILINK_SEED_PROVIDERS`.
    pub fn from_env_values(
        data_dir: Option<String>,
        backup_interval: Option<String>,
        reminder_from: Option<String>,
        seed_providers: Option<String>,
    ) -> MediLinkResult<Self> {
        Self::new(
            data_dir_from_env_value(data_dir),
            backup_interval_from_env_value(backup_interval)?,
            reminder_from_env_value(reminder_from)?,
            seed_providers_from_env_value(seed_providers)?,
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn patient_records_dir(&self) -> PathBuf {
        self.data_dir.join(PATIENT_RECORDS_DIR_NAME)
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.data_dir.join(OUTBOX_DIR_NAME)
    }

    pub fn backup_interval(&self) -> Duration {
        self.backup_interval
    }

    pub fn reminder_from(&self) -> &EmailAddress {
        &self.reminder_from
    }

    pub fn seed_providers(&self) -> &[SeedProvider] {
        &self.seed_providers
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the data directory from an optional value, falling back to [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the backup interval (whole seconds) from an optional value.
///
/// If `value` is `None` or blank, returns the five minute default.
pub fn backup_interval_from_env_value(value: Option<String>) -> MediLinkResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_BACKUP_INTERVAL_SECS));
    };

    let secs: u64 = raw.parse().map_err(|_| {
        MediLinkError::InvalidInput(format!("backup interval must be whole seconds, got '{raw}'"))
    })?;
    if secs == 0 {
        return Err(MediLinkError::InvalidInput(
            "backup interval must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

/// Parse the reminder sender address from an optional value.
pub fn reminder_from_env_value(value: Option<String>) -> MediLinkResult<EmailAddress> {
    let raw = non_blank(value).unwrap_or_else(|| DEFAULT_REMINDER_FROM.to_string());
    Ok(EmailAddress::parse(raw)?)
}

/// Parse a `name:password,name:password` seed list.
///
/// Whitespace around entries is ignored. An entry without a `:` or with a blank side is
/// rejected rather than silently skipped.
pub fn seed_providers_from_env_value(value: Option<String>) -> MediLinkResult<Vec<SeedProvider>> {
    let Some(raw) = non_blank(value) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, password) = entry.split_once(':').ok_or_else(|| {
                MediLinkError::InvalidInput(format!(
                    "seed provider '{entry}' must be formatted as name:password"
                ))
            })?;
            Ok(SeedProvider {
                name: NonEmptyText::new(name)?,
                password: NonEmptyText::new(password)?,
            })
        })
        .collect()
}
