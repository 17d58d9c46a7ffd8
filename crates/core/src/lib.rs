//! # MediLink Core
//!
//! Core business logic for the MediLink patient record system.
//!
//! This crate contains pure data operations and file management:
//! - Patients, providers, staff profiles and clinic resources held in a [`Registry`]
//! - Access-code issuing and provider-scoped record access
//! - JSON/YAML persistence under a single data directory, plus CSV export
//! - Appointment reminders handed to an outbox, and periodic background saving
//!
//! **No UI concerns**: terminal menus and HTTP handlers belong in `medilink-cli` and
//! `api-rest`.

pub mod access_code;
pub mod appointments;
pub mod backup;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod education;
mod error;
pub mod export;
pub mod facility;
pub mod patient;
pub mod persistence;
pub mod provider;
pub mod record;
pub mod registry;
pub mod reminders;
pub mod shared;
pub mod staff;
pub mod validation;

pub use access_code::{AccessCode, AccessCodeStyle};
pub use backup::BackupScheduler;
pub use config::{CoreConfig, SeedProvider};
pub use error::{MediLinkError, MediLinkResult};
pub use medilink_types::{EmailAddress, NonEmptyText, TextError};
pub use patient::{MedicationReminder, NewPatient, Patient};
pub use persistence::DataStore;
pub use provider::HealthcareProvider;
pub use record::MedicalRecordEntry;
pub use registry::{Accessor, ContactMessage, PatientReport, RefillRequest, Registry};
pub use reminders::{OutboxSender, ReminderOutcome, ReminderSender};
pub use shared::SharedRegistry;
