#[allow(clippy::single_component_path_imports)]
use serde_yaml;

#[derive(Debug, thiserror::Error)]
pub enum MediLinkError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] medilink_types::TextError),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid timestamp '{0}' (expected YYYY-MM-DD HH:MM:SS)")]
    InvalidTimestamp(String),

    #[error("a patient named '{0}' already exists")]
    DuplicatePatient(String),
    #[error("a provider named '{0}' already exists")]
    DuplicateProvider(String),
    #[error("a staff profile named '{0}' already exists")]
    DuplicateStaffProfile(String),
    #[error("access code is already in use")]
    DuplicateAccessCode,
    #[error("failed to allocate a unique access code after {0} attempts")]
    AccessCodeExhausted(usize),

    #[error("patient '{0}' not found")]
    PatientNotFound(String),
    #[error("provider '{0}' not found")]
    ProviderNotFound(String),
    #[error("access denied: invalid access code")]
    AccessDenied,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no appointment scheduled for '{0}'")]
    NoAppointment(String),
    #[error("record index {index} is out of range (patient has {len} entries)")]
    RecordIndexOutOfRange { index: usize, len: usize },
    #[error("reminder index {index} is out of range (patient has {len} reminders)")]
    ReminderIndexOutOfRange { index: usize, len: usize },

    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to write data file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read data file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize JSON: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize JSON: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("registry lock poisoned")]
    LockPoisoned,
    #[error("failed to deliver reminder: {0}")]
    ReminderDelivery(String),
}

pub type MediLinkResult<T> = std::result::Result<T, MediLinkError>;
