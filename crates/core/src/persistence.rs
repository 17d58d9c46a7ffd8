//! File-backed storage for the registry.
//!
//! All state lives under a single data directory:
//!
//! ```text
//! <data_dir>/
//!   patients.json              name -> patient
//!   providers.json             providers with their patient lists and catalogs
//!   clinic.json                appointments, inventory, bed occupancy
//!   staff_profiles.yaml        staff directory
//!   patient_records/<name>/<YYYY-mm-dd_HH-MM-SS>.json
//!   outbox/                    queued reminder messages
//! ```
//!
//! Whole-file writes go to a sibling `.tmp` file first and are then renamed over the target, so
//! a crash mid-write leaves the previous copy intact.

use crate::config::CoreConfig;
use crate::constants::{
    CLINIC_FILENAME, PATIENTS_FILENAME, PATIENT_RECORDS_DIR_NAME, PROVIDERS_FILENAME,
    SNAPSHOT_FILENAME_FORMAT, STAFF_PROFILES_FILENAME,
};
use crate::patient::Patient;
use crate::provider::HealthcareProvider;
use crate::registry::{ClinicState, Registry};
use crate::staff::StaffDirectory;
use crate::validation::validate_path_component;
use crate::{MediLinkError, MediLinkResult};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct DataStore {
    data_dir: PathBuf,
}

impl DataStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.data_dir())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn patient_records_dir(&self) -> PathBuf {
        self.data_dir.join(PATIENT_RECORDS_DIR_NAME)
    }

    /// Loads the registry.
    ///
    /// Missing files mean "nothing stored yet". A corrupt staff file is logged and treated as
    /// empty; any other corrupt file is an error. Patients that only exist as snapshots under
    /// `patient_records/` are recovered from their newest snapshot.
    pub fn load(&self) -> MediLinkResult<Registry> {
        let mut patients: BTreeMap<String, Patient> =
            read_json(&self.data_dir.join(PATIENTS_FILENAME))?.unwrap_or_default();
        let providers: Vec<HealthcareProvider> =
            read_json(&self.data_dir.join(PROVIDERS_FILENAME))?.unwrap_or_default();
        let clinic: ClinicState =
            read_json(&self.data_dir.join(CLINIC_FILENAME))?.unwrap_or_default();
        let staff = self.load_staff();

        let mut recovered = Vec::new();
        for snapshot in self.load_patient_snapshots() {
            let name = snapshot.name.as_str().to_string();
            if patients.contains_key(&name) {
                continue;
            }
            if patients
                .values()
                .any(|p| p.access_code == snapshot.access_code)
            {
                tracing::warn!(
                    "snapshot for '{}' reuses an access code already in use; skipped",
                    name
                );
                continue;
            }
            tracing::info!("recovered patient '{}' from snapshot", name);
            recovered.push(name.clone());
            patients.insert(name, snapshot);
        }

        tracing::debug!(
            "loaded {} patients and {} providers from {}",
            patients.len(),
            providers.len(),
            self.data_dir.display()
        );
        let mut registry = Registry::from_parts(patients, providers, staff, clinic);
        for name in &recovered {
            registry.adopt_orphan(name);
        }
        Ok(registry)
    }

    /// Loads the registry and, on first start (no providers stored), registers the
    /// configured seed providers.
    pub fn load_seeded(&self, cfg: &CoreConfig) -> MediLinkResult<Registry> {
        let mut registry = self.load()?;
        if registry.providers().is_empty() && !cfg.seed_providers().is_empty() {
            let added = registry.seed_providers(cfg.seed_providers());
            tracing::info!("registered {} seed providers", added);
        }
        Ok(registry)
    }

    fn load_staff(&self) -> StaffDirectory {
        let path = self.data_dir.join(STAFF_PROFILES_FILENAME);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return StaffDirectory::default(),
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                return StaffDirectory::default();
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(staff) => staff,
            Err(e) => {
                tracing::warn!(
                    "staff profiles in {} are unreadable, starting empty: {}",
                    path.display(),
                    e
                );
                StaffDirectory::default()
            }
        }
    }

    /// Writes every persisted file from `registry`.
    pub fn save(&self, registry: &Registry) -> MediLinkResult<()> {
        fs::create_dir_all(&self.data_dir).map_err(MediLinkError::DataDirCreation)?;

        write_json(&self.data_dir.join(PATIENTS_FILENAME), registry.patient_map())?;
        write_json(&self.data_dir.join(PROVIDERS_FILENAME), registry.providers())?;
        write_json(&self.data_dir.join(CLINIC_FILENAME), registry.clinic())?;

        let staff_yaml =
            serde_yaml::to_string(registry.staff()).map_err(MediLinkError::YamlSerialization)?;
        write_atomic(
            &self.data_dir.join(STAFF_PROFILES_FILENAME),
            staff_yaml.as_bytes(),
        )?;

        tracing::debug!("registry saved to {}", self.data_dir.display());
        Ok(())
    }

    /// Writes a timestamped copy of one patient under `patient_records/<name>/`.
    pub fn save_patient_snapshot(&self, patient: &Patient) -> MediLinkResult<PathBuf> {
        validate_path_component(patient.name.as_str())?;

        let dir = self.patient_records_dir().join(patient.name.as_str());
        fs::create_dir_all(&dir).map_err(MediLinkError::DataDirCreation)?;

        let path = dir.join(format!(
            "{}.json",
            Utc::now().format(SNAPSHOT_FILENAME_FORMAT)
        ));
        write_json(&path, patient)?;
        Ok(path)
    }

    /// Removes every snapshot of `patient_name`, so a deleted patient is not recovered on the
    /// next load. Returns `false` when there was nothing to remove.
    pub fn delete_patient_snapshots(&self, patient_name: &str) -> MediLinkResult<bool> {
        validate_path_component(patient_name)?;

        let dir = self.patient_records_dir().join(patient_name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!("removed snapshots in {}", dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MediLinkError::FileWrite(e)),
        }
    }

    /// Reads the newest snapshot for each patient directory.
    ///
    /// Unreadable or unparsable files are skipped with a warning.
    pub fn load_patient_snapshots(&self) -> Vec<Patient> {
        let mut patients = Vec::new();

        let dir_iter = match fs::read_dir(self.patient_records_dir()) {
            Ok(it) => it,
            Err(_) => return patients,
        };

        for patient_dir in dir_iter.flatten() {
            let patient_path = patient_dir.path();
            if !patient_path.is_dir() {
                continue;
            }

            let file_iter = match fs::read_dir(&patient_path) {
                Ok(it) => it,
                Err(e) => {
                    tracing::warn!("failed to read {}: {}", patient_path.display(), e);
                    continue;
                }
            };

            let mut snapshots: Vec<PathBuf> = file_iter
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            // Filenames are zero-padded timestamps, so lexical order is chronological.
            snapshots.sort();

            let newest = snapshots.iter().rev().find_map(|path| {
                match read_json::<Patient>(path) {
                    Ok(Some(patient)) => Some(patient),
                    Ok(None) => None,
                    Err(e) => {
                        tracing::warn!("skipping snapshot {}: {}", path.display(), e);
                        None
                    }
                }
            });

            if let Some(patient) = newest {
                patients.push(patient);
            }
        }

        patients
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> MediLinkResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MediLinkError::FileRead(e)),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(MediLinkError::Deserialization)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> MediLinkResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(MediLinkError::Serialization)?;
    write_atomic(path, json.as_bytes())
}

fn write_atomic(path: &Path, contents: &[u8]) -> MediLinkResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).map_err(MediLinkError::FileWrite)?;
    fs::rename(&tmp, path).map_err(MediLinkError::FileWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::parse_appointment_date;
    use crate::patient::NewPatient;
    use crate::record::MedicalRecordEntry;
    use medilink_types::NonEmptyText;
    use tempfile::TempDir;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    fn populated_registry() -> (Registry, String) {
        let mut registry = Registry::new();
        registry
            .create_staff_profile(text("Dr Grey"), &text("pw"))
            .unwrap();
        let code = registry
            .register_patient(
                "Dr Grey",
                NewPatient::new(
                    text("Jane Doe"),
                    MedicalRecordEntry::now("Asthma", vec!["Inhaler".into()], vec![]),
                ),
            )
            .unwrap()
            .access_code
            .to_string();
        registry
            .schedule_appointment(
                "Dr Grey",
                &code,
                parse_appointment_date("2025-04-01").unwrap(),
            )
            .unwrap();
        registry.set_inventory("Gauze", 12).unwrap();
        registry.set_bed_occupancy("ICU", 3).unwrap();
        (registry, code)
    }

    #[test]
    fn empty_directory_loads_empty_registry() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path().join("missing"));
        let registry = store.load().expect("load should succeed");
        assert_eq!(registry.patients().count(), 0);
        assert!(registry.providers().is_empty());
    }

    #[test]
    fn save_then_load_restores_everything() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let (registry, code) = populated_registry();

        store.save(&registry).expect("save should succeed");
        let loaded = store.load().expect("load should succeed");

        assert_eq!(loaded, registry);
        assert!(loaded.authenticate_provider("Dr Grey", "pw").is_ok());
        assert!(loaded.staff().authenticate("Dr Grey", "pw"));
        assert!(loaded.provider_patient("Dr Grey", &code).is_ok());
        assert!(loaded.appointment_for("Jane Doe").is_some());

        for name in [
            PATIENTS_FILENAME,
            PROVIDERS_FILENAME,
            CLINIC_FILENAME,
            STAFF_PROFILES_FILENAME,
        ] {
            assert!(temp_dir.path().join(name).is_file(), "{name} missing");
            assert!(!temp_dir.path().join(format!("{name}.tmp")).exists());
        }
    }

    #[test]
    fn seed_providers_only_apply_to_a_fresh_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let cfg = CoreConfig::from_env_values(
            Some(temp_dir.path().display().to_string()),
            None,
            None,
            Some("Front Desk:pw".into()),
        )
        .unwrap();

        let fresh = store.load_seeded(&cfg).unwrap();
        assert!(fresh.authenticate_provider("Front Desk", "pw").is_ok());

        let (registry, _) = populated_registry();
        store.save(&registry).unwrap();
        let existing = store.load_seeded(&cfg).unwrap();
        assert!(existing.provider("Front Desk").is_none());
    }

    #[test]
    fn corrupt_staff_file_is_treated_as_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(STAFF_PROFILES_FILENAME), ": : not yaml [").unwrap();

        let registry = DataStore::new(temp_dir.path()).load().unwrap();
        assert!(registry.staff().is_empty());
    }

    #[test]
    fn corrupt_patients_file_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(PATIENTS_FILENAME), "{not json").unwrap();

        let err = DataStore::new(temp_dir.path())
            .load()
            .expect_err("corrupt JSON should fail");
        assert!(matches!(err, MediLinkError::Deserialization(_)));
    }

    #[test]
    fn newest_snapshot_wins_and_bad_files_are_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let (registry, _) = populated_registry();
        let mut patient = registry.patient("Jane Doe").unwrap().clone();

        let dir = temp_dir.path().join(PATIENT_RECORDS_DIR_NAME).join("Jane Doe");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("2024-01-01_00-00-00.json"),
            serde_json::to_string(&patient).unwrap(),
        )
        .unwrap();
        patient.add_record(MedicalRecordEntry::now("Flu", vec![], vec![]));
        fs::write(
            dir.join("2024-06-01_00-00-00.json"),
            serde_json::to_string(&patient).unwrap(),
        )
        .unwrap();
        fs::write(dir.join("2099-01-01_00-00-00.json"), "garbage").unwrap();

        let snapshots = store.load_patient_snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].medical_records.len(), 2);
    }

    #[test]
    fn snapshots_recover_patients_missing_from_main_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let (registry, _) = populated_registry();

        let path = store
            .save_patient_snapshot(registry.patient("Jane Doe").unwrap())
            .expect("snapshot should be written");
        assert!(path.starts_with(temp_dir.path().join(PATIENT_RECORDS_DIR_NAME)));

        let loaded = store.load().unwrap();
        assert!(loaded.patient("Jane Doe").is_some());
    }

    #[test]
    fn deleted_patient_stays_deleted_after_reload() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let (mut registry, code) = populated_registry();

        store
            .save_patient_snapshot(registry.patient("Jane Doe").unwrap())
            .unwrap();
        let deleted = registry.delete_patient("Dr Grey", &code).unwrap();
        assert!(store
            .delete_patient_snapshots(deleted.name.as_str())
            .unwrap());
        store.save(&registry).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.patient("Jane Doe").is_none());
        assert!(loaded.patient_by_access_code(&code).is_none());
        assert!(!store.delete_patient_snapshots("Jane Doe").unwrap());
    }

    #[test]
    fn recovered_patients_are_reattached_to_a_provider() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DataStore::new(temp_dir.path());
        let (registry, code) = populated_registry();

        store
            .save_patient_snapshot(registry.patient("Jane Doe").unwrap())
            .unwrap();
        // Main files hold the provider but neither the patient nor the ownership entry.
        let mut without_patient = registry.clone();
        without_patient.delete_patient("Dr Grey", &code).unwrap();
        store.save(&without_patient).unwrap();

        let mut loaded = store.load().unwrap();
        assert!(loaded.provider("Dr Grey").unwrap().owns("Jane Doe"));
        loaded
            .add_record(
                "Dr Grey",
                &code,
                MedicalRecordEntry::now("Flu", vec![], vec![]),
            )
            .expect("provider should manage the recovered patient");
    }
}
