//! The in-memory registry of patients, providers and clinic resources.
//!
//! [`Registry`] is the single aggregate every surface (terminal menus, REST handlers, the
//! backup task) works against. It owns:
//!
//! - patients keyed by name, each carrying a registry-unique access code
//! - providers, each owning a list of patient names and an education catalog
//! - staff profiles
//! - the appointment book, inventory and bed occupancy
//!
//! ## Access model
//!
//! Reads and writes name the party acting through an [`Accessor`]:
//!
//! - [`Accessor::Patient`]: the access code itself is the credential, so any patient can reach
//!   their own record from the portal.
//! - [`Accessor::Provider`]: the provider must own the patient. A code that exists but belongs
//!   to another provider's patient is reported exactly like an unknown code
//!   ([`MediLinkError::AccessDenied`]).
//!
//! [`Registry::share_medical_record`] is the one deliberate exception: any registered provider
//! may read (never modify) any patient's history when presented with the access code.

use crate::access_code::{AccessCode, AccessCodeStyle};
use crate::appointments::AppointmentBook;
use crate::config::SeedProvider;
use crate::education::EducationCatalog;
use crate::facility::{BedOccupancy, Inventory};
use crate::patient::{NewPatient, Patient};
use crate::provider::HealthcareProvider;
use crate::record::MedicalRecordEntry;
use crate::reminders::AppointmentNotice;
use crate::staff::StaffDirectory;
use crate::validation::validate_path_component;
use crate::{MediLinkError, MediLinkResult};
use chrono::{DateTime, NaiveDate, Utc};
use medilink_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who is asking for a patient record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accessor<'a> {
    /// The patient, authenticated by the access code alone.
    Patient,
    /// A logged-in provider, identified by name.
    Provider(&'a str),
}

/// Appointments, inventory and bed occupancy, persisted together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicState {
    #[serde(default)]
    pub appointments: AppointmentBook,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub bed_occupancy: BedOccupancy,
}

/// A refill request handed to the pharmacy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefillRequest {
    pub patient_name: String,
    pub medication: NonEmptyText,
    pub quantity: u32,
    pub requested_at: DateTime<Utc>,
}

/// A message relayed between a patient and a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactMessage {
    pub patient_name: String,
    pub provider_contact: NonEmptyText,
    pub patient_contact: NonEmptyText,
    pub sent_at: DateTime<Utc>,
}

/// A patient's full history, by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatientReport<'a> {
    pub name: &'a str,
    pub entries: &'a [MedicalRecordEntry],
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    patients: BTreeMap<String, Patient>,
    providers: Vec<HealthcareProvider>,
    staff: StaffDirectory,
    clinic: ClinicState,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassembles a registry from persisted parts.
    ///
    /// Provider ownership lists that name patients no longer present are pruned.
    pub fn from_parts(
        patients: BTreeMap<String, Patient>,
        mut providers: Vec<HealthcareProvider>,
        staff: StaffDirectory,
        clinic: ClinicState,
    ) -> Self {
        for provider in &mut providers {
            provider
                .patients
                .retain(|name| patients.contains_key(name));
        }

        Self {
            patients,
            providers,
            staff,
            clinic,
        }
    }

    /// Attaches a patient no provider owns to the first provider.
    ///
    /// Returns `false` when the patient is unknown, already owned, or no provider exists.
    pub(crate) fn adopt_orphan(&mut self, patient_name: &str) -> bool {
        if !self.patients.contains_key(patient_name)
            || self.providers.iter().any(|p| p.owns(patient_name))
        {
            return false;
        }
        match self.providers.first_mut() {
            Some(provider) => {
                provider.add_patient(patient_name);
                tracing::info!("patient '{}' attached to {}", patient_name, provider.name);
                true
            }
            None => {
                tracing::warn!(
                    "no healthcare providers registered; patient '{}' has no provider",
                    patient_name
                );
                false
            }
        }
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    pub fn patient_map(&self) -> &BTreeMap<String, Patient> {
        &self.patients
    }

    pub fn patient(&self, name: &str) -> Option<&Patient> {
        self.patients.get(name.trim())
    }

    pub fn providers(&self) -> &[HealthcareProvider] {
        &self.providers
    }

    pub fn provider(&self, name: &str) -> Option<&HealthcareProvider> {
        self.providers.iter().find(|p| p.name.as_str() == name.trim())
    }

    pub fn staff(&self) -> &StaffDirectory {
        &self.staff
    }

    pub fn clinic(&self) -> &ClinicState {
        &self.clinic
    }

    /// A consistent copy of everything that gets persisted.
    pub fn snapshot(&self) -> Registry {
        self.clone()
    }

    // ------------------------------------------------------------------
    // Providers and staff
    // ------------------------------------------------------------------

    pub fn register_provider(
        &mut self,
        name: NonEmptyText,
        password: &NonEmptyText,
    ) -> MediLinkResult<&HealthcareProvider> {
        if self.provider(name.as_str()).is_some() {
            return Err(MediLinkError::DuplicateProvider(name.into_inner()));
        }

        tracing::info!("provider registered: {}", name);
        self.providers
            .push(HealthcareProvider::new(name, password.as_str()));
        Ok(&self.providers[self.providers.len() - 1])
    }

    /// Registers any configured seed providers that do not exist yet.
    ///
    /// Returns how many were added.
    pub fn seed_providers(&mut self, seeds: &[SeedProvider]) -> usize {
        let mut added = 0;
        for seed in seeds {
            if self.provider(seed.name.as_str()).is_none()
                && self
                    .register_provider(seed.name.clone(), &seed.password)
                    .is_ok()
            {
                added += 1;
            }
        }
        added
    }

    pub fn authenticate_provider(
        &self,
        name: &str,
        password: &str,
    ) -> MediLinkResult<&HealthcareProvider> {
        self.provider(name)
            .filter(|p| p.verify_password(password))
            .ok_or_else(|| {
                tracing::warn!("failed provider login for '{}'", name.trim());
                MediLinkError::InvalidCredentials
            })
    }

    /// Records a staff profile; staff log in as a provider of the same name, which is
    /// registered with the same credentials if it does not exist yet.
    pub fn create_staff_profile(
        &mut self,
        name: NonEmptyText,
        password: &NonEmptyText,
    ) -> MediLinkResult<()> {
        self.staff.create(name.clone(), password)?;
        if self.provider(name.as_str()).is_none() {
            self.register_provider(name, password)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Patient registration and lookup
    // ------------------------------------------------------------------

    /// Registers a patient under `provider_name`, issuing a numeric access code unless one was
    /// supplied.
    pub fn register_patient(
        &mut self,
        provider_name: &str,
        new_patient: NewPatient,
    ) -> MediLinkResult<&Patient> {
        let provider_idx = self.provider_index(provider_name)?;
        let name = self.insert_patient(new_patient, AccessCodeStyle::Numeric)?;
        self.providers[provider_idx].add_patient(&name);
        tracing::info!(
            "patient '{}' registered by {}",
            name,
            self.providers[provider_idx].name
        );
        self.existing_patient(&name)
    }

    /// Patient self-signup: issues an alphanumeric access code and attaches the patient to the
    /// first registered provider, if any.
    pub fn create_patient_account(&mut self, new_patient: NewPatient) -> MediLinkResult<&Patient> {
        let name = self.insert_patient(new_patient, AccessCodeStyle::Alphanumeric)?;
        match self.providers.first_mut() {
            Some(provider) => provider.add_patient(&name),
            None => tracing::warn!(
                "no healthcare providers registered; patient '{}' has no provider",
                name
            ),
        }
        self.existing_patient(&name)
    }

    fn insert_patient(
        &mut self,
        new_patient: NewPatient,
        style: AccessCodeStyle,
    ) -> MediLinkResult<String> {
        let name = new_patient.name.as_str().to_string();
        validate_path_component(&name)?;
        if self.patients.contains_key(&name) {
            return Err(MediLinkError::DuplicatePatient(name));
        }

        let access_code = match new_patient.access_code {
            Some(code) => {
                if self.access_code_in_use(&code) {
                    return Err(MediLinkError::DuplicateAccessCode);
                }
                code
            }
            None => AccessCode::generate_unique(style, &mut rand::thread_rng(), |candidate| {
                self.access_code_in_use(candidate)
            })?,
        };

        let mut patient = Patient::new(new_patient.name, access_code, new_patient.first_entry);
        if let Some(location) = new_patient.location.as_deref() {
            patient.update_location(location);
        }
        patient.email = new_patient.email;

        self.patients.insert(name.clone(), patient);
        Ok(name)
    }

    fn access_code_in_use(&self, code: &AccessCode) -> bool {
        self.patients.values().any(|p| &p.access_code == code)
    }

    fn existing_patient(&self, name: &str) -> MediLinkResult<&Patient> {
        self.patients
            .get(name)
            .ok_or_else(|| MediLinkError::PatientNotFound(name.to_string()))
    }

    fn provider_index(&self, name: &str) -> MediLinkResult<usize> {
        self.providers
            .iter()
            .position(|p| p.name.as_str() == name.trim())
            .ok_or_else(|| MediLinkError::ProviderNotFound(name.trim().to_string()))
    }

    /// System-wide lookup by access code (patient portal).
    pub fn patient_by_access_code(&self, code: &str) -> Option<&Patient> {
        let code = code.trim();
        self.patients
            .values()
            .find(|p| p.access_code.as_str() == code)
    }

    fn resolve_name(&self, accessor: Accessor<'_>, code: &str) -> MediLinkResult<String> {
        let patient = match accessor {
            Accessor::Patient => self.patient_by_access_code(code),
            Accessor::Provider(provider_name) => {
                let provider = &self.providers[self.provider_index(provider_name)?];
                self.patient_by_access_code(code)
                    .filter(|p| provider.owns(p.name.as_str()))
            }
        };

        patient
            .map(|p| p.name.as_str().to_string())
            .ok_or(MediLinkError::AccessDenied)
    }

    fn patient_mut(&mut self, accessor: Accessor<'_>, code: &str) -> MediLinkResult<&mut Patient> {
        let name = self.resolve_name(accessor, code)?;
        self.patients
            .get_mut(&name)
            .ok_or(MediLinkError::PatientNotFound(name))
    }

    /// Resolves a patient for `accessor`.
    pub fn access_patient(&self, accessor: Accessor<'_>, code: &str) -> MediLinkResult<&Patient> {
        let name = self.resolve_name(accessor, code)?;
        self.existing_patient(&name)
    }

    /// Provider-scoped lookup: only patients the provider owns are reachable.
    pub fn provider_patient(&self, provider_name: &str, code: &str) -> MediLinkResult<&Patient> {
        self.access_patient(Accessor::Provider(provider_name), code)
    }

    /// Read-only access for any registered provider to any patient's history.
    pub fn share_medical_record(
        &self,
        code: &str,
        provider_name: &str,
    ) -> MediLinkResult<&Patient> {
        self.provider_index(provider_name)
            .map_err(|_| MediLinkError::AccessDenied)?;
        let patient = self
            .patient_by_access_code(code)
            .ok_or(MediLinkError::AccessDenied)?;
        tracing::info!(
            "records for '{}' shared with {}",
            patient.name,
            provider_name.trim()
        );
        Ok(patient)
    }

    /// Case-insensitive name substring or exact access-code match.
    pub fn search_patients(&self, keyword: &str) -> Vec<&Patient> {
        let keyword = keyword.trim();
        let lowered = keyword.to_lowercase();
        self.patients
            .values()
            .filter(|p| {
                p.name.as_str().to_lowercase().contains(&lowered) || p.access_code.as_str() == keyword
            })
            .collect()
    }

    pub fn patient_report(&self, name: &str) -> MediLinkResult<PatientReport<'_>> {
        let patient = self
            .patient(name)
            .ok_or_else(|| MediLinkError::PatientNotFound(name.trim().to_string()))?;
        Ok(PatientReport {
            name: patient.name.as_str(),
            entries: &patient.medical_records,
        })
    }

    pub fn list_access_codes(&self, provider_name: &str) -> MediLinkResult<Vec<(&str, &AccessCode)>> {
        let provider = &self.providers[self.provider_index(provider_name)?];
        Ok(provider
            .patients
            .iter()
            .filter_map(|name| self.patients.get(name))
            .map(|p| (p.name.as_str(), &p.access_code))
            .collect())
    }

    /// Removes a patient everywhere: registry, every provider list, and the appointment book.
    pub fn delete_patient(&mut self, provider_name: &str, code: &str) -> MediLinkResult<Patient> {
        let name = self.resolve_name(Accessor::Provider(provider_name), code)?;
        let patient = self
            .patients
            .remove(&name)
            .ok_or_else(|| MediLinkError::PatientNotFound(name.clone()))?;
        for provider in &mut self.providers {
            provider.remove_patient(&name);
        }
        self.clinic.appointments.forget(&name);
        tracing::info!("patient '{}' deleted by {}", name, provider_name.trim());
        Ok(patient)
    }

    // ------------------------------------------------------------------
    // Medical records
    // ------------------------------------------------------------------

    pub fn add_record(
        &mut self,
        provider_name: &str,
        code: &str,
        entry: MedicalRecordEntry,
    ) -> MediLinkResult<()> {
        let patient = self.patient_mut(Accessor::Provider(provider_name), code)?;
        patient.add_record(entry);
        tracing::info!("record entry added for '{}'", patient.name);
        Ok(())
    }

    /// Replaces the entry at zero-based `index`.
    pub fn replace_record(
        &mut self,
        provider_name: &str,
        code: &str,
        index: usize,
        entry: MedicalRecordEntry,
    ) -> MediLinkResult<()> {
        let patient = self.patient_mut(Accessor::Provider(provider_name), code)?;
        patient.replace_record(index, entry)?;
        tracing::info!("record entry {} replaced for '{}'", index, patient.name);
        Ok(())
    }

    pub fn update_location(
        &mut self,
        provider_name: &str,
        code: &str,
        location: &str,
    ) -> MediLinkResult<()> {
        self.patient_mut(Accessor::Provider(provider_name), code)?
            .update_location(location);
        Ok(())
    }

    pub fn update_email(
        &mut self,
        accessor: Accessor<'_>,
        code: &str,
        email: Option<EmailAddress>,
    ) -> MediLinkResult<()> {
        self.patient_mut(accessor, code)?.email = email;
        Ok(())
    }

    pub fn add_medication_reminder(
        &mut self,
        accessor: Accessor<'_>,
        code: &str,
        medication: NonEmptyText,
        frequency: NonEmptyText,
    ) -> MediLinkResult<()> {
        self.patient_mut(accessor, code)?
            .add_medication_reminder(medication, frequency);
        Ok(())
    }

    /// Replaces the reminder at zero-based `index`.
    pub fn update_medication_reminder(
        &mut self,
        accessor: Accessor<'_>,
        code: &str,
        index: usize,
        medication: NonEmptyText,
        frequency: NonEmptyText,
    ) -> MediLinkResult<()> {
        self.patient_mut(accessor, code)?
            .update_medication_reminder(index, medication, frequency)
    }

    pub fn request_medication_refill(
        &self,
        accessor: Accessor<'_>,
        code: &str,
        medication: NonEmptyText,
        quantity: u32,
    ) -> MediLinkResult<RefillRequest> {
        if quantity == 0 {
            return Err(MediLinkError::InvalidInput(
                "refill quantity must be at least 1".into(),
            ));
        }

        let patient = self.access_patient(accessor, code)?;
        let request = RefillRequest {
            patient_name: patient.name.as_str().to_string(),
            medication,
            quantity,
            requested_at: Utc::now(),
        };
        tracing::info!(
            "refill requested for '{}': {} x{}",
            request.patient_name,
            request.medication,
            request.quantity
        );
        Ok(request)
    }

    pub fn contact_provider(
        &self,
        provider_name: &str,
        code: &str,
        provider_contact: NonEmptyText,
        patient_contact: NonEmptyText,
    ) -> MediLinkResult<ContactMessage> {
        let patient = self.access_patient(Accessor::Provider(provider_name), code)?;
        let message = ContactMessage {
            patient_name: patient.name.as_str().to_string(),
            provider_contact,
            patient_contact,
            sent_at: Utc::now(),
        };
        tracing::info!(
            "message relayed to {} about '{}'",
            message.provider_contact,
            message.patient_name
        );
        Ok(message)
    }

    // ------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------

    pub fn appointment_for(&self, patient_name: &str) -> Option<NaiveDate> {
        self.clinic.appointments.get(patient_name.trim())
    }

    pub fn schedule_appointment(
        &mut self,
        provider_name: &str,
        code: &str,
        date: NaiveDate,
    ) -> MediLinkResult<AppointmentNotice> {
        let name = self.resolve_name(Accessor::Provider(provider_name), code)?;
        self.clinic.appointments.schedule(&name, date);
        tracing::info!("appointment for '{}' scheduled on {}", name, date);
        self.notice_for(name, date)
    }

    pub fn reschedule_appointment(
        &mut self,
        provider_name: &str,
        code: &str,
        date: NaiveDate,
    ) -> MediLinkResult<AppointmentNotice> {
        let name = self.resolve_name(Accessor::Provider(provider_name), code)?;
        self.clinic.appointments.reschedule(&name, date)?;
        tracing::info!("appointment for '{}' moved to {}", name, date);
        self.notice_for(name, date)
    }

    pub fn cancel_appointment(
        &mut self,
        provider_name: &str,
        code: &str,
    ) -> MediLinkResult<NaiveDate> {
        let name = self.resolve_name(Accessor::Provider(provider_name), code)?;
        let date = self.clinic.appointments.cancel(&name)?;
        tracing::info!("appointment for '{}' on {} cancelled", name, date);
        Ok(date)
    }

    fn notice_for(&self, patient_name: String, date: NaiveDate) -> MediLinkResult<AppointmentNotice> {
        let email = self.existing_patient(&patient_name)?.email.clone();
        Ok(AppointmentNotice {
            patient_name,
            email,
            date,
        })
    }

    // ------------------------------------------------------------------
    // Clinic resources
    // ------------------------------------------------------------------

    pub fn set_inventory(&mut self, item: &str, quantity: u32) -> MediLinkResult<()> {
        self.clinic.inventory.set(item, quantity)
    }

    pub fn set_bed_occupancy(&mut self, ward: &str, occupied: u32) -> MediLinkResult<()> {
        self.clinic.bed_occupancy.set(ward, occupied)
    }

    // ------------------------------------------------------------------
    // Education resources
    // ------------------------------------------------------------------

    /// Adds (or overwrites) a resource in every provider's catalog.
    ///
    /// Catalogs belong to providers, so this fails when none is registered.
    pub fn add_education_resource(&mut self, condition: &str, url: &str) -> MediLinkResult<()> {
        let condition = NonEmptyText::new(condition)?;
        let url = NonEmptyText::new(url)?;
        if self.providers.is_empty() {
            return Err(MediLinkError::InvalidInput(
                "no healthcare providers registered to hold education resources".into(),
            ));
        }
        for provider in &mut self.providers {
            provider
                .education_resources
                .add(condition.as_str(), url.as_str());
        }
        Ok(())
    }

    /// The catalog shown to users: the first provider's, or the defaults when no provider
    /// is registered.
    pub fn education_resources(&self) -> EducationCatalog {
        self.providers
            .first()
            .map(|p| p.education_resources.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::parse_appointment_date;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    fn entry(condition: &str) -> MedicalRecordEntry {
        MedicalRecordEntry::now(condition, vec!["Ibuprofen".into()], vec!["Latex".into()])
    }

    fn new_patient(name: &str) -> NewPatient {
        NewPatient::new(text(name), entry("Initial"))
    }

    fn registry_with_providers() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_provider(text("City Hospital"), &text("city-pw"))
            .unwrap();
        registry
            .register_provider(text("General Clinic"), &text("clinic-pw"))
            .unwrap();
        registry
    }

    fn register(registry: &mut Registry, provider: &str, name: &str) -> String {
        registry
            .register_patient(provider, new_patient(name))
            .unwrap()
            .access_code
            .to_string()
    }

    #[test]
    fn register_patient_issues_numeric_code_and_assigns_provider() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        assert_eq!(code.len(), 10);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));
        assert!(registry.provider("City Hospital").unwrap().owns("Jane Doe"));
        assert!(!registry.provider("General Clinic").unwrap().owns("Jane Doe"));
    }

    #[test]
    fn duplicate_patient_name_and_code_are_rejected() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        let err = registry
            .register_patient("City Hospital", new_patient("Jane Doe"))
            .expect_err("duplicate name");
        assert!(matches!(err, MediLinkError::DuplicatePatient(_)));

        let mut other = new_patient("John Roe");
        other.access_code = Some(AccessCode::parse(&code).unwrap());
        let err = registry
            .register_patient("General Clinic", other)
            .expect_err("duplicate code");
        assert!(matches!(err, MediLinkError::DuplicateAccessCode));
    }

    #[test]
    fn register_patient_requires_known_provider() {
        let mut registry = Registry::new();
        let err = registry
            .register_patient("Nowhere", new_patient("Jane"))
            .expect_err("unknown provider");
        assert!(matches!(err, MediLinkError::ProviderNotFound(_)));
        assert!(registry.patient("Jane").is_none());
    }

    #[test]
    fn patient_names_must_be_safe_directory_names() {
        let mut registry = registry_with_providers();
        let err = registry
            .register_patient("City Hospital", new_patient("../etc"))
            .expect_err("path traversal");
        assert!(matches!(err, MediLinkError::InvalidInput(_)));
    }

    #[test]
    fn self_signup_uses_alphanumeric_code_and_first_provider() {
        let mut registry = registry_with_providers();
        let patient = registry
            .create_patient_account(new_patient("Sam Smith"))
            .unwrap();
        assert_eq!(patient.access_code.as_str().len(), 8);
        assert!(registry.provider("City Hospital").unwrap().owns("Sam Smith"));
    }

    #[test]
    fn self_signup_without_providers_still_stores_patient() {
        let mut registry = Registry::new();
        registry
            .create_patient_account(new_patient("Sam Smith"))
            .unwrap();
        assert!(registry.patient("Sam Smith").is_some());
    }

    #[test]
    fn provider_access_is_scoped_to_owned_patients() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        assert!(registry.provider_patient("City Hospital", &code).is_ok());
        assert!(matches!(
            registry.access_patient(Accessor::Provider("General Clinic"), &code),
            Err(MediLinkError::AccessDenied)
        ));
        assert!(matches!(
            registry.access_patient(Accessor::Provider("City Hospital"), "0000000000"),
            Err(MediLinkError::AccessDenied)
        ));
        assert!(registry.access_patient(Accessor::Patient, &code).is_ok());
    }

    #[test]
    fn share_allows_any_registered_provider_to_read() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        let shared = registry.share_medical_record(&code, "General Clinic").unwrap();
        assert_eq!(shared.name.as_str(), "Jane Doe");

        assert!(matches!(
            registry.share_medical_record(&code, "Unknown Clinic"),
            Err(MediLinkError::AccessDenied)
        ));
        assert!(matches!(
            registry.share_medical_record("nope", "General Clinic"),
            Err(MediLinkError::AccessDenied)
        ));
    }

    #[test]
    fn wrong_code_yields_denial_for_record_updates() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        let err = registry
            .add_record("General Clinic", &code, entry("Flu"))
            .expect_err("other provider");
        assert!(matches!(err, MediLinkError::AccessDenied));

        registry.add_record("City Hospital", &code, entry("Flu")).unwrap();
        assert_eq!(registry.patient("Jane Doe").unwrap().medical_records.len(), 2);
    }

    #[test]
    fn replace_record_is_range_checked() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        registry
            .replace_record("City Hospital", &code, 0, entry("Corrected"))
            .unwrap();
        assert_eq!(
            registry.patient("Jane Doe").unwrap().medical_records[0].condition,
            "Corrected"
        );

        assert!(matches!(
            registry.replace_record("City Hospital", &code, 5, entry("X")),
            Err(MediLinkError::RecordIndexOutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn delete_patient_removes_everywhere() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");
        registry
            .schedule_appointment(
                "City Hospital",
                &code,
                parse_appointment_date("2025-05-05").unwrap(),
            )
            .unwrap();

        let removed = registry.delete_patient("City Hospital", &code).unwrap();
        assert_eq!(removed.name.as_str(), "Jane Doe");
        assert!(registry.patient("Jane Doe").is_none());
        assert!(!registry.provider("City Hospital").unwrap().owns("Jane Doe"));
        assert_eq!(registry.appointment_for("Jane Doe"), None);
    }

    #[test]
    fn search_matches_name_substring_or_exact_code() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");
        register(&mut registry, "City Hospital", "John Roe");

        let by_name: Vec<_> = registry
            .search_patients("DOE")
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(by_name, vec!["Jane Doe"]);

        let by_code = registry.search_patients(&code);
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].name.as_str(), "Jane Doe");

        assert!(registry.search_patients("zzz").is_empty());
    }

    #[test]
    fn patient_report_lists_entries_by_name() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");
        registry.add_record("City Hospital", &code, entry("Flu")).unwrap();

        let report = registry.patient_report("Jane Doe").unwrap();
        assert_eq!(report.name, "Jane Doe");
        assert_eq!(report.entries.len(), 2);
        assert!(matches!(
            registry.patient_report("Nobody"),
            Err(MediLinkError::PatientNotFound(_))
        ));
    }

    #[test]
    fn list_access_codes_follows_registration_order() {
        let mut registry = registry_with_providers();
        let first = register(&mut registry, "City Hospital", "Zed");
        let second = register(&mut registry, "City Hospital", "Amy");

        let listed: Vec<_> = registry
            .list_access_codes("City Hospital")
            .unwrap()
            .into_iter()
            .map(|(name, code)| (name.to_string(), code.to_string()))
            .collect();
        assert_eq!(
            listed,
            vec![("Zed".to_string(), first), ("Amy".to_string(), second)]
        );
        assert!(registry.list_access_codes("General Clinic").unwrap().is_empty());
    }

    #[test]
    fn appointments_produce_notices_with_email() {
        let mut registry = registry_with_providers();
        let mut patient = new_patient("Jane Doe");
        patient.email = Some(EmailAddress::parse("jane@example.org").unwrap());
        let code = registry
            .register_patient("City Hospital", patient)
            .unwrap()
            .access_code
            .to_string();

        let date = parse_appointment_date("2025-06-01").unwrap();
        let notice = registry
            .schedule_appointment("City Hospital", &code, date)
            .unwrap();
        assert_eq!(notice.email.unwrap().as_str(), "jane@example.org");
        assert_eq!(registry.appointment_for("Jane Doe"), Some(date));

        let moved = parse_appointment_date("2025-06-08").unwrap();
        registry
            .reschedule_appointment("City Hospital", &code, moved)
            .unwrap();
        assert_eq!(
            registry.cancel_appointment("City Hospital", &code).unwrap(),
            moved
        );
        assert!(matches!(
            registry.cancel_appointment("City Hospital", &code),
            Err(MediLinkError::NoAppointment(_))
        ));
    }

    #[test]
    fn patients_manage_their_own_reminders() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        registry
            .add_medication_reminder(Accessor::Patient, &code, text("Insulin"), text("daily"))
            .unwrap();
        registry
            .update_medication_reminder(
                Accessor::Provider("City Hospital"),
                &code,
                0,
                text("Insulin"),
                text("twice daily"),
            )
            .unwrap();

        let reminders = &registry.patient("Jane Doe").unwrap().medication_reminders;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].frequency.as_str(), "twice daily");
    }

    #[test]
    fn refill_requests_require_positive_quantity() {
        let mut registry = registry_with_providers();
        let code = register(&mut registry, "City Hospital", "Jane Doe");

        let request = registry
            .request_medication_refill(Accessor::Patient, &code, text("Insulin"), 3)
            .unwrap();
        assert_eq!(request.patient_name, "Jane Doe");
        assert_eq!(request.quantity, 3);

        assert!(matches!(
            registry.request_medication_refill(Accessor::Patient, &code, text("Insulin"), 0),
            Err(MediLinkError::InvalidInput(_))
        ));
    }

    #[test]
    fn staff_profile_creates_matching_provider_login() {
        let mut registry = Registry::new();
        registry
            .create_staff_profile(text("Dr Grey"), &text("pw"))
            .unwrap();

        assert!(registry.staff().authenticate("Dr Grey", "pw"));
        assert!(registry.authenticate_provider("Dr Grey", "pw").is_ok());
        assert!(matches!(
            registry.authenticate_provider("Dr Grey", "wrong"),
            Err(MediLinkError::InvalidCredentials)
        ));
    }

    #[test]
    fn education_resources_are_added_to_every_provider() {
        let mut registry = registry_with_providers();
        registry
            .add_education_resource("Migraine", "https://example.org/migraine")
            .unwrap();
        for provider in registry.providers() {
            assert_eq!(
                provider.education_resources.get("Migraine"),
                Some("https://example.org/migraine")
            );
        }
        assert_eq!(Registry::new().education_resources().len(), 20);
    }

    #[test]
    fn education_resource_without_providers_is_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .add_education_resource("Migraine", "https://example.org/migraine")
            .unwrap_err();
        assert!(matches!(err, MediLinkError::InvalidInput(_)));
        assert_eq!(registry.education_resources().get("Migraine"), None);
    }

    #[test]
    fn seed_providers_skip_existing_names() {
        let mut registry = registry_with_providers();
        let seeds = vec![
            SeedProvider {
                name: text("City Hospital"),
                password: text("other"),
            },
            SeedProvider {
                name: text("Night Clinic"),
                password: text("pw"),
            },
        ];
        assert_eq!(registry.seed_providers(&seeds), 1);
        assert!(registry.authenticate_provider("City Hospital", "city-pw").is_ok());
        assert!(registry.authenticate_provider("Night Clinic", "pw").is_ok());
    }

    #[test]
    fn from_parts_prunes_dangling_ownership() {
        let mut registry = registry_with_providers();
        register(&mut registry, "City Hospital", "Jane Doe");
        let mut providers = registry.providers().to_vec();
        providers[0].patients.push("Ghost".into());

        let rebuilt = Registry::from_parts(
            registry.patient_map().clone(),
            providers,
            StaffDirectory::default(),
            ClinicState::default(),
        );
        assert_eq!(rebuilt.provider("City Hospital").unwrap().patients, vec!["Jane Doe"]);
    }
}
