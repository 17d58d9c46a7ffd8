//! Healthcare providers.

use crate::credentials::PasswordHash;
use crate::education::EducationCatalog;
use medilink_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// A named, password-protected owner of a subset of patients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcareProvider {
    pub name: NonEmptyText,
    password: PasswordHash,
    /// Names of owned patients, in registration order.
    #[serde(default)]
    pub patients: Vec<String>,
    #[serde(default)]
    pub education_resources: EducationCatalog,
}

impl HealthcareProvider {
    pub fn new(name: NonEmptyText, password: &str) -> Self {
        Self {
            name,
            password: PasswordHash::new(password),
            patients: Vec::new(),
            education_resources: EducationCatalog::default(),
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password.verify(password)
    }

    pub fn owns(&self, patient_name: &str) -> bool {
        self.patients.iter().any(|p| p == patient_name)
    }

    pub(crate) fn add_patient(&mut self, patient_name: &str) {
        if !self.owns(patient_name) {
            self.patients.push(patient_name.to_string());
        }
    }

    pub(crate) fn remove_patient(&mut self, patient_name: &str) {
        self.patients.retain(|p| p != patient_name);
    }
}
