//! Request and response bodies for the REST API.

use medilink_core::education::EducationResource;
use medilink_core::{MedicalRecordEntry, MedicationReminder, Patient};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Name substring or exact access code; omitted lists every patient the caller owns.
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientSummary {
    pub name: String,
    pub access_code: String,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name.as_str().to_string(),
            access_code: patient.access_code.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub name: String,
    pub condition: String,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Chosen access code; one is generated when omitted.
    #[serde(default)]
    pub access_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub name: String,
    pub access_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordEntryDto {
    pub condition: String,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&MedicalRecordEntry> for RecordEntryDto {
    fn from(entry: &MedicalRecordEntry) -> Self {
        Self {
            condition: entry.condition.clone(),
            medications: entry.medications.clone(),
            allergies: entry.allergies.clone(),
            timestamp: entry.formatted_timestamp(),
            url: entry.url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReminderDto {
    pub medication: String,
    pub frequency: String,
}

impl From<&MedicationReminder> for ReminderDto {
    fn from(reminder: &MedicationReminder) -> Self {
        Self {
            medication: reminder.medication.as_str().to_string(),
            frequency: reminder.frequency.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRecordsRes {
    pub name: String,
    pub access_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub records: Vec<RecordEntryDto>,
    pub medication_reminders: Vec<ReminderDto>,
}

impl From<&Patient> for PatientRecordsRes {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name.as_str().to_string(),
            access_code: patient.access_code.to_string(),
            location: patient.location.clone(),
            records: patient.medical_records.iter().map(Into::into).collect(),
            medication_reminders: patient
                .medication_reminders
                .iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddRecordReq {
    pub condition: String,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    /// `YYYY-MM-DD HH:MM:SS`; the current time when omitted.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddRecordRes {
    pub entries: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EducationResourceDto {
    pub condition: String,
    pub url: String,
}

impl From<&EducationResource> for EducationResourceDto {
    fn from(resource: &EducationResource) -> Self {
        Self {
            condition: resource.condition.clone(),
            url: resource.url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EducationRes {
    pub resources: Vec<EducationResourceDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffReq {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffRes {
    pub name: String,
}
