//! Patients and their medication reminders.

use crate::access_code::AccessCode;
use crate::record::MedicalRecordEntry;
use crate::{MediLinkError, MediLinkResult};
use medilink_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};

/// A recurring reminder to take a medication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationReminder {
    pub medication: NonEmptyText,
    pub frequency: NonEmptyText,
}

/// A patient and their medical-record history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub name: NonEmptyText,
    pub access_code: AccessCode,
    pub medical_records: Vec<MedicalRecordEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
    #[serde(default)]
    pub medication_reminders: Vec<MedicationReminder>,
}

/// Everything needed to register a patient apart from the access code.
#[derive(Clone, Debug)]
pub struct NewPatient {
    pub name: NonEmptyText,
    pub first_entry: MedicalRecordEntry,
    pub location: Option<String>,
    pub email: Option<EmailAddress>,
    /// Caller-chosen access code; one is generated when absent.
    pub access_code: Option<AccessCode>,
}

impl NewPatient {
    pub fn new(name: NonEmptyText, first_entry: MedicalRecordEntry) -> Self {
        Self {
            name,
            first_entry,
            location: None,
            email: None,
            access_code: None,
        }
    }
}

impl Patient {
    /// A patient always starts with one record entry.
    pub fn new(name: NonEmptyText, access_code: AccessCode, first_entry: MedicalRecordEntry) -> Self {
        Self {
            name,
            access_code,
            medical_records: vec![first_entry],
            location: None,
            email: None,
            medication_reminders: Vec::new(),
        }
    }

    pub fn add_record(&mut self, entry: MedicalRecordEntry) {
        self.medical_records.push(entry);
    }

    /// Replaces the entry at zero-based `index`.
    pub fn replace_record(&mut self, index: usize, entry: MedicalRecordEntry) -> MediLinkResult<()> {
        let len = self.medical_records.len();
        let slot = self
            .medical_records
            .get_mut(index)
            .ok_or(MediLinkError::RecordIndexOutOfRange { index, len })?;
        *slot = entry;
        Ok(())
    }

    /// Sets the location; a blank value clears it.
    pub fn update_location(&mut self, location: &str) {
        let location = location.trim();
        self.location = (!location.is_empty()).then(|| location.to_string());
    }

    pub fn add_medication_reminder(&mut self, medication: NonEmptyText, frequency: NonEmptyText) {
        self.medication_reminders.push(MedicationReminder {
            medication,
            frequency,
        });
    }

    /// Replaces the reminder at zero-based `index`.
    pub fn update_medication_reminder(
        &mut self,
        index: usize,
        medication: NonEmptyText,
        frequency: NonEmptyText,
    ) -> MediLinkResult<()> {
        let len = self.medication_reminders.len();
        let slot = self
            .medication_reminders
            .get_mut(index)
            .ok_or(MediLinkError::ReminderIndexOutOfRange { index, len })?;
        *slot = MedicationReminder {
            medication,
            frequency,
        };
        Ok(())
    }
}
