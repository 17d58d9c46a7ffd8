//! Appointment book: at most one upcoming appointment per patient.

use crate::constants::APPOINTMENT_DATE_FORMAT;
use crate::{MediLinkError, MediLinkResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parses a `YYYY-MM-DD` appointment date.
pub fn parse_appointment_date(input: &str) -> MediLinkResult<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, APPOINTMENT_DATE_FORMAT)
        .map_err(|_| MediLinkError::InvalidDate(trimmed.to_string()))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentBook {
    by_patient: BTreeMap<String, NaiveDate>,
}

impl AppointmentBook {
    /// Books `date`, replacing any existing appointment.
    pub fn schedule(&mut self, patient_name: &str, date: NaiveDate) {
        self.by_patient.insert(patient_name.to_string(), date);
    }

    /// Moves an existing appointment.
    pub fn reschedule(&mut self, patient_name: &str, date: NaiveDate) -> MediLinkResult<()> {
        let slot = self
            .by_patient
            .get_mut(patient_name)
            .ok_or_else(|| MediLinkError::NoAppointment(patient_name.to_string()))?;
        *slot = date;
        Ok(())
    }

    pub fn cancel(&mut self, patient_name: &str) -> MediLinkResult<NaiveDate> {
        self.by_patient
            .remove(patient_name)
            .ok_or_else(|| MediLinkError::NoAppointment(patient_name.to_string()))
    }

    pub fn get(&self, patient_name: &str) -> Option<NaiveDate> {
        self.by_patient.get(patient_name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.by_patient.iter().map(|(name, date)| (name.as_str(), *date))
    }

    pub(crate) fn forget(&mut self, patient_name: &str) {
        self.by_patient.remove(patient_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_appointment_date(s).unwrap()
    }

    #[test]
    fn schedule_reschedule_cancel() {
        let mut book = AppointmentBook::default();
        book.schedule("Jane", date("2025-01-10"));
        assert_eq!(book.get("Jane"), Some(date("2025-01-10")));

        book.reschedule("Jane", date("2025-02-01")).unwrap();
        assert_eq!(book.get("Jane"), Some(date("2025-02-01")));

        assert_eq!(book.cancel("Jane").unwrap(), date("2025-02-01"));
        assert_eq!(book.get("Jane"), None);
    }

    #[test]
    fn missing_appointments_are_errors() {
        let mut book = AppointmentBook::default();
        assert!(matches!(
            book.cancel("Nobody"),
            Err(MediLinkError::NoAppointment(_))
        ));
        assert!(matches!(
            book.reschedule("Nobody", date("2025-01-01")),
            Err(MediLinkError::NoAppointment(_))
        ));
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(matches!(
            parse_appointment_date("01/02/2025"),
            Err(MediLinkError::InvalidDate(_))
        ));
        assert!(parse_appointment_date(" 2025-12-31 ").is_ok());
    }
}
