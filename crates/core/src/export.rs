//! CSV export of every patient's medical history.

use crate::constants::EXPORT_CSV_FILENAME;
use crate::patient::Patient;
use crate::{MediLinkError, MediLinkResult};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One CSV row per medical-record entry.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Access Code")]
    access_code: &'a str,
    #[serde(rename = "Condition")]
    condition: &'a str,
    #[serde(rename = "Medications")]
    medications: String,
    #[serde(rename = "Allergies")]
    allergies: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

/// Writes the export to `writer`, returning the number of data rows.
pub fn export_patients_csv<'a, W: Write>(
    patients: impl IntoIterator<Item = &'a Patient>,
    writer: W,
) -> MediLinkResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for patient in patients {
        for entry in &patient.medical_records {
            wtr.serialize(ExportRow {
                name: patient.name.as_str(),
                access_code: patient.access_code.as_str(),
                condition: &entry.condition,
                medications: entry.medications.join(", "),
                allergies: entry.allergies.join(", "),
                timestamp: entry.formatted_timestamp(),
            })?;
            rows += 1;
        }
    }

    if rows == 0 {
        wtr.write_record([
            "Name",
            "Access Code",
            "Condition",
            "Medications",
            "Allergies",
            "Timestamp",
        ])?;
    }

    wtr.flush().map_err(MediLinkError::FileWrite)?;
    Ok(rows)
}

/// Writes `patient_data.csv` into `data_dir` and returns its path.
pub fn export_to_path<'a>(
    patients: impl IntoIterator<Item = &'a Patient>,
    data_dir: &Path,
) -> MediLinkResult<PathBuf> {
    std::fs::create_dir_all(data_dir).map_err(MediLinkError::DataDirCreation)?;
    let path = data_dir.join(EXPORT_CSV_FILENAME);
    export_file(patients, &path)?;
    Ok(path)
}

/// Writes the export to an explicit file path.
pub fn export_file<'a>(
    patients: impl IntoIterator<Item = &'a Patient>,
    path: &Path,
) -> MediLinkResult<usize> {
    let file = std::fs::File::create(path).map_err(MediLinkError::FileWrite)?;
    let rows = export_patients_csv(patients, file)?;
    tracing::info!("exported {} record entries to {}", rows, path.display());
    Ok(rows)
}
