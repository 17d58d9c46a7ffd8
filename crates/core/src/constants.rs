//! Constants used throughout the MediLink core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for persisted data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "medilink_data";

/// Filename for the patient map.
pub const PATIENTS_FILENAME: &str = "patients.json";

/// Filename for the provider list.
pub const PROVIDERS_FILENAME: &str = "providers.json";

/// Filename for appointments, inventory and bed occupancy.
pub const CLINIC_FILENAME: &str = "clinic.json";

/// Filename for staff profiles.
pub const STAFF_PROFILES_FILENAME: &str = "staff_profiles.yaml";

/// Directory name for per-patient record snapshots.
pub const PATIENT_RECORDS_DIR_NAME: &str = "patient_records";

/// Directory name for queued reminder messages.
pub const OUTBOX_DIR_NAME: &str = "outbox";

/// Filename for the CSV export.
pub const EXPORT_CSV_FILENAME: &str = "patient_data.csv";

/// Default period between background saves.
pub const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 300;

/// Default sender address for appointment reminders.
pub const DEFAULT_REMINDER_FROM: &str = "no-reply@healthlink.com";

/// Timestamp format for user-entered record timestamps and the CSV export.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used in snapshot filenames.
pub const SNAPSHOT_FILENAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Appointment date format.
pub const APPOINTMENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of access codes issued on patient self-signup.
pub const ALPHANUMERIC_ACCESS_CODE_LEN: usize = 8;

/// Length of access codes issued by hospital staff.
pub const NUMERIC_ACCESS_CODE_LEN: usize = 10;

/// Upper bound on access code generation attempts before giving up.
pub const ACCESS_CODE_MAX_ATTEMPTS: usize = 5;

/// Condition → URL pairs every provider's education catalog starts with.
pub const DEFAULT_EDUCATION_RESOURCES: &[(&str, &str)] = &[
    ("Diabetes", "https://www.diabetes.org/diabetes"),
    (
        "Hypertension",
        "https://www.heart.org/en/health-topics/high-blood-pressure",
    ),
    (
        "Asthma",
        "https://www.lung.org/lung-health-diseases/lung-disease-lookup/asthma",
    ),
    ("Obesity", "https://www.cdc.gov/obesity/index.html"),
    (
        "Heart Disease",
        "https://www.nhlbi.nih.gov/health-topics/heart-disease",
    ),
    ("Arthritis", "https://www.arthritis.org/health-wellness"),
    (
        "Depression",
        "https://www.nimh.nih.gov/health/topics/depression",
    ),
    (
        "Anxiety Disorders",
        "https://adaa.org/understanding-anxiety",
    ),
    (
        "Alzheimer's Disease",
        "https://www.alz.org/alzheimers-dementia/what-is-alzheimers",
    ),
    (
        "Osteoporosis",
        "https://www.bones.nih.gov/health-info/bone/osteoporosis/overview",
    ),
    (
        "Chronic Kidney Disease",
        "https://www.kidney.org/atoz/content/about-chronic-kidney-disease",
    ),
    (
        "COPD",
        "https://www.copdfoundation.org/What-is-COPD/Understanding-COPD/What-is-COPD.aspx",
    ),
    ("Hepatitis", "https://www.cdc.gov/hepatitis/index.htm"),
    ("HIV/AIDS", "https://www.hiv.gov/hiv-basics"),
    (
        "Parkinson's Disease",
        "https://www.parkinson.org/understanding-parkinsons",
    ),
    (
        "Multiple Sclerosis",
        "https://www.nationalmssociety.org/What-is-MS",
    ),
    (
        "Celiac Disease",
        "https://celiac.org/about-celiac-disease/what-is-celiac-disease/",
    ),
    ("Fibromyalgia", "https://www.fmcpaware.org/aboutfibromyalgia"),
    ("Lupus", "https://www.lupus.org/resources/what-is-lupus"),
    (
        "Epilepsy",
        "https://www.epilepsy.com/learn/about-epilepsy-basics",
    ),
];
