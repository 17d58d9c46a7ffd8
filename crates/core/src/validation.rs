//! Input validation utilities.
//!
//! This module contains functions for validating user inputs to ensure they meet
//! safety and correctness requirements before being used in operations.

use crate::{MediLinkError, MediLinkResult};

/// Validates that a patient name is safe to use as a single directory name.
///
/// Per-patient snapshots are written to `patient_records/<name>/`, so the name must not be able
/// to escape that directory:
/// - Rejects `.` and `..`
/// - Rejects path separators and NUL
/// - Bounds the length to avoid pathological inputs
///
/// # Errors
///
/// Returns a `MediLinkError::InvalidInput` if the name is unsafe.
pub fn validate_path_component(name: &str) -> MediLinkResult<()> {
    const MAX_COMPONENT_LEN: usize = 255;

    if name.trim().is_empty() {
        return Err(MediLinkError::InvalidInput("name cannot be empty".into()));
    }

    if name.len() > MAX_COMPONENT_LEN {
        return Err(MediLinkError::InvalidInput(format!(
            "name exceeds maximum length of {} bytes",
            MAX_COMPONENT_LEN
        )));
    }

    if name == "." || name == ".." {
        return Err(MediLinkError::InvalidInput(
            "name cannot be a relative path component".into(),
        ));
    }

    if name.chars().any(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(MediLinkError::InvalidInput(
            "name cannot contain path separators".into(),
        ));
    }

    Ok(())
}

/// Validates the character set of an access code.
///
/// # Errors
///
/// Returns a `MediLinkError::InvalidInput` if the code is blank or contains anything other
/// than ASCII letters and digits.
pub fn validate_access_code(code: &str) -> MediLinkResult<()> {
    if code.is_empty() {
        return Err(MediLinkError::InvalidInput(
            "access code cannot be empty".into(),
        ));
    }

    if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(MediLinkError::InvalidInput(
            "access code must contain only letters and digits".into(),
        ));
    }

    Ok(())
}
