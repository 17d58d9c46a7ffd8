//! Patient access codes.
//!
//! An access code is the key a patient (or a provider acting for them) presents to reach a
//! record. Codes are unique within a registry; [`AccessCode::generate_unique`] retries a
//! bounded number of times when it draws a code that is already taken.

use crate::constants::{
    ACCESS_CODE_MAX_ATTEMPTS, ALPHANUMERIC_ACCESS_CODE_LEN, NUMERIC_ACCESS_CODE_LEN,
};
use crate::validation::validate_access_code;
use crate::{MediLinkError, MediLinkResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ALPHANUMERIC_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NUMERIC_CHARSET: &[u8] = b"0123456789";

/// Shape of a generated access code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessCodeStyle {
    /// Eight characters from `A-Z0-9`, issued on patient self-signup.
    Alphanumeric,
    /// Ten digits, issued when staff register a patient.
    Numeric,
}

impl AccessCodeStyle {
    fn charset(self) -> &'static [u8] {
        match self {
            Self::Alphanumeric => ALPHANUMERIC_CHARSET,
            Self::Numeric => NUMERIC_CHARSET,
        }
    }

    fn len(self) -> usize {
        match self {
            Self::Alphanumeric => ALPHANUMERIC_ACCESS_CODE_LEN,
            Self::Numeric => NUMERIC_ACCESS_CODE_LEN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessCode(String);

impl AccessCode {
    /// Validates a caller-supplied code. Surrounding whitespace is trimmed.
    pub fn parse(input: impl AsRef<str>) -> MediLinkResult<Self> {
        let trimmed = input.as_ref().trim();
        validate_access_code(trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Draws a random code of the given style.
    pub fn generate<R: Rng>(style: AccessCodeStyle, rng: &mut R) -> Self {
        let charset = style.charset();
        let code = (0..style.len())
            .map(|_| charset[rng.gen_range(0..charset.len())] as char)
            .collect();
        Self(code)
    }

    /// Draws codes until `is_taken` reports a free one.
    ///
    /// # Errors
    ///
    /// Returns [`MediLinkError::AccessCodeExhausted`] after
    /// [`ACCESS_CODE_MAX_ATTEMPTS`] collisions.
    pub fn generate_unique<R: Rng>(
        style: AccessCodeStyle,
        rng: &mut R,
        mut is_taken: impl FnMut(&AccessCode) -> bool,
    ) -> MediLinkResult<Self> {
        for _attempt in 0..ACCESS_CODE_MAX_ATTEMPTS {
            let candidate = Self::generate(style, rng);
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
        }
        Err(MediLinkError::AccessCodeExhausted(ACCESS_CODE_MAX_ATTEMPTS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccessCode {
    type Error = MediLinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AccessCode> for String {
    fn from(code: AccessCode) -> Self {
        code.0
    }
}
