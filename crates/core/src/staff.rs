//! Hospital staff profiles.

use crate::credentials::PasswordHash;
use crate::{MediLinkError, MediLinkResult};
use chrono::{DateTime, Utc};
use medilink_types::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub name: NonEmptyText,
    password: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// All staff profiles, unique by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffDirectory {
    profiles: Vec<StaffProfile>,
}

impl StaffDirectory {
    pub fn create(&mut self, name: NonEmptyText, password: &NonEmptyText) -> MediLinkResult<()> {
        if self.profiles.iter().any(|p| p.name == name) {
            return Err(MediLinkError::DuplicateStaffProfile(name.into_inner()));
        }

        tracing::info!("staff profile created: {}", name);
        self.profiles.push(StaffProfile {
            name,
            password: PasswordHash::new(password.as_str()),
            created_at: Utc::now(),
        });
        Ok(())
    }

    pub fn authenticate(&self, name: &str, password: &str) -> bool {
        self.profiles
            .iter()
            .any(|p| p.name.as_str() == name.trim() && p.password.verify(password))
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
