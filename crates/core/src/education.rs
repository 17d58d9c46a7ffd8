//! Health education resource catalog.

use crate::constants::DEFAULT_EDUCATION_RESOURCES;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationResource {
    pub condition: String,
    pub url: String,
}

/// Condition → URL lookup, kept in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EducationCatalog {
    resources: Vec<EducationResource>,
}

impl Default for EducationCatalog {
    fn default() -> Self {
        Self {
            resources: DEFAULT_EDUCATION_RESOURCES
                .iter()
                .map(|(condition, url)| EducationResource {
                    condition: (*condition).to_string(),
                    url: (*url).to_string(),
                })
                .collect(),
        }
    }
}

impl EducationCatalog {
    pub fn empty() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Inserts a resource, replacing the URL when the condition is already listed.
    pub fn add(&mut self, condition: &str, url: &str) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.condition == condition)
        {
            Some(existing) => existing.url = url.to_string(),
            None => self.resources.push(EducationResource {
                condition: condition.to_string(),
                url: url.to_string(),
            }),
        }
    }

    pub fn get(&self, condition: &str) -> Option<&str> {
        self.resources
            .iter()
            .find(|r| r.condition == condition)
            .map(|r| r.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EducationResource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Case-insensitive substring search on condition names.
    pub fn search(&self, term: &str) -> Vec<&EducationResource> {
        let term = term.trim().to_lowercase();
        self.resources
            .iter()
            .filter(|r| r.condition.to_lowercase().contains(&term))
            .collect()
    }
}
