//! Clinic resources: stock levels and ward occupancy.

use crate::MediLinkResult;
use medilink_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named counters, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountTable {
    counts: BTreeMap<String, u32>,
}

impl CountTable {
    /// Sets the count for `key`, overwriting any previous value.
    pub fn set(&mut self, key: &str, count: u32) -> MediLinkResult<()> {
        let key = NonEmptyText::new(key)?;
        self.counts.insert(key.into_inner(), count);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.counts.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Item name → quantity on hand.
pub type Inventory = CountTable;

/// Ward name → occupied beds.
pub type BedOccupancy = CountTable;
