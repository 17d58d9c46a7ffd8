//! Thread-safe handle to the registry.
//!
//! The terminal menus, REST handlers and the backup task all hold a clone of the same
//! [`SharedRegistry`]. Access goes through short closures so a lock is never held across an
//! `.await` or a blocking prompt.

use crate::patient::Patient;
use crate::registry::Registry;
use crate::{MediLinkError, MediLinkResult};
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Runs `f` with shared access.
    pub fn read<T>(&self, f: impl FnOnce(&Registry) -> T) -> MediLinkResult<T> {
        let guard = self.inner.read().map_err(|_| MediLinkError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Runs `f` with exclusive access.
    pub fn write<T>(&self, f: impl FnOnce(&mut Registry) -> T) -> MediLinkResult<T> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| MediLinkError::LockPoisoned)?;
        Ok(f(&mut guard))
    }

    /// [`read`](Self::read) for closures that can fail.
    pub fn try_read<T>(
        &self,
        f: impl FnOnce(&Registry) -> MediLinkResult<T>,
    ) -> MediLinkResult<T> {
        self.read(f)?
    }

    /// [`write`](Self::write) for closures that can fail.
    pub fn try_write<T>(
        &self,
        f: impl FnOnce(&mut Registry) -> MediLinkResult<T>,
    ) -> MediLinkResult<T> {
        self.write(f)?
    }

    /// Copies the registry under the read lock.
    pub fn snapshot(&self) -> MediLinkResult<Registry> {
        self.read(Registry::snapshot)
    }

    /// Copies every patient under the read lock, for writers such as the CSV export.
    pub fn patients(&self) -> MediLinkResult<Vec<Patient>> {
        self.read(|r| r.patients().cloned().collect())
    }
}
