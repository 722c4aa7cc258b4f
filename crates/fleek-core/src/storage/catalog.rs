//! Catalog of saved timer definitions.

use tracing::warn;

use super::{keys, read_list, write_list, SharedStore};
use crate::error::{CoreError, Result, StorageError};
use crate::timer::TimerDefinition;

/// CRUD over the saved [`TimerDefinition`]s under [`keys::TIMERS`].
///
/// Listing reads that fail are treated as an empty catalog. Writes surface
/// [`CoreError::TimerNotSaved`] and never replace a catalog that cannot be
/// decoded.
#[derive(Clone)]
pub struct TimerCatalog {
    store: SharedStore,
}

impl TimerCatalog {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<TimerDefinition> {
        match read_list(self.store.as_ref(), keys::TIMERS) {
            Ok(timers) => timers,
            Err(e) => {
                warn!(error = %e, "failed to read timer catalog");
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<TimerDefinition> {
        self.list().into_iter().find(|t| t.id == id)
    }

    pub fn favorites(&self) -> Vec<TimerDefinition> {
        self.list().into_iter().filter(|t| t.is_favorite).collect()
    }

    /// Append `timer`, replacing a saved entry with the same id.
    ///
    /// # Errors
    /// Returns [`CoreError::TimerNotSaved`] if the catalog cannot be written.
    pub fn save(&self, timer: &TimerDefinition) -> Result<()> {
        let mut timers = self.load(&timer.id)?;
        timers.retain(|t| t.id != timer.id);
        timers.push(timer.clone());
        self.write(&timer.id, &timers)
    }

    /// Replace the saved entry with the same id. Unknown ids are ignored.
    ///
    /// # Errors
    /// Returns [`CoreError::TimerNotSaved`] if the catalog cannot be written.
    pub fn update(&self, timer: &TimerDefinition) -> Result<()> {
        self.modify(&timer.id, |t| *t = timer.clone()).map(|_| ())
    }

    /// Flip the favorite flag. Returns the new value, or `None` for an
    /// unknown id.
    ///
    /// # Errors
    /// Returns [`CoreError::TimerNotSaved`] if the catalog cannot be written.
    pub fn toggle_favorite(&self, id: &str) -> Result<Option<bool>> {
        self.modify(id, |t| t.is_favorite = !t.is_favorite)
            .map(|updated| updated.map(|t| t.is_favorite))
    }

    /// # Errors
    /// Returns [`CoreError::TimerNotSaved`] if the catalog cannot be written.
    pub fn update_description(
        &self,
        id: &str,
        description: &str,
    ) -> Result<Option<TimerDefinition>> {
        self.modify(id, |t| t.description = description.to_string())
    }

    /// Delete the entry for `id`. Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns [`CoreError::TimerNotSaved`] if the catalog cannot be written.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut timers = self.load(id)?;
        let before = timers.len();
        timers.retain(|t| t.id != id);
        if timers.len() == before {
            return Ok(false);
        }
        self.write(id, &timers)?;
        Ok(true)
    }

    /// Remove every saved timer.
    ///
    /// # Errors
    /// Returns an error if the store rejects the removal.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(keys::TIMERS)?;
        Ok(())
    }

    fn modify(
        &self,
        id: &str,
        change: impl FnOnce(&mut TimerDefinition),
    ) -> Result<Option<TimerDefinition>> {
        let mut timers = self.load(id)?;
        let Some(timer) = timers.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        change(timer);
        let updated = timer.clone();
        self.write(id, &timers)?;
        Ok(Some(updated))
    }

    /// The stored catalog for a read-modify-write.
    fn load(&self, id: &str) -> Result<Vec<TimerDefinition>> {
        read_list(self.store.as_ref(), keys::TIMERS).map_err(|source| not_saved(id, source))
    }

    fn write(&self, id: &str, timers: &[TimerDefinition]) -> Result<()> {
        write_list(self.store.as_ref(), keys::TIMERS, timers).map_err(|source| not_saved(id, source))
    }
}

fn not_saved(id: &str, source: StorageError) -> CoreError {
    CoreError::TimerNotSaved {
        timer_id: id.to_string(),
        source,
    }
}
