use crate::domain::aggregate::EntryView;
use crate::infrastructure::error::CoreError;
use std::sync::{Mutex, MutexGuard};

/// Ordered client-side view of time entries, newest first. Owned by one
/// consuming view at a time; only the mutation controller and the
/// resynchronization path write to it. Readers always get a copy, never a
/// handle into the internal sequence.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Mutex<Vec<EntryView>>,
}

impl EntryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<EntryView>>, CoreError> {
        self.entries
            .lock()
            .map_err(|error| CoreError::Internal(format!("entry store lock poisoned: {error}")))
    }

    /// Adds a newly created entry at the head, preserving descending-recency
    /// order.
    pub fn insert_front(&self, entry: EntryView) -> Result<(), CoreError> {
        self.lock()?.insert(0, entry);
        Ok(())
    }

    /// Removes the first entry with a matching id. Absence is not an error;
    /// deletion is expected to race with resynchronization.
    pub fn remove_by_id(&self, entry_id: &str) -> Result<(), CoreError> {
        let mut entries = self.lock()?;
        if let Some(position) = entries.iter().position(|entry| entry.id == entry_id) {
            entries.remove(position);
        }
        Ok(())
    }

    /// Replaces an entry in place at its existing position. A no-op when the
    /// id is absent; the resynchronization path is responsible for surfacing
    /// missing state.
    pub fn replace_by_id(&self, entry_id: &str, updated: EntryView) -> Result<(), CoreError> {
        let mut entries = self.lock()?;
        if let Some(slot) = entries.iter_mut().find(|entry| entry.id == entry_id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Replaces the whole sequence with an authoritative result.
    pub fn reset(&self, entries: Vec<EntryView>) -> Result<(), CoreError> {
        *self.lock()? = entries;
        Ok(())
    }

    /// Copy-on-read snapshot of the current ordered sequence.
    pub fn snapshot(&self) -> Result<Vec<EntryView>, CoreError> {
        Ok(self.lock()?.clone())
    }
}
