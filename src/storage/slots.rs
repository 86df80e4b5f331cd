/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/5/25
 ******************************************************************************/
use crate::error::AppError;
use crate::storage::utils::{load_slots, persist_slots, SlotMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Named-slot persistent storage scoped to one backend origin.
pub trait SlotStore: Send + Sync {
    fn get(&self, slot: &str) -> Result<Option<String>, AppError>;
    fn set(&self, slot: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, slot: &str) -> Result<(), AppError>;
}

fn lock_slots(slots: &Mutex<SlotMap>) -> Result<MutexGuard<'_, SlotMap>, AppError> {
    slots
        .lock()
        .map_err(|_| AppError::Storage("slot map lock poisoned".to_string()))
}

/// Slots kept in process memory; gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<SlotMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>, AppError> {
        Ok(lock_slots(&self.slots)?.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), AppError> {
        lock_slots(&self.slots)?.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), AppError> {
        lock_slots(&self.slots)?.remove(slot);
        Ok(())
    }
}

/// Slots kept in a JSON file, rewritten in full on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: Mutex<SlotMap>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let slots = load_slots(&path)?;
        debug!("Opened slot file {} with {} slots", path.display(), slots.len());
        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SlotStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<String>, AppError> {
        Ok(lock_slots(&self.slots)?.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), AppError> {
        let mut slots = lock_slots(&self.slots)?;
        let mut next = slots.clone();
        next.insert(slot.to_string(), value.to_string());
        persist_slots(&self.path, &next)?;
        *slots = next;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), AppError> {
        let mut slots = lock_slots(&self.slots)?;
        if !slots.contains_key(slot) {
            return Ok(());
        }
        let mut next = slots.clone();
        next.remove(slot);
        persist_slots(&self.path, &next)?;
        *slots = next;
        Ok(())
    }
}
