//! In-memory storage for tests.

use crate::storage::Storage;
use crate::LicenseSealError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Artifact storage backed by a locked map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything is stored at `location`.
    pub fn contains(&self, location: &Path) -> bool {
        self.entries
            .read()
            .map(|guard| guard.contains_key(location))
            .unwrap_or(false)
    }

    /// Remove the entry at `location`, if any.
    pub fn remove(&self, location: &Path) {
        if let Ok(mut guard) = self.entries.write() {
            guard.remove(location);
        }
    }
}

impl Storage for MemoryStorage {
    fn read_bytes(&self, location: &Path) -> Result<Vec<u8>, LicenseSealError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| LicenseSealError::Io("Storage lock poisoned".to_string()))?;
        guard
            .get(location)
            .cloned()
            .ok_or_else(|| LicenseSealError::Io(format!("Not found: {}", location.display())))
    }

    fn write_bytes(&self, location: &Path, bytes: &[u8]) -> Result<(), LicenseSealError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| LicenseSealError::Io("Storage lock poisoned".to_string()))?;
        guard.insert(location.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
