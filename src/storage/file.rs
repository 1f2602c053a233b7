//! File-system storage with atomic writes.
//!
//! Writes go to a temp file next to the target and are renamed into place,
//! so a reader never sees a half-written key or license.

use crate::storage::Storage;
use crate::LicenseSealError;
use std::fs;
use std::path::{Path, PathBuf};

/// File-system backed artifact storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    /// Create a file storage backend.
    pub fn new() -> Self {
        Self
    }

    fn temp_path(location: &Path) -> Result<PathBuf, LicenseSealError> {
        let file_name = location.file_name().ok_or_else(|| {
            LicenseSealError::Io(format!("Not a file location: {}", location.display()))
        })?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        Ok(location.with_file_name(temp_name))
    }
}

impl Storage for FileStorage {
    fn read_bytes(&self, location: &Path) -> Result<Vec<u8>, LicenseSealError> {
        fs::read(location).map_err(|e| {
            LicenseSealError::Io(format!("Failed to read {}: {}", location.display(), e))
        })
    }

    fn write_bytes(&self, location: &Path, bytes: &[u8]) -> Result<(), LicenseSealError> {
        let temp_path = Self::temp_path(location)?;

        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LicenseSealError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        // Write to temp file
        fs::write(&temp_path, bytes).map_err(|e| {
            LicenseSealError::Io(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;

        // Atomic rename
        fs::rename(&temp_path, location).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            LicenseSealError::Io(format!("Failed to rename into {}: {}", location.display(), e))
        })?;

        tracing::debug!(path = %location.display(), len = bytes.len(), "wrote artifact");
        Ok(())
    }
}
