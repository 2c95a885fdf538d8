//! Durable anonymous-mode favorites storage.
//!
//! While no session token is present, the favorites collection is mirrored
//! to a JSON file after every change and rehydrated from it at startup. The
//! file holds a bare array of `{"_id": "..."}` objects - the same shape the
//! account API speaks - and is cleared once a login-time merge hands the
//! data over to the account.

use std::fs;
use std::path::{Path, PathBuf};

use persimmon_core::FavoriteEntry;
use thiserror::Error;

/// File name of the durable favorites store inside the data directory.
const FAVORITES_FILE: &str = "favoriteItems.json";

/// Errors that can occur reading or writing the durable store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON failed to parse or serialize.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Handle to the durable favorites file.
#[derive(Debug, Clone)]
pub struct FavoritesFile {
    path: PathBuf,
}

impl FavoritesFile {
    /// Create a handle for the favorites file inside `data_dir`.
    ///
    /// The directory is created lazily on first save.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FAVORITES_FILE),
        }
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted favorites.
    ///
    /// A missing file is an empty collection, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Vec<FavoriteEntry>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Persist the full favorites collection, replacing any previous contents.
    ///
    /// Writes to a temporary sibling and renames it into place so a crash
    /// mid-write cannot leave a torn file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the write fails.
    pub fn save(&self, entries: &[FavoriteEntry]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the durable copy.
    ///
    /// A missing file is already clear, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use persimmon_core::ProductId;

    fn entries(ids: &[&str]) -> Vec<FavoriteEntry> {
        ids.iter()
            .map(|id| FavoriteEntry::new(ProductId::new(*id)))
            .collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = FavoritesFile::new(dir.path());
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = FavoritesFile::new(dir.path());

        let favorites = entries(&["prod-1", "prod-2"]);
        file.save(&favorites).unwrap();
        assert_eq!(file.load().unwrap(), favorites);
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state");
        let file = FavoritesFile::new(&nested);

        file.save(&entries(&["prod-1"])).unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn test_stored_shape_uses_id_field() {
        let dir = tempfile::tempdir().unwrap();
        let file = FavoritesFile::new(dir.path());

        file.save(&entries(&["prod-9"])).unwrap();
        let raw = fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw, r#"[{"_id":"prod-9"}]"#);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = FavoritesFile::new(dir.path());

        file.save(&entries(&["prod-1"])).unwrap();
        file.clear().unwrap();
        file.clear().unwrap();
        assert!(file.load().unwrap().is_empty());
    }
}
