//! Storage for the single session token
//!
//! There is exactly one slot. Writers are not coordinated: two processes
//! sharing a [`FileTokenStore`] race and the last `set` or `clear` wins.
//! Readers never see a partial token; `set` replaces the file by rename.

use parking_lot::RwLock;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn set(&self, token: &str) -> Result<(), StoreError>;
    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Token kept in one file so it survives restarts of the client process.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;

        // Same directory as the target so the rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(token.as_bytes())?;
        staged.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        staged.persist(&self.path).map_err(|e| e.error)?;

        debug!("Session token written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Session token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.read().clone())
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        *self.slot.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session_token"));

        assert_eq!(store.get().unwrap(), None);
        store.set("abc.def.ghi").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc.def.ghi"));

        // One slot: a second set replaces the first.
        store.set("jkl.mno.pqr").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("jkl.mno.pqr"));

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session_token"));
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session_token");
        FileTokenStore::new(&path).set("persisted").unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get().unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_file_store_blank_file_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session_token");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStore::new(&path).get().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session_token");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path).set("new").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_set_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session_token"));
        store.set("first").unwrap();
        store.set("second").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("session_token")]);
    }

    #[test]
    fn test_file_store_readers_never_see_partial_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session_token");
        let long_a = "a".repeat(64 * 1024);
        let long_b = "b".repeat(64 * 1024);
        FileTokenStore::new(&path).set(&long_a).unwrap();

        let writer = {
            let store = FileTokenStore::new(&path);
            let (a, b) = (long_a.clone(), long_b.clone());
            std::thread::spawn(move || {
                for i in 0..50 {
                    store.set(if i % 2 == 0 { b.as_str() } else { a.as_str() }).unwrap();
                }
            })
        };

        let reader = FileTokenStore::new(&path);
        for _ in 0..200 {
            let token = reader.get().unwrap().unwrap();
            assert!(token == long_a || token == long_b, "partial read of {} bytes", token.len());
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("t1");
        assert_eq!(store.get().unwrap().as_deref(), Some("t1"));
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }
}
