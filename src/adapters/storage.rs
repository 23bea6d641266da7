//! Storage adapters.
//!
//! Implement [`StoragePort`] for the retained setpoints.
//!
//! - [`MemoryStorage`] keeps blobs in a map (tests, simulation).
//! - [`FileStorage`] keeps one file per `namespace/key` under a state
//!   directory.  A write goes to a temporary file first and is renamed
//!   into place, so a crash never leaves a half-written blob.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};

fn composite_key(namespace: &str, key: &str) -> String {
    format!("{}::{}", namespace, key)
}

fn copy_out(data: &[u8], buf: &mut [u8]) -> Result<usize, StorageError> {
    if data.len() > buf.len() {
        return Err(StorageError::Full);
    }
    buf[..data.len()].copy_from_slice(data);
    Ok(data.len())
}

// ───────────────────────────────────────────────────────────────
// In-memory
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.borrow().get(&composite_key(namespace, key)) {
            Some(data) => copy_out(data, buf),
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .insert(composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.borrow_mut().remove(&composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&composite_key(namespace, key))
    }
}

// ───────────────────────────────────────────────────────────────
// File-backed
// ───────────────────────────────────────────────────────────────

pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the state directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            warn!("FileStorage: cannot create {}: {}", root.display(), e);
            StorageError::IoError
        })?;
        info!("FileStorage: state in {}", root.display());
        Ok(Self { root })
    }

    fn path(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join(namespace).join(format!("{key}.bin"))
    }
}

fn io_error(e: std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        ErrorKind::StorageFull => StorageError::Full,
        _ => StorageError::IoError,
    }
}

impl StoragePort for FileStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = fs::read(self.path(namespace, key)).map_err(io_error)?;
        copy_out(&data, buf)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path(namespace, key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data).map_err(io_error)?;
        fs::rename(&tmp, &path).map_err(io_error)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(namespace, key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(io_error(e)),
            _ => Ok(()),
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.path(namespace, key).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("heatctl-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_round_trip() {
        let mut s = MemoryStorage::new();
        s.write("ns", "k", b"hello").unwrap();
        assert!(s.exists("ns", "k"));
        let mut buf = [0u8; 16];
        let len = s.read("ns", "k", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello");
        s.delete("ns", "k").unwrap();
        assert!(!s.exists("ns", "k"));
    }

    #[test]
    fn memory_missing_key() {
        let s = MemoryStorage::new();
        let mut buf = [0u8; 4];
        assert_eq!(s.read("ns", "nope", &mut buf), Err(StorageError::NotFound));
    }

    #[test]
    fn short_buffer_is_full_not_truncated() {
        let mut s = MemoryStorage::new();
        s.write("ns", "k", &[1; 8]).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(s.read("ns", "k", &mut buf), Err(StorageError::Full));
    }

    #[test]
    fn namespace_isolation() {
        let mut s = MemoryStorage::new();
        s.write("a", "key", b"alpha").unwrap();
        s.write("b", "key", b"bravo").unwrap();
        let mut buf = [0u8; 16];
        let len = s.read("a", "key", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"alpha");
    }

    #[test]
    fn file_round_trip_and_overwrite() {
        let dir = scratch_dir("rt");
        let mut s = FileStorage::open(&dir).unwrap();
        s.write("heatctl", "setpoints", b"one").unwrap();
        s.write("heatctl", "setpoints", b"second").unwrap();
        let mut buf = [0u8; 16];
        let len = s.read("heatctl", "setpoints", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"second");
        assert!(!dir.join("heatctl").join("setpoints.tmp").exists());

        s.delete("heatctl", "setpoints").unwrap();
        s.delete("heatctl", "setpoints").unwrap();
        assert!(!s.exists("heatctl", "setpoints"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_missing_key() {
        let dir = scratch_dir("missing");
        let s = FileStorage::open(&dir).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(s.read("ns", "k", &mut buf), Err(StorageError::NotFound));
        let _ = fs::remove_dir_all(&dir);
    }
}
