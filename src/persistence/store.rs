use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Errors that can occur while reading or writing the save record.
#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Serialize(String),
    Deserialize(String),
    Unavailable(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Serialize(e) => write!(f, "Serialization error: {}", e),
            StorageError::Deserialize(e) => write!(f, "Deserialization error: {}", e),
            StorageError::Unavailable(e) => write!(f, "Storage unavailable: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Single-record key-value storage for the serialized game progress.
///
/// Implementations hold at most one record. `read` returns `Ok(None)` when
/// nothing has been saved yet.
pub trait ProgressStore: Send {
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&mut self, record: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Save record kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("save");
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

impl ProgressStore for FileStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Writes to a temporary sibling first, then renames over the record, so a
    /// partial write never replaces a good save.
    fn write(&mut self, record: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, record) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Io(e));
        }

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// In-process store. Clones share the same slot, so a test can keep a handle
/// while the game owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: impl Into<String>) -> Self {
        MemoryStore {
            slot: Arc::new(Mutex::new(Some(record.into()))),
        }
    }
}

impl ProgressStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(slot.clone())
    }

    fn write(&mut self, record: &str) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *slot = Some(record.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("save.json"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn file_store_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("save.json"));
        store.write(r#"{"keysCollected":2}"#).unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some(r#"{"keysCollected":2}"#));
    }

    #[test]
    fn file_store_overwrites_previous_record() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("save.json"));
        store.write("first").unwrap();
        store.write("second").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn file_store_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep").join("nested").join("save.json");
        let mut store = FileStore::new(&path);
        store.write("{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_store_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("save.json"));
        store.write("{}").unwrap();

        let temp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_str().is_some_and(|n| n.starts_with('.')))
            .collect();
        assert!(temp_files.is_empty());
    }

    #[test]
    fn file_store_clear_removes_record_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("save.json"));
        store.write("{}").unwrap();
        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn file_store_read_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.read(), Err(StorageError::Io(_))));
    }

    #[test]
    fn memory_store_clones_share_slot() {
        let handle = MemoryStore::new();
        let mut owned = handle.clone();
        owned.write("saved").unwrap();
        assert_eq!(handle.read().unwrap().as_deref(), Some("saved"));
        owned.clear().unwrap();
        assert!(handle.read().unwrap().is_none());
    }
}
