use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// Minimal blob storage: whole objects addressed by key.
pub trait ObjectStore: Send + Sync {
    /// The object's bytes, or `None` when no object exists under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError>;
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("invalid object key '{0}'")]
    InvalidKey(String),
    #[error("object '{key}' could not be accessed: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Stores each object as a file beneath a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FilesystemObjectStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ObjectStoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        let path = self.path_for(key)?;
        let io_error = |source| ObjectStoreError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        // Write beside the target and rename so readers never see a partial table.
        let staging = path.with_extension("partial");
        fs::write(&staging, bytes).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)
    }
}

/// Process-local store used by tests and the demo configuration.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store
            .objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), bytes.into());
        store
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        let guard = self
            .objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        let mut guard = self
            .objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(key.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("surf-log-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn filesystem_store_reports_missing_objects_as_none() {
        let store = FilesystemObjectStore::new(scratch_dir("missing"));
        assert!(store.get("log.csv").expect("get").is_none());
    }

    #[test]
    fn filesystem_store_round_trips_nested_keys() {
        let root = scratch_dir("nested");
        let store = FilesystemObjectStore::new(&root);
        store
            .put("tracker/log.csv", b"Date,Time\n".to_vec())
            .expect("put");
        assert_eq!(
            store.get("tracker/log.csv").expect("get"),
            Some(b"Date,Time\n".to_vec())
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn filesystem_store_rejects_escaping_keys() {
        let store = FilesystemObjectStore::new(scratch_dir("escape"));
        assert!(matches!(
            store.get("../outside.csv"),
            Err(ObjectStoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.put("/etc/log.csv", Vec::new()),
            Err(ObjectStoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn in_memory_store_overwrites_objects() {
        let store = InMemoryObjectStore::with_object("log.csv", "old");
        store.put("log.csv", b"new".to_vec()).expect("put");
        assert_eq!(store.get("log.csv").expect("get"), Some(b"new".to_vec()));
    }
}
