//! A storage backend rooted at a directory on the local filesystem.
//!
//! Each artifact path becomes a directory and each key a file inside it. Every
//! `set` writes to a temporary file in the same directory and renames it into
//! place, so readers never observe a half-written key.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{check_key, check_path, Mapping, StorageBackend};
use crate::error::PhotonError;

const TEMP_PREFIX: &str = ".tmp-";

#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    name: String,
    root: PathBuf,
}

impl FilesystemBackend {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StorageBackend for FilesystemBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_mapping(&self, path: &str) -> Result<Arc<dyn Mapping>, PhotonError> {
        check_path(path)?;
        Ok(Arc::new(FilesystemMapping {
            root: path.to_string(),
            dir: self.root.join(path),
        }))
    }
}

#[derive(Debug)]
struct FilesystemMapping {
    root: String,
    dir: PathBuf,
}

impl FilesystemMapping {
    fn file(&self, key: &str) -> Result<PathBuf, PhotonError> {
        check_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl Mapping for FilesystemMapping {
    fn root(&self) -> &str {
        &self.root
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PhotonError> {
        match fs::read(self.file(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), PhotonError> {
        let target = self.file(key)?;
        fs::create_dir_all(&self.dir)?;

        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)?;
        staged.write_all(value)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PhotonError> {
        match fs::remove_file(self.file(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>, PhotonError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with(TEMP_PREFIX) {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
