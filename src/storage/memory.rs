//! A process-local, in-memory storage backend.
//!
//! All mappings produced by one `MemoryBackend` share a single ordered map, so
//! two mappings for the same path see the same data, exactly like two handles
//! onto the same directory.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{check_key, check_path, Mapping, StorageBackend};
use crate::error::PhotonError;

type Entries = Arc<RwLock<BTreeMap<String, Vec<u8>>>>;

#[derive(Debug, Clone)]
pub struct MemoryBackend {
    name: String,
    entries: Entries,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of keys across every path. Mostly useful in tests.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_mapping(&self, path: &str) -> Result<Arc<dyn Mapping>, PhotonError> {
        check_path(path)?;
        Ok(Arc::new(MemoryMapping {
            root: path.to_string(),
            prefix: format!("{}/", path),
            entries: Arc::clone(&self.entries),
        }))
    }
}

#[derive(Debug)]
struct MemoryMapping {
    root: String,
    prefix: String,
    entries: Entries,
}

impl MemoryMapping {
    fn full_key(&self, key: &str) -> Result<String, PhotonError> {
        check_key(key)?;
        Ok(format!("{}{}", self.prefix, key))
    }
}

impl Mapping for MemoryMapping {
    fn root(&self) -> &str {
        &self.root
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PhotonError> {
        let full = self.full_key(key)?;
        Ok(self.entries.read().get(&full).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), PhotonError> {
        let full = self.full_key(key)?;
        self.entries.write().insert(full, value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PhotonError> {
        let full = self.full_key(key)?;
        self.entries.write().remove(&full);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, PhotonError> {
        let entries = self.entries.read();
        Ok(entries
            .range(self.prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&self.prefix))
            .filter_map(|(k, _)| {
                let rest = &k[self.prefix.len()..];
                // Keys of nested paths belong to other mappings.
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect())
    }
}
