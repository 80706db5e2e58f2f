//! Resolves logical store names to storage backends.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{FilesystemBackend, MemoryBackend, StorageBackend};
use crate::config::{CodecConfig, StoreConfig};
use crate::error::PhotonError;

/// Name given to the in-memory backend used when no default store is configured.
pub const DEFAULT_MEMORY_STORE: &str = "default";

/// Maps store names to backends. Built once from configuration and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    default: Arc<dyn StorageBackend>,
    named: BTreeMap<String, Arc<dyn StorageBackend>>,
}

impl BackendRegistry {
    /// Creates a registry with only a default backend.
    pub fn new(default: Arc<dyn StorageBackend>) -> Self {
        Self {
            default,
            named: BTreeMap::new(),
        }
    }

    /// Instantiates every store declared in `config`.
    pub fn from_config(config: &CodecConfig) -> Result<Self, PhotonError> {
        let mut named: BTreeMap<String, Arc<dyn StorageBackend>> = BTreeMap::new();
        for (name, store) in &config.stores {
            let backend: Arc<dyn StorageBackend> = match store {
                StoreConfig::Memory => Arc::new(MemoryBackend::new(name.clone())),
                StoreConfig::Filesystem { root } => {
                    Arc::new(FilesystemBackend::new(name.clone(), root.clone()))
                }
            };
            named.insert(name.clone(), backend);
        }

        let default = match &config.default_store {
            Some(name) => named.get(name).cloned().ok_or_else(|| {
                PhotonError::Config(format!("default_store '{}' is not declared", name))
            })?,
            None => Arc::new(MemoryBackend::new(DEFAULT_MEMORY_STORE)),
        };

        log::debug!(
            "backend registry: default='{}', named={:?}",
            default.name(),
            named.keys().collect::<Vec<_>>()
        );
        Ok(Self { default, named })
    }

    /// Adds or replaces a named backend.
    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn StorageBackend>) {
        self.named.insert(name.into(), backend);
    }

    /// Returns the backend for `store_name`, or the default backend for `None`.
    pub fn get_backend(&self, store_name: Option<&str>) -> Result<Arc<dyn StorageBackend>, PhotonError> {
        match store_name {
            None => Ok(Arc::clone(&self.default)),
            Some(name) => self
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| PhotonError::BackendResolution {
                    store: name.to_string(),
                }),
        }
    }
}
