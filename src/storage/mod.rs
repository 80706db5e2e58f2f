// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Storage Layer
// ====================================================================================
//
// The codec never touches files or object stores directly. It asks the
// `BackendRegistry` for a `StorageBackend` by logical store name, and the
// backend hands out a `Mapping`: a flat, mutable key -> bytes view rooted at one
// artifact path.
//
//   [Codec Facade] --store name--> [BackendRegistry] --> Arc<dyn StorageBackend>
//                                                              |
//                                        get_mapping(path) ----'
//                                                              v
//                                                      Arc<dyn Mapping>
//                                                   (.zarray, .zattrs, 0.0.0, ...)
//
// Keys inside a mapping are single path components. Implementations make each
// individual `set` atomic; nothing here coordinates writers across keys.
// ====================================================================================

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::PhotonError;

pub mod filesystem;
pub mod memory;
pub mod registry;

pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use registry::BackendRegistry;

/// A mutable key -> bytes view over one artifact location.
pub trait Mapping: Send + Sync + Debug {
    /// The artifact path this mapping is rooted at.
    fn root(&self) -> &str;

    /// Returns the value for `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PhotonError>;

    /// Stores `value` under `key`, replacing any previous value atomically.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), PhotonError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), PhotonError>;

    /// Lists all keys, sorted.
    fn list(&self) -> Result<Vec<String>, PhotonError>;

    fn contains(&self, key: &str) -> Result<bool, PhotonError> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes every key under this mapping.
    fn clear(&self) -> Result<(), PhotonError> {
        for key in self.list()? {
            self.delete(&key)?;
        }
        Ok(())
    }
}

/// A storage backend able to produce a [`Mapping`] for any artifact path.
pub trait StorageBackend: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn get_mapping(&self, path: &str) -> Result<Arc<dyn Mapping>, PhotonError>;
}

/// Rejects absolute paths, empty segments and parent references.
pub(crate) fn check_path(path: &str) -> Result<(), PhotonError> {
    if path.is_empty() || path.starts_with('/') {
        return Err(PhotonError::Addressing(format!(
            "storage path must be relative and non-empty, got '{}'",
            path
        )));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(PhotonError::Addressing(format!(
            "storage path contains an empty or relative segment: '{}'",
            path
        )));
    }
    Ok(())
}

/// Keys are single components: no separators, no relative references.
pub(crate) fn check_key(key: &str) -> Result<(), PhotonError> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key == "." || key == ".." {
        return Err(PhotonError::ArtifactFormat(format!(
            "invalid mapping key '{}'",
            key
        )));
    }
    Ok(())
}
