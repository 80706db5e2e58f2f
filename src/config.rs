// In: src/config.rs

//! The single source of truth for all photon codec configuration.
//!
//! This module defines the unified `CodecConfig` struct, which is designed to be
//! created once at the application boundary (e.g., from a deployment's JSON file)
//! and then passed down through the system via a shared, read-only
//! `Arc<CodecConfig>`.
//!
//! The baseline format version, chunk-size cap and compression settings all live
//! here rather than as literals in the pipeline, so a deployment can override
//! them without touching the codec. A process-wide instance can be installed
//! exactly once with [`init_global`]; it cannot be changed afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::error::PhotonError;
use crate::types::TransformParameters;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// The byte-distribution transform applied to each chunk before zstd.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    /// No reordering; raw little-endian `f64` bytes go to zstd.
    None,
    /// Byte-plane shuffle: all first bytes, then all second bytes, and so on.
    Byte,
    /// **Default:** Bit-plane shuffle. Works best on the smooth mantissas the
    /// Anscombe transform produces.
    #[default]
    Bit,
}

/// Compression applied to every chunk of a stored artifact.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionConfig {
    /// The zstd compression level.
    #[serde(default = "default_zstd_level")]
    pub level: i32,
    #[serde(default)]
    pub shuffle: ShuffleMode,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: default_zstd_level(),
            shuffle: ShuffleMode::default(),
        }
    }
}

/// Declares a named storage backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// A process-local, in-memory store. Contents are lost on exit.
    Memory,
    /// A directory on the local filesystem.
    Filesystem { root: PathBuf },
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

/// The single, unified configuration for the photon codec.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// The format version written onto new artifacts. Its major number is the
    /// baseline the reader accepts.
    #[serde(default = "default_format_version")]
    pub format_version: String,

    /// **The maximum number of frames per chunk.** Chunks never span more than
    /// this many frames along the time axis; spatial axes are never split.
    #[serde(default = "default_max_frames_per_chunk")]
    pub max_frames_per_chunk: usize,

    #[serde(default)]
    pub compression: CompressionConfig,

    /// Transform parameters used when `encode` is called without explicit ones.
    #[serde(default)]
    pub transform: TransformParameters,

    /// If true, decode refuses artifacts without a commit marker. Turn off only
    /// to read legacy artifacts written before markers existed.
    #[serde(default = "default_true")]
    pub require_commit_marker: bool,

    /// The store used when a call names none. `None` means a process-local
    /// in-memory store.
    #[serde(default)]
    pub default_store: Option<String>,

    /// Named stores available to `encode`/`decode`.
    #[serde(default)]
    pub stores: BTreeMap<String, StoreConfig>,
}

// Default implementation to make constructing the config easier.
impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format_version: default_format_version(),
            max_frames_per_chunk: default_max_frames_per_chunk(),
            compression: CompressionConfig::default(),
            transform: TransformParameters::default(),
            require_commit_marker: true,
            default_store: None,
            stores: BTreeMap::new(),
        }
    }
}

impl CodecConfig {
    /// Parses and validates a config from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, PhotonError> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PhotonError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Registers a named store. Builder-style helper for programmatic setup.
    pub fn with_store(mut self, name: impl Into<String>, store: StoreConfig) -> Self {
        self.stores.insert(name.into(), store);
        self
    }

    /// Checks internal consistency. Called by the constructors above and by
    /// [`init_global`].
    pub fn validate(&self) -> Result<(), PhotonError> {
        crate::bridge::version::FormatVersion::parse(&self.format_version).map_err(|_| {
            PhotonError::Config(format!(
                "format_version '{}' is not of the form MAJOR.MINOR",
                self.format_version
            ))
        })?;
        if self.max_frames_per_chunk == 0 {
            return Err(PhotonError::Config(
                "max_frames_per_chunk must be at least 1".into(),
            ));
        }
        if !(1..=22).contains(&self.compression.level) {
            return Err(PhotonError::Config(format!(
                "zstd level must be within 1..=22, got {}",
                self.compression.level
            )));
        }
        self.transform
            .validate()
            .map_err(|e| PhotonError::Config(e.to_string()))?;
        if let Some(name) = &self.default_store {
            if !self.stores.contains_key(name) {
                return Err(PhotonError::Config(format!(
                    "default_store '{}' is not declared in stores",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Provides the baseline format version written by this codec release.
fn default_format_version() -> String {
    "1.0".to_string()
}

/// Caps per-chunk decode latency while keeping the chunk count small.
fn default_max_frames_per_chunk() -> usize {
    100
}

fn default_zstd_level() -> i32 {
    5
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

//==================================================================================
// III. Process-Wide Configuration
//==================================================================================

static GLOBAL_CONFIG: OnceLock<Arc<CodecConfig>> = OnceLock::new();

/// Installs the process-wide configuration. Fails if one is already installed.
pub fn init_global(config: CodecConfig) -> Result<(), PhotonError> {
    config.validate()?;
    GLOBAL_CONFIG
        .set(Arc::new(config))
        .map_err(|_| PhotonError::Config("global configuration is already initialized".into()))
}

/// Returns the process-wide configuration, or the defaults if none was installed.
pub fn global() -> Arc<CodecConfig> {
    Arc::clone(GLOBAL_CONFIG.get_or_init(|| Arc::new(CodecConfig::default())))
}
