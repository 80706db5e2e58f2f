// In: src/error.rs

//! This module defines the single, unified error type for the entire photon codec.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Failures raised inside `encode`/`decode` are wrapped into `EncodeFailure` or
//! `DecodeFailure`, but the original error is kept as a typed `source` so callers
//! can still discriminate the real cause via [`PhotonError::root_cause`].

use std::fmt;
use thiserror::Error;

use crate::types::ElementType;

//==================================================================================
// I. Validation Errors
//==================================================================================

/// The precondition an input value failed. Each condition is its own variant so
/// callers and tests can tell them apart without parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("<photon> requires an n-dimensional array, got {found}")]
    NotAnArray { found: String },

    #[error("<photon> does not support {0} element type arrays")]
    UnsupportedElementType(ElementType),

    #[error("<photon> requires 3D+ arrays (time, height, width, ...), got {ndim}D")]
    InsufficientDimensions { ndim: usize },

    #[error("<photon> requires non-negative values (photon counts cannot be negative), found {count} negative")]
    NegativeValues { count: usize },

    #[error("<photon> requires finite values, found {count} NaN or infinite")]
    NonFiniteValues { count: usize },

    #[error("<photon> requires every axis to be non-empty, got shape {shape:?}")]
    EmptyArray { shape: Vec<usize> },
}

//==================================================================================
// II. Pipeline Stages
//==================================================================================

/// The stage of the write pipeline that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    Validate,
    Address,
    ResolveBackend,
    Transform,
    WriteArray,
    WriteMetadata,
    Commit,
}

/// The stage of the read pipeline that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    ResolveBackend,
    Open,
    VersionCheck,
}

impl fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validate => "validate",
            Self::Address => "address",
            Self::ResolveBackend => "resolve_backend",
            Self::Transform => "transform",
            Self::WriteArray => "write_array",
            Self::WriteMetadata => "write_metadata",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolveBackend => "resolve_backend",
            Self::Open => "open",
            Self::VersionCheck => "version_check",
        };
        f.write_str(name)
    }
}

//==================================================================================
// III. The Unified Error
//==================================================================================

#[derive(Error, Debug)]
pub enum PhotonError {
    // =========================================================================
    // === High-Level, Semantic Errors
    // =========================================================================
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot derive storage address: {0}")]
    Addressing(String),

    #[error("Unknown store '{store}'")]
    BackendResolution { store: String },

    #[error("Invalid transform parameters: {0}")]
    InvalidTransformParameters(String),

    #[error(
        "Unsupported photon codec version: {found} (this codec reads {supported}.x). \
         Upgrade photon-codecs or migrate data."
    )]
    UnsupportedVersion { found: String, supported: String },

    #[error("Artifact is incomplete: {0}")]
    IncompleteArtifact(String),

    #[error("Artifact format error: {0}")]
    ArtifactFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying storage (e.g., file not found, permissions).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during metadata (de)serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Zstd operation failed: {0}")]
    ZstdError(String),

    #[error("Buffer length mismatch: expected a multiple of {0}, got {1}")]
    BufferMismatch(usize, usize),

    // =========================================================================
    // === Facade Wrappers
    // =========================================================================
    #[error("Failed to encode photon movie at stage '{stage}': {source}")]
    EncodeFailure {
        stage: EncodeStage,
        #[source]
        source: Box<PhotonError>,
    },

    #[error("Failed to decode photon movie at stage '{stage}': {source}")]
    DecodeFailure {
        stage: DecodeStage,
        #[source]
        source: Box<PhotonError>,
    },
}

impl PhotonError {
    /// Returns the innermost error, unwrapping any facade wrappers.
    pub fn root_cause(&self) -> &PhotonError {
        match self {
            Self::EncodeFailure { source, .. } | Self::DecodeFailure { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Returns the validation failure, if that is what ultimately went wrong.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self.root_cause() {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn encode_failure(stage: EncodeStage, source: PhotonError) -> Self {
        Self::EncodeFailure {
            stage,
            source: Box::new(source),
        }
    }

    pub(crate) fn decode_failure(stage: DecodeStage, source: PhotonError) -> Self {
        Self::DecodeFailure {
            stage,
            source: Box::new(source),
        }
    }
}
