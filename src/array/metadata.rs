//! Defines the self-describing on-store format of a stored movie.
//!
//! An artifact is a mapping holding:
//!
//! | key        | contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | `.zarray`  | JSON [`ArrayMetadata`]: shape, chunk shape, dtype, codec  |
//! | `.zattrs`  | JSON [`ArtifactAttributes`]: version, transform, dtype    |
//! | `t.0.0`    | one compressed chunk per block of frames                  |
//! | `.zcommit` | JSON [`CommitMarker`], written last                       |
//!
//! This module is the single source of truth for these structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::CompressionConfig;
use crate::error::PhotonError;
use crate::types::{ElementType, TransformParameters, TRANSFORM_NAME};

//==================================================================================
// Format Constants
//==================================================================================
pub const ARRAY_META_KEY: &str = ".zarray";
pub const ATTRS_KEY: &str = ".zattrs";
pub const COMMIT_KEY: &str = ".zcommit";

/// Identifies artifacts written by this codec.
pub const CODEC_NAME: &str = "photon";

/// Little-endian IEEE 754 double, in the numpy type-string notation.
const STORED_TYPESTR: &str = "<f8";
const ARRAY_FORMAT: u8 = 2;

//==================================================================================
// I. Array Metadata
//==================================================================================

/// Layout of the stored payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArrayMetadata {
    pub zarr_format: u8,
    pub shape: Vec<usize>,
    pub chunks: Vec<usize>,
    pub dtype: String,
    pub compressor: CompressionConfig,
    pub order: String,
    pub fill_value: f64,
}

impl ArrayMetadata {
    pub fn new(shape: &[usize], chunks: &[usize], compression: CompressionConfig) -> Self {
        Self {
            zarr_format: ARRAY_FORMAT,
            shape: shape.to_vec(),
            chunks: chunks.to_vec(),
            dtype: STORED_TYPESTR.to_string(),
            compressor: compression,
            order: "C".to_string(),
            fill_value: 0.0,
        }
    }

    /// Checks the metadata describes a layout this reader can serve.
    pub fn validate(&self) -> Result<(), PhotonError> {
        if self.zarr_format != ARRAY_FORMAT {
            return Err(PhotonError::ArtifactFormat(format!(
                "unsupported array format {}",
                self.zarr_format
            )));
        }
        if self.dtype != STORED_TYPESTR || self.order != "C" {
            return Err(PhotonError::ArtifactFormat(format!(
                "unsupported payload layout dtype={} order={}",
                self.dtype, self.order
            )));
        }
        if self.shape.is_empty() || self.shape.len() != self.chunks.len() {
            return Err(PhotonError::ArtifactFormat(format!(
                "chunk shape {:?} does not match array shape {:?}",
                self.chunks, self.shape
            )));
        }
        if self.chunks[0] == 0 || self.chunks[1..] != self.shape[1..] {
            return Err(PhotonError::ArtifactFormat(format!(
                "chunk shape {:?} is not time-chunked over array shape {:?}",
                self.chunks, self.shape
            )));
        }
        // Byte size must be addressable, not just the element count.
        let addressable = self
            .shape
            .iter()
            .try_fold(std::mem::size_of::<f64>(), |acc, &dim| acc.checked_mul(dim))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !addressable {
            return Err(PhotonError::ArtifactFormat(format!(
                "array shape {:?} is too large to address",
                self.shape
            )));
        }
        Ok(())
    }

    /// Number of frames (length of the time axis).
    pub fn frames(&self) -> usize {
        self.shape[0]
    }

    /// Number of elements in one frame.
    pub fn frame_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Number of chunks along the time axis.
    pub fn chunk_count(&self) -> usize {
        self.frames().div_ceil(self.chunks[0])
    }

    /// The frames covered by chunk `index`. The last chunk may be short.
    pub fn chunk_frames(&self, index: usize) -> Range<usize> {
        let start = index * self.chunks[0];
        start..(start + self.chunks[0]).min(self.frames())
    }

    /// The storage key of chunk `index`: its time-block index followed by a zero
    /// for every other axis.
    pub fn chunk_key(&self, index: usize) -> String {
        let mut key = index.to_string();
        for _ in 1..self.shape.len() {
            key.push_str(".0");
        }
        key
    }
}

//==================================================================================
// II. Attributes
//==================================================================================

/// Attributes attached to a stored movie.
///
/// Together they are enough to plan the inverse transform without consulting
/// the host's record. Every field is optional on read because legacy or
/// partially written artifacts may lack some of them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ArtifactAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anscombe_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anscombe_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anscombe_variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_dtype: Option<String>,
    /// Attributes this codec does not interpret, kept so they survive a read.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ArtifactAttributes {
    /// The attributes written by `encode`.
    pub fn for_encode(
        format_version: &str,
        params: &TransformParameters,
        original_dtype: ElementType,
    ) -> Self {
        Self {
            codec_version: Some(format_version.to_string()),
            codec_name: Some(CODEC_NAME.to_string()),
            transform: Some(TRANSFORM_NAME.to_string()),
            anscombe_gain: Some(params.gain),
            anscombe_offset: Some(params.offset),
            anscombe_variance: Some(params.variance),
            original_dtype: Some(original_dtype.to_string()),
            extra: serde_json::Map::new(),
        }
    }

    /// The recorded transform parameters, if all three were recorded.
    pub fn transform_parameters(&self) -> Option<TransformParameters> {
        Some(TransformParameters::new(
            self.anscombe_gain?,
            self.anscombe_offset?,
            self.anscombe_variance?,
        ))
    }

    /// The recorded element type of the movie before the transform.
    pub fn original_dtype(&self) -> Result<Option<ElementType>, PhotonError> {
        self.original_dtype
            .as_deref()
            .map(str::parse::<ElementType>)
            .transpose()
    }
}

//==================================================================================
// III. Commit Marker
//==================================================================================

/// Written after the payload and attributes; its presence means the artifact
/// is complete. Re-encodes delete it before touching anything else.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommitMarker {
    pub format_version: String,
    pub shape: Vec<usize>,
    pub chunk_count: usize,
    pub committed_at: DateTime<Utc>,
}

impl CommitMarker {
    pub fn new(format_version: &str, metadata: &ArrayMetadata) -> Self {
        Self {
            format_version: format_version.to_string(),
            shape: metadata.shape.clone(),
            chunk_count: metadata.chunk_count(),
            committed_at: Utc::now(),
        }
    }

    /// Cross-checks the marker against the array metadata it was committed with.
    pub fn matches(&self, metadata: &ArrayMetadata) -> Result<(), PhotonError> {
        if self.shape != metadata.shape || self.chunk_count != metadata.chunk_count() {
            return Err(PhotonError::IncompleteArtifact(format!(
                "commit marker (shape {:?}, {} chunks) disagrees with array metadata (shape {:?}, {} chunks)",
                self.shape,
                self.chunk_count,
                metadata.shape,
                metadata.chunk_count()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(shape: &[usize], frames_per_chunk: usize) -> ArrayMetadata {
        let mut chunks = shape.to_vec();
        chunks[0] = frames_per_chunk;
        ArrayMetadata::new(shape, &chunks, CompressionConfig::default())
    }

    #[test]
    fn test_chunk_grid_covers_all_frames() {
        let meta = metadata(&[250, 4, 4], 100);
        assert_eq!(meta.chunk_count(), 3);
        assert_eq!(meta.chunk_frames(0), 0..100);
        assert_eq!(meta.chunk_frames(2), 200..250);
        assert_eq!(meta.chunk_key(2), "2.0.0");
        assert_eq!(meta.frame_len(), 16);
    }

    #[test]
    fn test_chunk_key_follows_dimensionality() {
        let meta = metadata(&[10, 2, 3, 4], 5);
        assert_eq!(meta.chunk_key(1), "1.0.0.0");
    }

    #[test]
    fn test_metadata_validation() {
        assert!(metadata(&[10, 4, 4], 5).validate().is_ok());

        let mut spatially_chunked = metadata(&[10, 4, 4], 5);
        spatially_chunked.chunks[1] = 2;
        assert!(matches!(
            spatially_chunked.validate(),
            Err(PhotonError::ArtifactFormat(_))
        ));

        let oversized = metadata(&[10, usize::MAX / 2, 4], 5);
        assert!(matches!(oversized.validate(), Err(PhotonError::ArtifactFormat(_))));

        let mut wrong_dtype = metadata(&[10, 4, 4], 5);
        wrong_dtype.dtype = "<f4".into();
        assert!(wrong_dtype.validate().is_err());
    }

    #[test]
    fn test_attributes_alone_plan_the_inverse() {
        let params = TransformParameters::new(2.0, 100.0, 3.5);
        let attrs = ArtifactAttributes::for_encode("1.0", &params, ElementType::UInt16);
        let json = serde_json::to_string(&attrs).unwrap();

        let read: ArtifactAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(read.transform_parameters(), Some(params));
        assert_eq!(read.original_dtype().unwrap(), Some(ElementType::UInt16));
        assert_eq!(read.codec_version.as_deref(), Some("1.0"));
        assert_eq!(read.codec_name.as_deref(), Some(CODEC_NAME));
    }

    #[test]
    fn test_unknown_attributes_are_preserved() {
        let read: ArtifactAttributes =
            serde_json::from_str(r#"{"codec_version":"1.2","operator":"jd"}"#).unwrap();
        assert_eq!(read.extra.get("operator"), Some(&serde_json::json!("jd")));
        assert_eq!(read.transform_parameters(), None);
    }

    #[test]
    fn test_commit_marker_detects_mismatch() {
        let meta = metadata(&[250, 4, 4], 100);
        let marker = CommitMarker::new("1.0", &meta);
        assert!(marker.matches(&meta).is_ok());

        let other = metadata(&[251, 4, 4], 100);
        assert!(matches!(
            marker.matches(&other),
            Err(PhotonError::IncompleteArtifact(_))
        ));
    }
}
