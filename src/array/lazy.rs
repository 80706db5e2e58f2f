//! A read-only, lazily-evaluated handle onto a stored movie.
//!
//! Opening reads only the small JSON documents (`.zarray`, `.zattrs`,
//! `.zcommit`). Chunk payloads are fetched and decoded when a frame or frame
//! range is requested, and only the chunks that range touches.

use ndarray::{ArrayD, IxDyn};
use std::ops::Range;
use std::sync::Arc;

use super::metadata::{
    ArrayMetadata, ArtifactAttributes, CommitMarker, ARRAY_META_KEY, ATTRS_KEY, COMMIT_KEY,
};
use crate::error::PhotonError;
use crate::kernels;
use crate::storage::Mapping;
use crate::types::{ElementType, TransformParameters};

/// Opens the artifact stored in `mapping` without reading any chunk.
pub fn open_array(mapping: Arc<dyn Mapping>) -> Result<LazyArray, PhotonError> {
    let meta_bytes = mapping.get(ARRAY_META_KEY)?.ok_or_else(|| {
        PhotonError::ArtifactFormat(format!("no array found at '{}'", mapping.root()))
    })?;
    let metadata: ArrayMetadata = serde_json::from_slice(&meta_bytes)?;
    metadata.validate()?;

    let attrs = match mapping.get(ATTRS_KEY)? {
        Some(bytes) => serde_json::from_slice(&bytes)?,
        None => ArtifactAttributes::default(),
    };

    let commit = match mapping.get(COMMIT_KEY)? {
        Some(bytes) => {
            let marker: CommitMarker = serde_json::from_slice(&bytes)?;
            marker.matches(&metadata)?;
            Some(marker)
        }
        None => None,
    };

    Ok(LazyArray {
        mapping,
        metadata,
        attrs,
        commit,
    })
}

/// The value returned by `decode`.
///
/// Holds the transformed (variance-stabilized) data. To recover photon counts,
/// pass what you read to [`crate::kernels::anscombe::inverse`] together with
/// [`LazyArray::transform_parameters`].
#[derive(Debug, Clone)]
pub struct LazyArray {
    mapping: Arc<dyn Mapping>,
    metadata: ArrayMetadata,
    attrs: ArtifactAttributes,
    commit: Option<CommitMarker>,
}

impl LazyArray {
    pub fn path(&self) -> &str {
        self.mapping.root()
    }

    pub fn shape(&self) -> &[usize] {
        &self.metadata.shape
    }

    pub fn ndim(&self) -> usize {
        self.metadata.shape.len()
    }

    /// Number of frames along the time axis.
    pub fn len(&self) -> usize {
        self.metadata.frames()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chunks(&self) -> &[usize] {
        &self.metadata.chunks
    }

    pub fn metadata(&self) -> &ArrayMetadata {
        &self.metadata
    }

    pub fn attrs(&self) -> &ArtifactAttributes {
        &self.attrs
    }

    pub fn commit_marker(&self) -> Option<&CommitMarker> {
        self.commit.as_ref()
    }

    /// The format version recorded on the artifact itself, if any.
    pub fn format_version(&self) -> Option<&str> {
        self.attrs.codec_version.as_deref()
    }

    pub fn transform_parameters(&self) -> Option<TransformParameters> {
        self.attrs.transform_parameters()
    }

    pub fn original_dtype(&self) -> Result<Option<ElementType>, PhotonError> {
        self.attrs.original_dtype()
    }

    /// Reads one frame. The result has the array's shape without the time axis.
    pub fn frame(&self, index: usize) -> Result<ArrayD<f64>, PhotonError> {
        let end = index.checked_add(1).ok_or_else(|| {
            PhotonError::ArtifactFormat(format!("frame {} is out of bounds for {} frames", index, self.len()))
        })?;
        let block = self.frames(index..end)?;
        Ok(block.index_axis_move(ndarray::Axis(0), 0))
    }

    /// Reads a contiguous range of frames.
    pub fn frames(&self, range: Range<usize>) -> Result<ArrayD<f64>, PhotonError> {
        if range.start > range.end || range.end > self.len() {
            return Err(PhotonError::ArtifactFormat(format!(
                "frame range {:?} is out of bounds for {} frames",
                range,
                self.len()
            )));
        }

        let frame_len = self.metadata.frame_len();
        let mut values = Vec::with_capacity(range.len() * frame_len);
        if !range.is_empty() {
            let per_chunk = self.metadata.chunks[0];
            for index in (range.start / per_chunk)..=((range.end - 1) / per_chunk) {
                let covered = self.metadata.chunk_frames(index);
                let chunk = self.read_chunk(index)?;
                let lo = range.start.max(covered.start) - covered.start;
                let hi = range.end.min(covered.end) - covered.start;
                values.extend_from_slice(&chunk[lo * frame_len..hi * frame_len]);
            }
        }

        let mut shape = self.metadata.shape.clone();
        shape[0] = range.len();
        ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| PhotonError::ArtifactFormat(e.to_string()))
    }

    /// Materializes the whole movie.
    pub fn read_all(&self) -> Result<ArrayD<f64>, PhotonError> {
        self.frames(0..self.len())
    }

    fn read_chunk(&self, index: usize) -> Result<Vec<f64>, PhotonError> {
        let key = self.metadata.chunk_key(index);
        let bytes = self.mapping.get(&key)?.ok_or_else(|| {
            PhotonError::ArtifactFormat(format!("chunk '{}' missing from '{}'", key, self.path()))
        })?;
        let expected = self.metadata.chunk_frames(index).len() * self.metadata.frame_len();
        log::debug!("reading chunk '{}' of '{}' ({} bytes)", key, self.path(), bytes.len());
        kernels::decode_chunk(&bytes, &self.metadata.compressor, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::writer::{commit, write_array, write_attributes};
    use crate::config::CompressionConfig;
    use crate::storage::{MemoryBackend, StorageBackend};

    fn stored(frames: usize, per_chunk: usize) -> (ArrayD<f64>, Arc<dyn Mapping>) {
        let data = ArrayD::from_shape_fn(IxDyn(&[frames, 2, 3]), |ix| {
            (ix[0] * 100 + ix[1] * 10 + ix[2]) as f64
        });
        let backend = MemoryBackend::new("mem");
        let mapping = backend.get_mapping("s/t/id=1/m.zarr").unwrap();
        let meta = write_array(mapping.as_ref(), &data, &[per_chunk, 2, 3], &CompressionConfig::default())
            .unwrap();
        write_attributes(mapping.as_ref(), &ArtifactAttributes::default()).unwrap();
        commit(mapping.as_ref(), "1.0", &meta).unwrap();
        (data, mapping)
    }

    #[test]
    fn test_frame_ranges_across_chunk_boundaries() {
        let (data, mapping) = stored(23, 5);
        let lazy = open_array(mapping).unwrap();
        assert_eq!(lazy.shape(), &[23, 2, 3]);
        assert_eq!(lazy.chunks(), &[5, 2, 3]);

        let range = lazy.frames(3..17).unwrap();
        let expected = data.slice_axis(ndarray::Axis(0), ndarray::Slice::from(3usize..17)).to_owned();
        assert_eq!(range, expected);

        assert_eq!(lazy.read_all().unwrap(), data);
        assert_eq!(lazy.frames(7..7).unwrap().shape(), &[0, 2, 3]);
    }

    #[test]
    fn test_single_frame_drops_time_axis() {
        let (data, mapping) = stored(12, 5);
        let lazy = open_array(mapping).unwrap();
        let frame = lazy.frame(11).unwrap();
        assert_eq!(frame.shape(), &[2, 3]);
        assert_eq!(frame, data.index_axis(ndarray::Axis(0), 11).to_owned());
    }

    #[test]
    fn test_out_of_bounds_range_is_rejected() {
        let (_, mapping) = stored(4, 5);
        let lazy = open_array(mapping).unwrap();
        assert!(lazy.frames(2..5).is_err());
        assert!(lazy.frame(4).is_err());
    }

    #[test]
    fn test_largest_index_is_out_of_bounds_not_overflow() {
        let (_, mapping) = stored(4, 5);
        let lazy = open_array(mapping).unwrap();
        assert!(matches!(lazy.frame(usize::MAX), Err(PhotonError::ArtifactFormat(_))));
        assert!(lazy.frames(usize::MAX - 1..usize::MAX).is_err());
    }

    #[test]
    fn test_corrupt_chunk_header_is_an_error() {
        let (_, mapping) = stored(12, 5);
        let mut chunk = mapping.get("0.0.0").unwrap().unwrap();
        chunk[..8].copy_from_slice(&[0xFF; 8]);
        mapping.set("0.0.0", &chunk).unwrap();

        let lazy = open_array(mapping).unwrap();
        assert!(matches!(lazy.frame(0), Err(PhotonError::ZstdError(_))));
        assert!(lazy.frame(5).is_ok());
    }

    #[test]
    fn test_oversized_shape_is_rejected_on_open() {
        let (_, mapping) = stored(4, 5);
        let mut meta: ArrayMetadata =
            serde_json::from_slice(&mapping.get(ARRAY_META_KEY).unwrap().unwrap()).unwrap();
        meta.shape = vec![4, usize::MAX, 3];
        meta.chunks = vec![5, usize::MAX, 3];
        mapping.set(ARRAY_META_KEY, &serde_json::to_vec(&meta).unwrap()).unwrap();
        assert!(matches!(open_array(mapping), Err(PhotonError::ArtifactFormat(_))));
    }

    #[test]
    fn test_missing_chunk_is_reported_on_read_not_open() {
        let (_, mapping) = stored(12, 5);
        mapping.delete("1.0.0").unwrap();
        let lazy = open_array(Arc::clone(&mapping)).unwrap();
        assert!(lazy.frame(0).is_ok());
        assert!(matches!(lazy.frame(6), Err(PhotonError::ArtifactFormat(_))));
    }

    #[test]
    fn test_open_without_array_fails() {
        let backend = MemoryBackend::new("mem");
        let mapping = backend.get_mapping("nothing/here").unwrap();
        assert!(matches!(open_array(mapping), Err(PhotonError::ArtifactFormat(_))));
    }
}
