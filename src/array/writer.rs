//! Writes a transformed movie into a mapping.
//!
//! The write is split into three phases so a crash leaves a recognisably
//! incomplete artifact rather than a plausible-looking one:
//!
//! 1. [`write_array`] un-publishes any previous artifact (commit marker first),
//!    removes all of its keys, then writes `.zarray` and every chunk.
//! 2. [`write_attributes`] writes `.zattrs`.
//! 3. [`commit`] writes `.zcommit`.
//!
//! Decode only trusts artifacts whose commit marker is present.

use ndarray::{ArrayD, Axis, Slice};

use super::metadata::{
    ArrayMetadata, ArtifactAttributes, CommitMarker, ARRAY_META_KEY, ATTRS_KEY, COMMIT_KEY,
};
use crate::config::CompressionConfig;
use crate::error::PhotonError;
use crate::kernels;
use crate::storage::Mapping;

/// Replaces whatever is stored in `mapping` with `data`, chunked as `chunks`.
pub fn write_array(
    mapping: &dyn Mapping,
    data: &ArrayD<f64>,
    chunks: &[usize],
    compression: &CompressionConfig,
) -> Result<ArrayMetadata, PhotonError> {
    let metadata = ArrayMetadata::new(data.shape(), chunks, *compression);
    metadata.validate()?;

    // Un-publish first so no reader can pair the old marker with new chunks.
    mapping.delete(COMMIT_KEY)?;
    mapping.clear()?;

    mapping.set(ARRAY_META_KEY, &serde_json::to_vec(&metadata)?)?;

    let mut stored_bytes = 0usize;
    for index in 0..metadata.chunk_count() {
        let frames = metadata.chunk_frames(index);
        let block = data.slice_axis(Axis(0), Slice::from(frames.clone()));
        // `iter` walks in logical row-major order regardless of memory layout.
        let values: Vec<f64> = block.iter().copied().collect();
        let encoded = kernels::encode_chunk(&values, compression)?;
        stored_bytes += encoded.len();

        log::debug!(
            "chunk {} of '{}': frames {:?}, {} values -> {} bytes",
            metadata.chunk_key(index),
            mapping.root(),
            frames,
            values.len(),
            encoded.len()
        );
        mapping.set(&metadata.chunk_key(index), &encoded)?;
    }

    log_metric!(
        "event" = "write_array",
        "path" = mapping.root(),
        "chunks" = metadata.chunk_count(),
        "raw_bytes" = data.len() * std::mem::size_of::<f64>(),
        "stored_bytes" = stored_bytes
    );
    Ok(metadata)
}

/// Attaches the artifact attributes. Call only after [`write_array`] succeeded.
pub fn write_attributes(mapping: &dyn Mapping, attrs: &ArtifactAttributes) -> Result<(), PhotonError> {
    mapping.set(ATTRS_KEY, &serde_json::to_vec_pretty(attrs)?)
}

/// Publishes the artifact by writing its commit marker. Must be the final write.
pub fn commit(
    mapping: &dyn Mapping,
    format_version: &str,
    metadata: &ArrayMetadata,
) -> Result<CommitMarker, PhotonError> {
    let marker = CommitMarker::new(format_version, metadata);
    mapping.set(COMMIT_KEY, &serde_json::to_vec(&marker)?)?;
    Ok(marker)
}
