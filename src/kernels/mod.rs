//! This module serves as the public API for the collection of pure, stateless
//! numeric and byte kernels.
//!
//! It declares the kernel sub-modules and provides the two chunk-level
//! dispatchers used by the array writer and reader: a chunk of transformed
//! `f64` values goes through the configured shuffle and then zstd, and comes
//! back the same way.

use crate::config::CompressionConfig;
use crate::error::PhotonError;

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Value transform: variance stabilization.
pub mod anscombe;

/// Byte distribution.
pub mod shuffle;

/// Final stage: entropy coding.
pub mod zstd;

//==================================================================================
// 2. Chunk Dispatchers
//==================================================================================

/// Encodes one chunk of row-major `f64` values into its stored bytes.
pub fn encode_chunk(values: &[f64], compression: &CompressionConfig) -> Result<Vec<u8>, PhotonError> {
    let mut shuffled = Vec::with_capacity(values.len() * std::mem::size_of::<f64>());
    shuffle::encode(values, compression.shuffle, &mut shuffled);
    zstd::encode(&shuffled, compression.level)
}

/// Decodes one stored chunk back into `expected_len` row-major `f64` values.
pub fn decode_chunk(
    bytes: &[u8],
    compression: &CompressionConfig,
    expected_len: usize,
) -> Result<Vec<f64>, PhotonError> {
    let shuffled = zstd::decode(bytes)?;
    let mut raw = Vec::with_capacity(shuffled.len());
    shuffle::decode::<f64>(&shuffled, compression.shuffle, &mut raw)?;

    let values: Vec<f64> = raw
        .chunks_exact(std::mem::size_of::<f64>())
        .map(|b| {
            let mut word = [0u8; 8];
            word.copy_from_slice(b);
            f64::from_le_bytes(word)
        })
        .collect();

    if values.len() != expected_len {
        return Err(PhotonError::ArtifactFormat(format!(
            "Chunk holds {} values, expected {}",
            values.len(),
            expected_len
        )));
    }
    Ok(values)
}
