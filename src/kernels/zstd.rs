//! This module contains the Zstandard kernels used for every stored chunk.
//!
//! A compressed chunk is laid out as an 8-byte little-endian uncompressed
//! length followed by a single zstd frame. The length header lets the decoder
//! allocate once and detect truncated or corrupted chunks. This module is a
//! safe, panic-free wrapper around the `zstd` crate.

use std::io::Write;

use crate::error::PhotonError;

const LEN_HEADER: usize = 8;

/// Compresses `input_bytes` at `level`, prepending the uncompressed size.
pub fn encode(input_bytes: &[u8], level: i32) -> Result<Vec<u8>, PhotonError> {
    let mut output_buf = Vec::with_capacity(LEN_HEADER + input_bytes.len() / 2);
    output_buf.extend_from_slice(&(input_bytes.len() as u64).to_le_bytes());

    let mut encoder = zstd::stream::Encoder::new(&mut output_buf, level)
        .map_err(|e| PhotonError::ZstdError(e.to_string()))?;
    encoder
        .write_all(input_bytes)
        .map_err(|e| PhotonError::ZstdError(e.to_string()))?;
    // `finish` is essential to finalize the Zstd frame.
    encoder
        .finish()
        .map_err(|e| PhotonError::ZstdError(e.to_string()))?;

    Ok(output_buf)
}

/// Decompresses a buffer produced by [`encode`].
pub fn decode(input_bytes: &[u8]) -> Result<Vec<u8>, PhotonError> {
    if input_bytes.len() < LEN_HEADER {
        return Err(PhotonError::ZstdError(
            "Input stream too short to contain size header.".to_string(),
        ));
    }
    let (header, compressed) = input_bytes.split_at(LEN_HEADER);
    let mut len_bytes = [0u8; LEN_HEADER];
    len_bytes.copy_from_slice(header);
    let uncompressed_len = u64::from_le_bytes(len_bytes);

    // The header is untrusted until the frame is decoded, so the buffer grows
    // as the decoder yields bytes rather than being sized from it.
    let mut decompressed = Vec::new();
    let mut decoder = zstd::stream::Decoder::new(compressed)
        .map_err(|e| PhotonError::ZstdError(e.to_string()))?;
    std::io::copy(&mut decoder, &mut decompressed)
        .map_err(|e| PhotonError::ZstdError(e.to_string()))?;

    if decompressed.len() as u64 != uncompressed_len {
        return Err(PhotonError::ZstdError(format!(
            "Decompressed size does not match header. Expected {}, got {}.",
            uncompressed_len,
            decompressed.len()
        )));
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip_highly_compressible_data() {
        let original_bytes = vec![42u8; 10_000];
        let compressed_bytes = encode(&original_bytes, 5).unwrap();
        assert!(compressed_bytes.len() < 64);
        assert_eq!(decode(&compressed_bytes).unwrap(), original_bytes);
    }

    #[test]
    fn test_zstd_empty_input_keeps_header() {
        let compressed = encode(&[], 5).unwrap();
        assert!(compressed.len() >= LEN_HEADER);
        assert!(decode(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_zstd_corrupt_size_header_is_an_error() {
        let mut compressed = encode(&[7u8; 256], 5).unwrap();
        compressed[..LEN_HEADER].copy_from_slice(&[0xFF; LEN_HEADER]);
        assert!(matches!(decode(&compressed), Err(PhotonError::ZstdError(_))));
    }

    #[test]
    fn test_zstd_decompress_invalid_data() {
        let result = decode(&[1, 2, 3, 4, 5]);
        assert!(matches!(result, Err(PhotonError::ZstdError(_))));
    }

    #[test]
    fn test_zstd_detects_length_tampering() {
        let mut compressed = encode(b"photon photon photon photon", 3).unwrap();
        compressed[0] = compressed[0].wrapping_add(1);
        assert!(matches!(decode(&compressed), Err(PhotonError::ZstdError(_))));
    }
}
