//! This module contains the pure, stateless kernels for byte- and bit-shuffling
//! streams of fixed-width primitive values.
//!
//! Shuffling reorganizes a row-oriented stream into planes (all first bytes,
//! all second bytes, ...; or all bit 0s, all bit 1s, ...) so that the slowly
//! varying high-order parts of neighbouring values sit next to each other
//! before zstd sees them. This module is PURE RUST, panic-free, and uses
//! `bytemuck` for safe casting.

use crate::config::ShuffleMode;
use crate::error::PhotonError;

//==================================================================================
// 1. Generic Core Logic (The "Engine")
//==================================================================================

fn shuffle_bytes(input: &[u8], element_size: usize, output_buf: &mut Vec<u8>) {
    let num_elements = input.len() / element_size;
    output_buf.clear();
    output_buf.resize(input.len(), 0);

    for i in 0..element_size {
        for j in 0..num_elements {
            output_buf[i * num_elements + j] = input[j * element_size + i];
        }
    }
}

fn unshuffle_bytes(input: &[u8], element_size: usize, output_buf: &mut Vec<u8>) {
    let num_elements = input.len() / element_size;
    output_buf.clear();
    output_buf.resize(input.len(), 0);

    for i in 0..element_size {
        for j in 0..num_elements {
            output_buf[j * element_size + i] = input[i * num_elements + j];
        }
    }
}

fn shuffle_bits(input: &[u8], element_size: usize, output_buf: &mut Vec<u8>) {
    let num_elements = input.len() / element_size;
    let bits_per_element = element_size * 8;
    output_buf.clear();
    output_buf.resize(input.len(), 0);

    for bit in 0..bits_per_element {
        let (byte_in_elem, shift) = (bit / 8, bit % 8);
        for j in 0..num_elements {
            let value = (input[j * element_size + byte_in_elem] >> shift) & 1;
            let out_bit = bit * num_elements + j;
            output_buf[out_bit / 8] |= value << (out_bit % 8);
        }
    }
}

fn unshuffle_bits(input: &[u8], element_size: usize, output_buf: &mut Vec<u8>) {
    let num_elements = input.len() / element_size;
    let bits_per_element = element_size * 8;
    output_buf.clear();
    output_buf.resize(input.len(), 0);

    for bit in 0..bits_per_element {
        let (byte_in_elem, shift) = (bit / 8, bit % 8);
        for j in 0..num_elements {
            let in_bit = bit * num_elements + j;
            let value = (input[in_bit / 8] >> (in_bit % 8)) & 1;
            output_buf[j * element_size + byte_in_elem] |= value << shift;
        }
    }
}

//==================================================================================
// 2. Public API (Generic, Performant, Decoupled)
//==================================================================================

/// Shuffles a typed slice into `output_buf` according to `mode`.
pub fn encode<T>(input_slice: &[T], mode: ShuffleMode, output_buf: &mut Vec<u8>)
where
    T: bytemuck::Pod,
{
    let element_size = std::mem::size_of::<T>();
    let bytes: &[u8] = bytemuck::cast_slice(input_slice);
    match mode {
        ShuffleMode::Byte if element_size > 1 => shuffle_bytes(bytes, element_size, output_buf),
        ShuffleMode::Bit => shuffle_bits(bytes, element_size, output_buf),
        _ => {
            output_buf.clear();
            output_buf.extend_from_slice(bytes);
        }
    }
}

/// Reverses [`encode`], writing the raw little-endian element bytes to `output_buf`.
pub fn decode<T>(input_bytes: &[u8], mode: ShuffleMode, output_buf: &mut Vec<u8>) -> Result<(), PhotonError>
where
    T: bytemuck::Pod,
{
    let element_size = std::mem::size_of::<T>();
    if input_bytes.len() % element_size != 0 {
        return Err(PhotonError::BufferMismatch(element_size, input_bytes.len()));
    }
    match mode {
        ShuffleMode::Byte if element_size > 1 => {
            unshuffle_bytes(input_bytes, element_size, output_buf)
        }
        ShuffleMode::Bit => unshuffle_bits(input_bytes, element_size, output_buf),
        _ => {
            output_buf.clear();
            output_buf.extend_from_slice(input_bytes);
        }
    }
    Ok(())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
