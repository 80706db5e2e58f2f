//! The chunking policy for stored movies.
//!
//! Movies are read frame by frame or as frame ranges, almost never as small
//! spatial windows. Chunks therefore span at most `max_frames` frames along the
//! time axis and always cover the full extent of every other axis.

/// Computes the chunk shape for an array of `shape`.
///
/// Axis 0 is clamped to `min(max_frames, shape[0])`; the remaining axes are not
/// chunked. `max_frames` comes from `CodecConfig::max_frames_per_chunk`.
pub fn compute_chunks(shape: &[usize], max_frames: usize) -> Vec<usize> {
    let Some((&frames, rest)) = shape.split_first() else {
        return Vec::new();
    };
    let mut chunks = Vec::with_capacity(shape.len());
    chunks.push(frames.min(max_frames.max(1)));
    chunks.extend_from_slice(rest);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_movie_is_capped() {
        assert_eq!(compute_chunks(&[250, 64, 64], 100), vec![100, 64, 64]);
    }

    #[test]
    fn test_short_movie_is_not_padded() {
        assert_eq!(compute_chunks(&[40, 64, 64], 100), vec![40, 64, 64]);
    }

    #[test]
    fn test_extra_axes_are_kept_whole() {
        assert_eq!(compute_chunks(&[1000, 32, 16, 3], 100), vec![100, 32, 16, 3]);
    }

    #[test]
    fn test_cap_is_configurable() {
        assert_eq!(compute_chunks(&[250, 8, 8], 16), vec![16, 8, 8]);
        // A zero cap would make no progress; it is treated as one frame.
        assert_eq!(compute_chunks(&[5, 8, 8], 0), vec![1, 8, 8]);
    }
}
