//! The chunked-array engine behind the codec.
//!
//! Writing goes through [`writer`], reading through [`lazy`]. Both speak the
//! on-store format defined in [`metadata`], and chunk shapes come from
//! [`chunking`].

pub mod chunking;
pub mod lazy;
pub mod metadata;
pub mod writer;

pub use chunking::compute_chunks;
pub use lazy::{open_array, LazyArray};
pub use metadata::{ArrayMetadata, ArtifactAttributes, CommitMarker, CODEC_NAME};
