//! This module defines the core, strongly-typed data representations used
//! throughout the photon codec.
//!
//! It includes the canonical `ElementType` enum, the host-facing `CellValue` /
//! `PhotonArray` values, and the records exchanged with the host and persisted
//! on artifacts.

pub mod element_type;
pub mod record;
pub mod value;

// Re-export the main type(s) for easier access.
pub use element_type::ElementType;
pub use record::{EncodeResult, TransformParameters, STORED_DTYPE, TRANSFORM_NAME};
pub use value::{CellValue, PhotonArray};
