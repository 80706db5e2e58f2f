//! This file is the root of the `photon_codecs` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`bridge`, `array`,
//!     `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types a host needs to encode and decode
//!     photon-limited movies.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Lets `log_metric!` expand in crates that do not depend on `log` themselves.
#[doc(hidden)]
pub use log as __log;
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod addressing;
pub mod array;
pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod storage;
pub mod types;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use addressing::{AddressResolver, IdentityContext, KeyValue, PrimaryKey, SchemaAddressing};
pub use array::LazyArray;
pub use bridge::PhotonCodec;
pub use config::{CodecConfig, CompressionConfig, ShuffleMode, StoreConfig};
pub use error::{DecodeStage, EncodeStage, PhotonError, ValidationError};
pub use observability::init_logging;
pub use types::{CellValue, ElementType, EncodeResult, PhotonArray, TransformParameters};
