// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the sole public-facing API of the photon codec. It turns a host
// cell (an `IdentityContext` plus a `CellValue`) into a committed artifact and a
// small `EncodeResult` record, and turns that record back into a `LazyArray`.
//
// Data Flow (Encode):
//
//   1. [validate]            -> CellValue checked: array, numeric, 3D+, non-empty, >= 0
//   2. [addressing]          -> IdentityContext -> StorageAddress (path, store, token)
//   3. [storage::registry]   -> store name -> StorageBackend -> Mapping
//   4. [kernels::anscombe]   -> widened to f64, forward transform
//   5. [array::writer]       -> commit marker deleted, old keys cleared, .zarray + chunks
//   6. [array::writer]       -> .zattrs (version, transform parameters, original dtype)
//   7. [array::writer]       -> .zcommit written last
//
// Data Flow (Decode):
//
//   1. [storage::registry]   -> record.store -> Mapping at record.path
//   2. [commit check]        -> missing .zcommit is IncompleteArtifact (unless lenient)
//   3. [array::lazy]         -> .zarray/.zattrs read, no chunk touched
//   4. [version]             -> attr, then record, then baseline; same major required
//
// Every failure is wrapped with the stage it occurred in; the typed cause is kept.
// ====================================================================================
pub mod codec;
pub mod stateless_api;
pub mod validate;
pub mod version;

pub use codec::PhotonCodec;
pub use validate::validate;
pub use version::{check_compatible, major_of, resolve_version, FormatVersion, VersionSource};
