// In: src/bridge/stateless_api.rs

//! Free functions over a lazily-built, process-wide [`PhotonCodec`].
//!
//! The codec is constructed on first use from [`crate::config::global`], so
//! `config::init_global` must be called before the first of these functions if
//! the defaults are not wanted. Stores (including the default in-memory store)
//! are shared by every call.

use std::sync::OnceLock;

use crate::addressing::IdentityContext;
use crate::array::LazyArray;
use crate::bridge::codec::PhotonCodec;
use crate::error::PhotonError;
use crate::types::{CellValue, EncodeResult, TransformParameters};

static DEFAULT_CODEC: OnceLock<PhotonCodec> = OnceLock::new();

/// Returns the process-wide codec, building it on first use.
pub fn default_codec() -> Result<&'static PhotonCodec, PhotonError> {
    if let Some(codec) = DEFAULT_CODEC.get() {
        return Ok(codec);
    }
    let codec = PhotonCodec::from_global()?;
    // Another thread may have won the race; either instance is equivalent.
    Ok(DEFAULT_CODEC.get_or_init(|| codec))
}

pub fn validate(value: &CellValue) -> Result<(), PhotonError> {
    default_codec()?.validate(value)
}

pub fn encode(
    value: &CellValue,
    context: &IdentityContext,
    params: Option<TransformParameters>,
) -> Result<EncodeResult, PhotonError> {
    default_codec()?.encode_with(value, context, params)
}

pub fn decode(record: &EncodeResult) -> Result<LazyArray, PhotonError> {
    default_codec()?.decode(record)
}
