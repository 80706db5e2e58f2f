//! The small records exchanged with the host and persisted on artifacts.

use serde::{Deserialize, Serialize};

use crate::error::PhotonError;

/// Identifier of the transform applied before storage.
pub const TRANSFORM_NAME: &str = "anscombe";

/// Element type of the stored (transformed) payload.
pub const STORED_DTYPE: &str = "float64";

/// Sensor noise model used by the generalized Anscombe transform.
///
/// The defaults describe pure Poisson noise at unit gain. Once written onto an
/// artifact the parameters are never changed; they are required to invert the
/// transform correctly.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TransformParameters {
    /// Detector gain (counts per photon). Must be positive.
    #[serde(default = "default_gain")]
    pub gain: f64,
    /// Baseline offset subtracted from raw counts.
    #[serde(default)]
    pub offset: f64,
    /// Gaussian read-noise variance. Must be non-negative.
    #[serde(default)]
    pub variance: f64,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            offset: 0.0,
            variance: 0.0,
        }
    }
}

fn default_gain() -> f64 {
    1.0
}

impl TransformParameters {
    pub fn new(gain: f64, offset: f64, variance: f64) -> Self {
        Self {
            gain,
            offset,
            variance,
        }
    }

    /// Checks the parameters fall inside the domain where the forward transform is
    /// finite for every non-negative finite input.
    pub fn validate(&self) -> Result<(), PhotonError> {
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(PhotonError::InvalidTransformParameters(format!(
                "gain must be positive and finite, got {}",
                self.gain
            )));
        }
        if !self.offset.is_finite() {
            return Err(PhotonError::InvalidTransformParameters(format!(
                "offset must be finite, got {}",
                self.offset
            )));
        }
        if !(self.variance.is_finite() && self.variance >= 0.0) {
            return Err(PhotonError::InvalidTransformParameters(format!(
                "variance must be non-negative and finite, got {}",
                self.variance
            )));
        }
        Ok(())
    }
}

/// The metadata record handed back to the host after a successful encode.
///
/// It is intentionally minimal: everything needed to invert the transform lives
/// in the artifact's own attributes. The host persists this record and hands it
/// back unmodified on decode. Records written by older hosts may lack some
/// fields, hence the serde defaults; `codec_version` and `dtype` are accepted as
/// aliases for the field names those hosts used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncodeResult {
    pub path: String,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default, alias = "codec_version")]
    pub format_version: Option<String>,
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default, alias = "dtype")]
    pub stored_dtype: String,
    #[serde(default)]
    pub transform: String,
}
