//! This module contains the pure, stateless kernels for the generalized Anscombe
//! variance-stabilizing transform.
//!
//! The forward transform maps Poisson-Gaussian counts `x` (gain `a`, offset `m`,
//! read-noise variance `s2`) to values with approximately unit variance:
//!
//! ```text
//! y = (2 / a) * sqrt(max(a*x + 3/8*a^2 + s2 - a*m, 0))
//! ```
//!
//! The codec only ever calls [`forward`]. [`inverse`] is the closed-form
//! unbiased inverse (Makitalo & Foi) and is published so callers can recover
//! counts from decoded data using the parameters recorded on the artifact.

use ndarray::ArrayD;

use crate::error::PhotonError;
use crate::types::TransformParameters;

//==================================================================================
// 1. Core Logic (The "Engine")
//==================================================================================

#[inline]
fn forward_value(x: f64, p: &TransformParameters) -> f64 {
    let a = p.gain;
    let radicand = a * x + 0.375 * a * a + p.variance - a * p.offset;
    (2.0 / a) * radicand.max(0.0).sqrt()
}

#[inline]
fn inverse_value(y: f64, p: &TransformParameters) -> f64 {
    let a = p.gain;
    // Work in the unit-gain domain, then rescale.
    let s2 = p.variance / (a * a);
    let z = y.max(1.0);
    let sqrt_3_2 = 1.5f64.sqrt();
    let unbiased = 0.25 * z * z + 0.25 * sqrt_3_2 / z - 1.375 / (z * z)
        + 0.625 * sqrt_3_2 / (z * z * z)
        - 0.125
        - s2;
    a * unbiased.max(0.0) + p.offset
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Applies the forward transform element-wise. The output has the input's shape.
///
/// Valid parameters keep the output finite for ordinary counts, but extreme
/// magnitudes (values near `f64::MAX`, huge variances or offsets) can still
/// overflow the radicand. Such outputs are rejected rather than stored.
pub fn forward(input: &ArrayD<f64>, params: &TransformParameters) -> Result<ArrayD<f64>, PhotonError> {
    params.validate()?;
    let output = input.mapv(|x| forward_value(x, params));
    let overflowed = output.iter().filter(|y| !y.is_finite()).count();
    if overflowed > 0 {
        return Err(PhotonError::InvalidTransformParameters(format!(
            "transform is not finite for {} value(s) with gain={}, offset={}, variance={}",
            overflowed, params.gain, params.offset, params.variance
        )));
    }
    Ok(output)
}

/// Applies the unbiased inverse element-wise.
pub fn inverse(input: &ArrayD<f64>, params: &TransformParameters) -> Result<ArrayD<f64>, PhotonError> {
    params.validate()?;
    Ok(input.mapv(|y| inverse_value(y, params)))
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
