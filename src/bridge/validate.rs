//! Input validation run before any I/O or transform.

use crate::error::{PhotonError, ValidationError};
use crate::types::CellValue;

/// The minimum number of axes: time, height, width.
pub const MIN_DIMENSIONS: usize = 3;

/// Checks that `value` is a movie the codec can store.
///
/// The checks run cheapest first, so a 2-D object array reports the element
/// type rather than the dimensionality.
pub fn validate(value: &CellValue) -> Result<(), PhotonError> {
    let array = value.as_array().ok_or_else(|| ValidationError::NotAnArray {
        found: value.kind_name().to_string(),
    })?;

    let element_type = array.element_type();
    if !element_type.is_numeric() {
        return Err(ValidationError::UnsupportedElementType(element_type).into());
    }

    if array.ndim() < MIN_DIMENSIONS {
        return Err(ValidationError::InsufficientDimensions { ndim: array.ndim() }.into());
    }

    if array.shape().contains(&0) {
        return Err(ValidationError::EmptyArray {
            shape: array.shape().to_vec(),
        }
        .into());
    }

    let negative = array.count_negative();
    if negative > 0 {
        return Err(ValidationError::NegativeValues { count: negative }.into());
    }

    if element_type.is_float() {
        let non_finite = array.count_non_finite();
        if non_finite > 0 {
            return Err(ValidationError::NonFiniteValues { count: non_finite }.into());
        }
    }

    Ok(())
}
