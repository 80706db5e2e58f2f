//! Host-facing value types.
//!
//! A host field hands the codec a [`CellValue`]. Only `CellValue::Array` is
//! array-like; everything else is rejected by the validator. [`PhotonArray`]
//! carries the movie itself as a dynamically-dimensioned `ndarray` of one of the
//! supported element types.

use ndarray::ArrayD;
use num_traits::{AsPrimitive, Zero};

use crate::types::ElementType;

/// An n-dimensional movie, typed by its element type.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotonArray {
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    UInt16(ArrayD<u16>),
    UInt32(ArrayD<u32>),
    UInt64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    /// An array of opaque host objects. Never accepted for encoding.
    Object(ArrayD<serde_json::Value>),
}

/// Applies `$body` to the inner array of every numeric variant, and `$obj_body`
/// to the object variant.
macro_rules! dispatch_array {
    ($value:expr, $arr:ident => $body:expr, $obj:ident => $obj_body:expr) => {
        match $value {
            PhotonArray::Int8($arr) => $body,
            PhotonArray::Int16($arr) => $body,
            PhotonArray::Int32($arr) => $body,
            PhotonArray::Int64($arr) => $body,
            PhotonArray::UInt8($arr) => $body,
            PhotonArray::UInt16($arr) => $body,
            PhotonArray::UInt32($arr) => $body,
            PhotonArray::UInt64($arr) => $body,
            PhotonArray::Float32($arr) => $body,
            PhotonArray::Float64($arr) => $body,
            PhotonArray::Object($obj) => $obj_body,
        }
    };
}

impl PhotonArray {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int8(_) => ElementType::Int8,
            Self::Int16(_) => ElementType::Int16,
            Self::Int32(_) => ElementType::Int32,
            Self::Int64(_) => ElementType::Int64,
            Self::UInt8(_) => ElementType::UInt8,
            Self::UInt16(_) => ElementType::UInt16,
            Self::UInt32(_) => ElementType::UInt32,
            Self::UInt64(_) => ElementType::UInt64,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
            Self::Object(_) => ElementType::Object,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch_array!(self, a => a.shape(), o => o.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        dispatch_array!(self, a => a.len(), o => o.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements strictly below zero. Object arrays report zero.
    pub fn count_negative(&self) -> usize {
        dispatch_array!(self, a => count_below_zero(a), _o => 0)
    }

    /// Number of NaN or infinite elements. Integer arrays always report zero.
    pub fn count_non_finite(&self) -> usize {
        match self {
            Self::Float32(a) => a.iter().filter(|v| !v.is_finite()).count(),
            Self::Float64(a) => a.iter().filter(|v| !v.is_finite()).count(),
            _ => 0,
        }
    }

    /// Widens every element to `f64`, preserving shape. `None` for object arrays.
    pub(crate) fn to_f64(&self) -> Option<ArrayD<f64>> {
        dispatch_array!(self, a => Some(widen(a)), _o => None)
    }
}

fn count_below_zero<T>(array: &ArrayD<T>) -> usize
where
    T: Copy + PartialOrd + Zero,
{
    array.iter().filter(|&&v| v < T::zero()).count()
}

fn widen<T>(array: &ArrayD<T>) -> ArrayD<f64>
where
    T: Copy + AsPrimitive<f64>,
{
    array.mapv(|v| AsPrimitive::<f64>::as_(v))
}

macro_rules! impl_from_array {
    ($($native:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<ArrayD<$native>> for PhotonArray {
                fn from(array: ArrayD<$native>) -> Self {
                    PhotonArray::$variant(array)
                }
            }

            impl From<ArrayD<$native>> for CellValue {
                fn from(array: ArrayD<$native>) -> Self {
                    CellValue::Array(PhotonArray::$variant(array))
                }
            }
        )+
    };
}

impl_from_array!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    serde_json::Value => Object,
);

/// A single field value as supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(PhotonArray),
}

impl CellValue {
    /// A short, human-readable name for the kind of value, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "ndarray",
        }
    }

    pub fn as_array(&self) -> Option<&PhotonArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<PhotonArray> for CellValue {
    fn from(array: PhotonArray) -> Self {
        CellValue::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_counts_negative_and_non_finite() {
        let ints = ArrayD::from_shape_vec(IxDyn(&[1, 2, 2]), vec![0i16, -1, 3, -4]).unwrap();
        assert_eq!(PhotonArray::from(ints).count_negative(), 2);

        let floats =
            ArrayD::from_shape_vec(IxDyn(&[1, 1, 3]), vec![1.0f32, f32::NAN, f32::INFINITY])
                .unwrap();
        let floats = PhotonArray::from(floats);
        assert_eq!(floats.count_negative(), 0);
        assert_eq!(floats.count_non_finite(), 2);
    }

    #[test]
    fn test_widen_preserves_shape_and_values() {
        let counts = ArrayD::from_shape_vec(IxDyn(&[2, 1, 2]), vec![0u16, 1, 2, 65535]).unwrap();
        let widened = PhotonArray::from(counts).to_f64().unwrap();
        assert_eq!(widened.shape(), &[2, 1, 2]);
        assert_eq!(widened.iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0, 65535.0]);
    }

    #[test]
    fn test_object_array_has_no_numeric_view() {
        let objects = ArrayD::from_elem(IxDyn(&[1, 1, 1]), serde_json::Value::Null);
        let array = PhotonArray::from(objects);
        assert_eq!(array.element_type(), ElementType::Object);
        assert!(array.to_f64().is_none());
    }
}
