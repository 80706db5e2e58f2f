//! This module defines the canonical, type-safe representation of element types
//! accepted by the photon codec and recorded on stored artifacts.

use crate::error::PhotonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The element type of an input movie.
///
/// `Object` stands for host arrays holding opaque values; it exists so that the
/// validator can reject them by name rather than by failing to convert.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Object,
}

impl ElementType {
    /// Returns `true` if the element type is a signed integer.
    pub fn is_signed_int(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns `true` if the element type is a floating-point number.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns `true` if the element type is a concrete numeric type.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Object)
    }

    /// The canonical (numpy-compatible) name, as written to `original_dtype`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Object => "object",
        }
    }
}

/// Provides the canonical string representation for an `ElementType`.
impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Part of the persisted contract: these names end up in `.zattrs`.
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = PhotonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "object" => Ok(Self::Object),
            other => Err(PhotonError::ArtifactFormat(format!(
                "Unknown element type '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for dtype in [
            ElementType::UInt8,
            ElementType::UInt16,
            ElementType::Int32,
            ElementType::Float32,
            ElementType::Float64,
        ] {
            assert_eq!(dtype.to_string().parse::<ElementType>().unwrap(), dtype);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(matches!(
            "complex128".parse::<ElementType>(),
            Err(PhotonError::ArtifactFormat(_))
        ));
    }

    #[test]
    fn test_object_is_not_numeric() {
        assert!(!ElementType::Object.is_numeric());
        assert!(ElementType::UInt16.is_numeric());
        assert!(ElementType::Int16.is_signed_int());
        assert!(ElementType::Float32.is_float());
    }
}
