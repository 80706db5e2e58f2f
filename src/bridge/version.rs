//! The format-version gate applied on every decode.
//!
//! Versions are `MAJOR.MINOR`. A reader accepts any artifact whose major version
//! equals the major of its own baseline; minor bumps are additive.

use std::fmt;
use std::str::FromStr;

use crate::error::PhotonError;

/// A parsed `MAJOR.MINOR` format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    pub fn parse(s: &str) -> Result<Self, PhotonError> {
        let malformed = || PhotonError::ArtifactFormat(format!("malformed format version '{}'", s));
        let (major, minor) = s.trim().split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }
}

impl FromStr for FormatVersion {
    type Err = PhotonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Where the version used for the gate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    Artifact,
    Record,
    Baseline,
}

/// Picks the version to check: the artifact's own attribute, then the host's
/// record, then the reader's baseline.
pub fn resolve_version<'a>(
    artifact: Option<&'a str>,
    record: Option<&'a str>,
    baseline: &'a str,
) -> (&'a str, VersionSource) {
    match (artifact, record) {
        (Some(v), _) => (v, VersionSource::Artifact),
        (None, Some(v)) => (v, VersionSource::Record),
        (None, None) => (baseline, VersionSource::Baseline),
    }
}

/// The leading numeric component of a `MAJOR.<anything>` version string.
///
/// Only the major number takes part in the gate, so `"1.0.0"` and `"1.0-rc1"`
/// both read as major 1. A string without a `.` has no major.
pub fn major_of(version: &str) -> Option<u32> {
    let (major, _) = version.trim().split_once('.')?;
    major.parse().ok()
}

/// Fails with `UnsupportedVersion` unless `found` shares `baseline`'s major
/// version. A `found` without a readable major is unsupported too.
pub fn check_compatible(found: &str, baseline: &str) -> Result<(), PhotonError> {
    let supported = FormatVersion::parse(baseline)?;
    match major_of(found) {
        Some(major) if major == supported.major => Ok(()),
        _ => Err(PhotonError::UnsupportedVersion {
            found: found.to_string(),
            supported: supported.major.to_string(),
        }),
    }
}
