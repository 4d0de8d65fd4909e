//! Version comparison for package versions.
//!
//! Package versions are dot-separated sequences of non-negative integers
//! ("1.0.3", "24.2"). Comparison is numeric per segment, so "1.10.0" is
//! newer than "1.2.0". The special `RELEASE` sentinel never goes through
//! this comparator; conflict resolution handles it before comparing.

mod range;

pub use range::{VersionRange, range_allows};

use std::cmp::Ordering;

/// Version string meaning "always the newest available". It wins any
/// conflict and must be filtered out before numeric comparison.
pub const RELEASE: &str = "RELEASE";

/// Error raised when a version segment is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version segment '{segment}' in '{version}'")]
    InvalidSegment { segment: String, version: String },
}

/// Compare two dot-segmented numeric versions.
///
/// The shorter version is padded with zero segments, so "1.0" equals
/// "1.0.0". Returns an error if any segment is not a non-negative integer;
/// callers must special-case the [`RELEASE`] sentinel before calling.
pub fn compare(v1: &str, v2: &str) -> Result<Ordering, VersionError> {
    let parts1 = parse_segments(v1)?;
    let parts2 = parse_segments(v2)?;

    let len = parts1.len().max(parts2.len());
    for i in 0..len {
        let a = parts1.get(i).copied().unwrap_or(0);
        let b = parts2.get(i).copied().unwrap_or(0);
        match a.cmp(&b) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

/// Parse a version into its numeric segments, failing on the first segment
/// that is not a non-negative integer.
pub fn parse_segments(version: &str) -> Result<Vec<u64>, VersionError> {
    version
        .split('.')
        .map(|segment| {
            segment
                .parse::<u64>()
                .map_err(|_| VersionError::InvalidSegment {
                    segment: segment.to_string(),
                    version: version.to_string(),
                })
        })
        .collect()
}

/// True if `version` is the [`RELEASE`] sentinel.
pub fn is_release(version: &str) -> bool {
    version == RELEASE
}
