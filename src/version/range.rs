//! Interval-notation version ranges.
//!
//! Core compatibility constraints are declared as Maven-style intervals:
//! `[1.0.0,2.0.0)` means "at least 1.0.0, below 2.0.0". `[`/`]` are
//! inclusive bounds, `(`/`)` exclusive. A range that does not parse is
//! treated as never compatible, not as an error.

use std::cmp::Ordering;

use super::{VersionError, compare};

/// A parsed version interval with explicit bound inclusivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: String,
    upper: String,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl VersionRange {
    /// Parse an interval-notation range.
    ///
    /// Returns `None` for malformed input: empty or too-short strings, or
    /// anything that does not split into exactly two non-empty bounds.
    pub fn parse(range: &str) -> Option<VersionRange> {
        if range.len() < 3 {
            return None;
        }

        let lower_inclusive = range.starts_with('[');
        let upper_inclusive = range.ends_with(']');

        let inner = range.get(1..range.len() - 1)?;
        let mut parts = inner.split(',');
        let lower = parts.next()?.trim();
        let upper = parts.next()?.trim();
        if parts.next().is_some() || lower.is_empty() || upper.is_empty() {
            return None;
        }

        Some(VersionRange {
            lower: lower.to_string(),
            upper: upper.to_string(),
            lower_inclusive,
            upper_inclusive,
        })
    }

    /// Check whether `candidate` falls within this range.
    ///
    /// Propagates comparator errors, e.g. a non-numeric candidate or bound.
    pub fn contains(&self, candidate: &str) -> Result<bool, VersionError> {
        let lower_cmp = compare(candidate, &self.lower)?;
        let upper_cmp = compare(candidate, &self.upper)?;

        let above_lower = if self.lower_inclusive {
            lower_cmp != Ordering::Less
        } else {
            lower_cmp == Ordering::Greater
        };
        let below_upper = if self.upper_inclusive {
            upper_cmp != Ordering::Greater
        } else {
            upper_cmp == Ordering::Less
        };

        Ok(above_lower && below_upper)
    }

    /// Lower bound version string.
    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// Upper bound version string.
    pub fn upper(&self) -> &str {
        &self.upper
    }
}

/// Boolean convenience: does `range` allow `candidate`?
///
/// Malformed ranges and comparison failures both map to `false`.
pub fn range_allows(range: &str, candidate: &str) -> bool {
    match VersionRange::parse(range) {
        Some(parsed) => parsed.contains(candidate).unwrap_or(false),
        None => false,
    }
}
