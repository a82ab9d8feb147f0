//! Inclusive candidate range.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Validated inclusive range of candidate ports.
///
/// Bounds are kept as `u64` so that values above 65535 reach the address
/// parser and fail there as resolution errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    from: u64,
    to: u64,
}

impl PortRange {
    /// Create a range, rejecting `from > to`.
    pub fn new(from: u64, to: u64) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Number of candidates, saturating at `u64::MAX` for `0..=u64::MAX`.
    pub(crate) fn len(&self) -> u64 {
        (self.to - self.from).saturating_add(1)
    }

    /// Candidates in ascending order.
    pub fn iter(&self) -> RangeInclusive<u64> {
        self.from..=self.to
    }
}

impl IntoIterator for PortRange {
    type Item = u64;
    type IntoIter = RangeInclusive<u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}
