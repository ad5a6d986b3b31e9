//! Percentile bucketing
//!
//! A domain's raw total (0 to 12 points) maps onto six display buckets.

use lpa_bank::Points;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Bucket upper bounds (inclusive, in whole points) and their percentile
const BUCKETS: [(u32, u8); 5] = [(2, 25), (4, 40), (6, 55), (8, 70), (10, 85)];

/// Percentile reported for totals above the last bucket
const TOP: u8 = 95;

/// Display percentile (25 to 95)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentile(u8);

impl Percentile {
    /// Percentile used by reports when none was computed
    pub const DEFAULT: Self = Self(70);

    /// Create from a raw value, clamped to 0..=100
    #[inline]
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Get the value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Percentile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for Percentile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map a raw domain total to its percentile bucket
///
/// Monotonic non-decreasing; anything above 10 points (including totals
/// beyond the 12 point design range) reports 95.
#[must_use]
pub fn percentile_for(raw: Points) -> Percentile {
    let hundredths = raw.hundredths();
    BUCKETS
        .iter()
        .find(|(bound, _)| hundredths <= bound * 100)
        .map_or(Percentile(TOP), |(_, pct)| Percentile(*pct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        let cases = [
            (0, 25),
            (200, 25),
            (201, 40),
            (400, 40),
            (600, 55),
            (800, 70),
            (1000, 85),
            (1001, 95),
            (1200, 95),
            (5000, 95),
        ];
        for (hundredths, expected) in cases {
            assert_eq!(
                percentile_for(Points::from_hundredths(hundredths)).get(),
                expected,
                "raw {hundredths}"
            );
        }
    }

    #[test]
    fn new_clamps() {
        assert_eq!(Percentile::new(150).get(), 100);
        assert_eq!(Percentile::default().get(), 70);
    }
}
