//! Fixed-point answer weights
//!
//! Provides [`Points`], the unit every answer option awards. Weights are
//! small positive rationals (typically 0.5 to 3) stored as hundredths so
//! summation is exact, associative and commutative.

use crate::error::BankError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Number of stored units per whole point
const SCALE: u32 = 100;

/// A non-negative weight with hundredth precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Points(u32);

impl Points {
    /// Zero points
    pub const ZERO: Self = Self(0);

    /// Create from raw hundredths
    #[inline]
    #[must_use]
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// Create from a whole number of points
    #[inline]
    #[must_use]
    pub const fn whole(points: u32) -> Self {
        Self(points * SCALE)
    }

    /// Raw hundredths
    #[inline]
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Check for zero
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Lossy conversion for display and serialization
    #[inline]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(SCALE)
    }

    /// Parse from a floating point weight, rounding to the nearest hundredth
    ///
    /// # Errors
    /// Returns [`BankError::InvalidWeight`] for negative, non-finite or
    /// out-of-range values.
    pub fn from_f64(value: f64) -> Result<Self, BankError> {
        if !value.is_finite() || value < 0.0 {
            return Err(BankError::InvalidWeight(value));
        }
        let scaled = (value * f64::from(SCALE)).round();
        if scaled > f64::from(u32::MAX) {
            return Err(BankError::InvalidWeight(value));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(scaled as u32))
    }
}

impl TryFrom<f64> for Points {
    type Error = BankError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl From<Points> for f64 {
    fn from(points: Points) -> Self {
        points.as_f64()
    }
}

impl Add for Points {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Points> for Points {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        match frac {
            0 => write!(f, "{whole}"),
            f_ if f_ % 10 == 0 => write!(f, "{whole}.{}", f_ / 10),
            _ => write!(f, "{whole}.{frac:02}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_from_f64_rounds_to_hundredths() {
        assert_eq!(Points::from_f64(0.5).unwrap(), Points::from_hundredths(50));
        assert_eq!(Points::from_f64(1.0).unwrap(), Points::whole(1));
        assert_eq!(Points::from_f64(0.333).unwrap(), Points::from_hundredths(33));
    }

    #[test]
    fn points_rejects_negative_and_nan() {
        assert!(Points::from_f64(-0.5).is_err());
        assert!(Points::from_f64(f64::NAN).is_err());
        assert!(Points::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn points_sum_is_exact() {
        let halves = vec![Points::from_hundredths(50); 7];
        let total: Points = halves.iter().sum();
        assert_eq!(total, Points::from_hundredths(350));
        assert!((total.as_f64() - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn points_display() {
        assert_eq!(Points::whole(2).to_string(), "2");
        assert_eq!(Points::from_hundredths(150).to_string(), "1.5");
        assert_eq!(Points::from_hundredths(125).to_string(), "1.25");
        assert_eq!(Points::from_hundredths(5).to_string(), "0.05");
    }

    #[test]
    fn points_serde_as_number() {
        let json = serde_json::to_string(&Points::from_hundredths(150)).unwrap();
        assert_eq!(json, "1.5");
        let back: Points = serde_json::from_str("0.5").unwrap();
        assert_eq!(back, Points::from_hundredths(50));
        assert!(serde_json::from_str::<Points>("-1").is_err());
    }
}
