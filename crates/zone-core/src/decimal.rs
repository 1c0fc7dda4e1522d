//! Precision-safe price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Zone boundaries, stop
//! levels and P&L are all compared for equality, so floating point is never
//! acceptable here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Used for both index levels and option premiums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Shift the price by a signed number of points.
    #[inline]
    pub fn offset(&self, points: Decimal) -> Self {
        Self(self.0 + points)
    }

    /// Round to the nearest multiple of `tick_size`.
    #[inline]
    pub fn round_to_tick(&self, tick_size: Decimal) -> Self {
        if tick_size.is_zero() {
            return *self;
        }
        Self((self.0 / tick_size).round() * tick_size)
    }

    /// Absolute distance to another price in points.
    #[inline]
    pub fn distance(&self, other: Price) -> Decimal {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_offset() {
        let p = Price::new(dec!(25000));
        assert_eq!(p.offset(dec!(2.5)), Price::new(dec!(25002.5)));
        assert_eq!(p.offset(dec!(-2.5)), Price::new(dec!(24997.5)));
    }

    #[test]
    fn test_round_to_tick() {
        let p = Price::new(dec!(51.03));
        assert_eq!(p.round_to_tick(dec!(0.05)), Price::new(dec!(51.05)));

        let p = Price::new(dec!(51.01));
        assert_eq!(p.round_to_tick(dec!(0.05)), Price::new(dec!(51.00)));

        // Zero tick leaves the price untouched
        assert_eq!(p.round_to_tick(Decimal::ZERO), p);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Price::new(dec!(25000.4));
        let b = Price::new(dec!(25000));
        assert_eq!(a.distance(b), dec!(0.4));
        assert_eq!(b.distance(a), dec!(0.4));
    }

    #[test]
    fn test_price_parse() {
        let p: Price = "48.5".parse().unwrap();
        assert_eq!(p.inner(), dec!(48.5));
        assert!(p.is_positive());
        assert!(!Price::ZERO.is_positive());
    }
}
