//! # Volume Module
//!
//! Fuel quantities as an integer count of millilitres.
//!
//! Meter readings, tank levels and stock quantities all use `Volume`, so the
//! difference of two readings can be subtracted from a tank without any unit
//! conversion or rounding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// A fuel volume in millilitres.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Volume(i64);

impl Volume {
    #[inline]
    pub const fn from_ml(ml: i64) -> Self {
        Volume(ml)
    }

    #[inline]
    pub const fn from_litres(litres: i64) -> Self {
        Volume(litres * 1000)
    }

    /// Returns the value in millilitres.
    #[inline]
    pub const fn ml(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Volume(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Volume)
    }
}

/// Prints litres with three decimals (`1520.500 L`).
impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:03} L", sign, abs / 1000, abs % 1000)
    }
}

impl Add for Volume {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Volume(self.0 + other.0)
    }
}

impl AddAssign for Volume {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Volume {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Volume(self.0 - other.0)
    }
}

impl SubAssign for Volume {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Volume {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Volume(-self.0)
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Self {
        iter.fold(Volume::zero(), Add::add)
    }
}
