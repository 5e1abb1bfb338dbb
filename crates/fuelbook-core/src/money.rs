//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A day's ledger is the sum of hundreds of small adjustments:            │
//! │    +1520.50  -310.25  +89.10  -1520.50  ...                             │
//! │                                                                         │
//! │  With f64 the reversal of an edit (+X then -X) can leave residue        │
//! │  like 0.00000000001 in the balance receipt. That residue is drift.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    152050 - 152050 = 0, always.                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fuelbook_core::money::Money;
//!
//! let cash = Money::from_paise(152050); // ₹1520.50
//! let total = cash + Money::from_rupees(10); // ₹1530.50
//! assert_eq!(total.paise(), 153050);
//! assert_eq!((cash - cash).paise(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: Ledger deltas are negative as often as positive
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Newtype in SQL and JSON**: Stored and serialized as the raw paise count
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sale.cash_payment ──┐                                                  │
/// │  Expense.amount ─────┼──► compensation delta ──► BalanceReceipt.amount │
/// │  Payment.amount ─────┤                                                  │
/// │  BankDeposit.amount ─┘                                                  │
/// │                                                                         │
/// │  Bank.balance_amount, Counterparty.outstanding_payments                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use fuelbook_core::money::Money;
    ///
    /// let amount = Money::from_paise(1099); // ₹10.99
    /// assert_eq!(amount.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display (`₹1520.50`). UI formatting belongs to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a ledger sign (+1 / -1) or a count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i64) -> Self {
        Money(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(152050).to_string(), "₹1520.50");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupees(10);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((-a).paise(), -1000);
        assert_eq!((a * -1).paise(), -1000);
    }

    /// Reversing an adjustment must leave no residue.
    #[test]
    fn test_reversal_has_no_drift() {
        let mut balance = Money::zero();
        for paise in [152050, 31025, 8910, 1] {
            balance += Money::from_paise(paise);
            balance -= Money::from_paise(paise);
        }
        assert!(balance.is_zero());
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_paise(100), Money::from_paise(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.paise(), 350);
    }

    #[test]
    fn test_serializes_as_raw_paise() {
        let json = serde_json::to_string(&Money::from_paise(1234)).unwrap();
        assert_eq!(json, "1234");
        let back: Money = serde_json::from_str("-5").unwrap();
        assert_eq!(back, Money::from_paise(-5));
    }
}
