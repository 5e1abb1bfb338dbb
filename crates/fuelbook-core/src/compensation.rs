//! # Compensation Planning
//!
//! Turns "old effect → new effect" into the exact increments each ledger
//! must receive. Pure: the database crate applies the plan inside the same
//! transaction as the entity write.
//!
//! ## Ledgers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ledger        Keyed by     Row                                         │
//! │  ───────────   ──────────   ─────────────────────────────────────       │
//! │  cash          DayKey       balance_receipts (branch, day).amount      │
//! │  bank          bank id      banks.balance_amount                       │
//! │  outstanding   party id     counterparties.outstanding_payments        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Protocol
//! ```text
//!   create          : +sign * new                       on key(new)
//!   delete          : -sign * old                       on key(old)
//!   update same key : +sign * (new - old)               on key   (even if 0)
//!   update moved    : -sign * old on key(old), +sign * new on key(new)
//! ```
//!
//! One planner, [`plan_deltas`], implements the protocol for all three
//! ledgers. [`LedgerPlan::for_change`] runs it for every ledger an entry kind
//! touches.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::day::{bucket_of, DayKey};
use crate::money::Money;
use crate::types::{BankDeposit, Credit, Expense, Payment, Sale};

// =============================================================================
// Sign Table
// =============================================================================

/// Direction in which an entry moves a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    #[inline]
    pub const fn factor(self) -> i64 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }

    #[inline]
    pub fn apply(self, amount: Money) -> Money {
        amount * self.factor()
    }
}

/// The kinds of entries that move a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Sale,
    Expense,
    Payment,
    BankDeposit,
    Credit,
}

impl EntryKind {
    /// Effect on the day's balance receipt.
    pub const fn cash_sign(self) -> Option<Sign> {
        match self {
            EntryKind::Sale | EntryKind::Payment => Some(Sign::Plus),
            EntryKind::Expense | EntryKind::BankDeposit => Some(Sign::Minus),
            EntryKind::Credit => None,
        }
    }

    /// Effect on a bank balance.
    pub const fn bank_sign(self) -> Option<Sign> {
        match self {
            EntryKind::BankDeposit => Some(Sign::Plus),
            EntryKind::Expense => Some(Sign::Minus),
            _ => None,
        }
    }

    /// Effect on a counterparty's outstanding balance.
    pub const fn outstanding_sign(self) -> Option<Sign> {
        match self {
            EntryKind::Credit => Some(Sign::Plus),
            EntryKind::Payment => Some(Sign::Minus),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EntryKind::Sale => "sale",
            EntryKind::Expense => "expense",
            EntryKind::Payment => "payment",
            EntryKind::BankDeposit => "bank_deposit",
            EntryKind::Credit => "credit",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Planner
// =============================================================================

/// What one entry contributes to one ledger row, before the sign is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution<K> {
    pub key: K,
    pub amount: Money,
}

impl<K> Contribution<K> {
    pub fn new(key: K, amount: Money) -> Self {
        Contribution { key, amount }
    }
}

/// A signed increment for one ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<K> {
    pub key: K,
    pub amount: Money,
}

/// Plans the increments that move a ledger from the old contribution to the new.
///
/// `None` on the old side is a create, `None` on the new side a delete. A
/// same-key update always yields exactly one delta, even a zero one.
///
/// ## Example
/// ```rust
/// use fuelbook_core::compensation::{plan_deltas, Contribution, Sign};
/// use fuelbook_core::Money;
///
/// let old = Contribution::new("2024-01-05", Money::from_paise(100));
/// let new = Contribution::new("2024-01-05", Money::from_paise(150));
///
/// let deltas = plan_deltas(Sign::Plus, Some(old), Some(new));
/// assert_eq!(deltas.len(), 1);
/// assert_eq!(deltas[0].amount, Money::from_paise(50));
/// ```
pub fn plan_deltas<K: PartialEq>(
    sign: Sign,
    old: Option<Contribution<K>>,
    new: Option<Contribution<K>>,
) -> Vec<Delta<K>> {
    match (old, new) {
        (None, None) => Vec::new(),
        (None, Some(new)) => vec![Delta {
            amount: sign.apply(new.amount),
            key: new.key,
        }],
        (Some(old), None) => vec![Delta {
            amount: -sign.apply(old.amount),
            key: old.key,
        }],
        (Some(old), Some(new)) if old.key == new.key => vec![Delta {
            amount: sign.apply(new.amount - old.amount),
            key: new.key,
        }],
        (Some(old), Some(new)) => vec![
            Delta {
                amount: -sign.apply(old.amount),
                key: old.key,
            },
            Delta {
                amount: sign.apply(new.amount),
                key: new.key,
            },
        ],
    }
}

// =============================================================================
// Ledger Entries
// =============================================================================

/// An entity whose lifecycle moves one or more ledgers.
///
/// Implementors describe their unsigned contribution per ledger; the sign
/// comes from [`LedgerEntry::KIND`].
pub trait LedgerEntry {
    const KIND: EntryKind;

    fn branch_id(&self) -> &str;

    fn cash_effect(&self) -> Option<Contribution<DayKey>> {
        None
    }

    fn bank_effect(&self) -> Option<Contribution<String>> {
        None
    }

    fn outstanding_effect(&self) -> Option<Contribution<String>> {
        None
    }
}

impl LedgerEntry for Sale {
    const KIND: EntryKind = EntryKind::Sale;

    fn branch_id(&self) -> &str {
        &self.branch_id
    }

    fn cash_effect(&self) -> Option<Contribution<DayKey>> {
        Some(Contribution::new(bucket_of(self.date), self.cash_payment))
    }
}

impl LedgerEntry for Expense {
    const KIND: EntryKind = EntryKind::Expense;

    fn branch_id(&self) -> &str {
        &self.branch_id
    }

    fn cash_effect(&self) -> Option<Contribution<DayKey>> {
        Some(Contribution::new(bucket_of(self.date), self.amount))
    }

    fn bank_effect(&self) -> Option<Contribution<String>> {
        self.bank_id
            .as_ref()
            .map(|bank_id| Contribution::new(bank_id.clone(), self.amount))
    }
}

impl LedgerEntry for Payment {
    const KIND: EntryKind = EntryKind::Payment;

    fn branch_id(&self) -> &str {
        &self.branch_id
    }

    fn cash_effect(&self) -> Option<Contribution<DayKey>> {
        Some(Contribution::new(bucket_of(self.paid_on), self.amount))
    }

    fn outstanding_effect(&self) -> Option<Contribution<String>> {
        Some(Contribution::new(self.counterparty_id.clone(), self.amount))
    }
}

impl LedgerEntry for BankDeposit {
    const KIND: EntryKind = EntryKind::BankDeposit;

    fn branch_id(&self) -> &str {
        &self.branch_id
    }

    fn cash_effect(&self) -> Option<Contribution<DayKey>> {
        Some(Contribution::new(bucket_of(self.date), self.amount))
    }

    fn bank_effect(&self) -> Option<Contribution<String>> {
        Some(Contribution::new(self.bank_id.clone(), self.amount))
    }
}

impl LedgerEntry for Credit {
    const KIND: EntryKind = EntryKind::Credit;

    fn branch_id(&self) -> &str {
        &self.branch_id
    }

    fn outstanding_effect(&self) -> Option<Contribution<String>> {
        Some(Contribution::new(self.customer_id.clone(), self.amount))
    }
}

// =============================================================================
// Ledger Plan
// =============================================================================

/// Every increment one entity change requires, across all ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPlan {
    pub kind: EntryKind,
    pub cash: Vec<Delta<DayKey>>,
    pub bank: Vec<Delta<String>>,
    pub outstanding: Vec<Delta<String>>,
}

impl LedgerPlan {
    /// Plans the change from `old` to `new` for an entry kind.
    pub fn for_change<E: LedgerEntry>(old: Option<&E>, new: Option<&E>) -> Self {
        let kind = E::KIND;

        let cash = kind
            .cash_sign()
            .map(|sign| {
                plan_deltas(
                    sign,
                    old.and_then(E::cash_effect),
                    new.and_then(E::cash_effect),
                )
            })
            .unwrap_or_default();

        let bank = kind
            .bank_sign()
            .map(|sign| {
                plan_deltas(
                    sign,
                    old.and_then(E::bank_effect),
                    new.and_then(E::bank_effect),
                )
            })
            .unwrap_or_default();

        let outstanding = kind
            .outstanding_sign()
            .map(|sign| {
                plan_deltas(
                    sign,
                    old.and_then(E::outstanding_effect),
                    new.and_then(E::outstanding_effect),
                )
            })
            .unwrap_or_default();

        LedgerPlan {
            kind,
            cash,
            bank,
            outstanding,
        }
    }

    pub fn for_create<E: LedgerEntry>(new: &E) -> Self {
        Self::for_change(None, Some(new))
    }

    pub fn for_update<E: LedgerEntry>(old: &E, new: &E) -> Self {
        Self::for_change(Some(old), Some(new))
    }

    pub fn for_delete<E: LedgerEntry>(old: &E) -> Self {
        Self::for_change(Some(old), None)
    }

    /// Net change to the cash ledger across all days.
    pub fn net_cash(&self) -> Money {
        self.cash.iter().map(|d| d.amount).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
