//! # Domain Types
//!
//! Core domain types for the fuel-station back office.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cash-Affecting Transactions                         │
//! │                                                                         │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐             │
//! │  │   Sale   │  │ Expense  │  │ Payment  │  │ BankDeposit │             │
//! │  │ cash +   │  │ cash -   │  │ cash +   │  │ cash -      │             │
//! │  └────┬─────┘  └────┬─────┘  └────┬─────┘  └──────┬──────┘             │
//! │       │             │ bank -      │ outstanding - │ bank +             │
//! │       ▼             ▼             ▼               ▼                    │
//! │  ┌──────────────────────┐  ┌──────────┐  ┌──────────────┐              │
//! │  │ BalanceReceipt       │  │   Bank   │  │ Counterparty │◄── Credit +  │
//! │  │ (branch, day) amount │  │ balance  │  │ outstanding  │              │
//! │  └──────────────────────┘  └──────────┘  └──────────────┘              │
//! │                                                                         │
//! │                          Fuel Inventory                                 │
//! │                                                                         │
//! │  MeterReading ──► Nozzle.opening_reading                               │
//! │        │                                                                │
//! │        ├────────► Tank.current_level   (matched by fuel type)          │
//! │        └────────► Stock.quantity       (item = fuel type)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Ids are UUID v4 strings
//! - Money is in paise, volumes in millilitres
//! - Transaction dates are UTC instants, bucketed by [`crate::day::bucket_of`]
//! - JSON field names are camelCase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::day::DayKey;
use crate::error::ValidationError;
use crate::money::Money;
use crate::volume::Volume;

// =============================================================================
// Sale
// =============================================================================

/// Volume of one fuel type sold, recorded on a [`Sale`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FuelTotal {
    pub fuel_type: String,
    pub volume: Volume,
}

/// A day's sales sheet for a branch.
///
/// Only `cash_payment` feeds the cash ledger. The other tenders and `rate`
/// (the gross sale value) are read by the daily totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub branch_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub cash_payment: Money,
    pub atm_payment: Money,
    pub paytm_payment: Money,
    pub fleet_payment: Money,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub fuel_totals: Vec<FuelTotal>,
    /// Gross value of the fuel sold.
    pub rate: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Card, wallet and fleet-card tenders combined.
    pub fn non_cash_payments(&self) -> Money {
        self.atm_payment + self.paytm_payment + self.fleet_payment
    }
}

// =============================================================================
// Expense
// =============================================================================

/// Money paid out of the branch. Optionally funded from a bank account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub branch_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    /// Set when the expense was paid from a bank account.
    pub bank_id: Option<String>,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Counterparty & Payment
// =============================================================================

/// Which side of the business a counterparty is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyKind {
    Customer,
    Supplier,
}

impl CounterpartyKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CounterpartyKind::Customer => "customer",
            CounterpartyKind::Supplier => "supplier",
        }
    }
}

impl fmt::Display for CounterpartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer or supplier with a running outstanding balance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    pub id: String,
    pub branch_id: String,
    pub kind: CounterpartyKind,
    pub name: String,
    /// Amount still owed. Credits raise it, payments lower it.
    pub outstanding_payments: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A payment received from a customer or made to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub branch_id: String,
    pub counterparty_id: String,
    pub counterparty_kind: CounterpartyKind,
    pub amount: Money,
    #[ts(as = "String")]
    pub paid_on: DateTime<Utc>,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bank & BankDeposit
// =============================================================================

/// A bank account with an independent running balance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub balance_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Cash moved from the till into a bank account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BankDeposit {
    pub id: String,
    pub branch_id: String,
    pub bank_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Credit
// =============================================================================

/// Fuel sold on account to a customer. No cash changes hands.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub id: String,
    pub branch_id: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Balance Receipt
// =============================================================================

/// Net cash movement recorded for one branch on one business day.
///
/// Created lazily by the first adjustment and never deleted. The running
/// balance of a day is the sum of a branch's rows up to and including it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReceipt {
    pub id: String,
    pub branch_id: String,
    pub day: DayKey,
    pub amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Fuel Inventory
// =============================================================================

/// An underground tank. `0 <= current_level <= capacity` holds after every commit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tank {
    pub id: String,
    pub branch_id: String,
    pub fuel_type: String,
    pub capacity: Volume,
    pub current_level: Volume,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Book stock of an item. `quantity >= 0` holds after every commit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: String,
    pub branch_id: String,
    /// Item key. Fuel stock uses the fuel type.
    pub item: String,
    pub quantity: Volume,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A dispensing nozzle. `opening_reading` is a rolling cursor, not history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Nozzle {
    pub id: String,
    pub branch_id: String,
    pub machine_id: String,
    pub fuel_type: String,
    pub opening_reading: Volume,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A committed totalizer reading. At most one per nozzle per day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub id: String,
    pub branch_id: String,
    pub nozzle_id: String,
    pub day: DayKey,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    pub fuel_type: String,
    pub opening_reading: Volume,
    pub closing_reading: Volume,
    pub difference: Volume,
    pub fuel_rate: Option<Money>,
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inputs
// =============================================================================
// Field sets accepted by the mutators. The branch always comes from the
// request context, never from the body.

/// Fields of a sale for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub cash_payment: Money,
    #[serde(default)]
    pub atm_payment: Money,
    #[serde(default)]
    pub paytm_payment: Money,
    #[serde(default)]
    pub fleet_payment: Money,
    #[serde(default)]
    pub fuel_totals: Vec<FuelTotal>,
    pub rate: Money,
}

/// Fields of an expense for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    #[serde(default)]
    pub bank_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields of a payment for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub counterparty_id: String,
    pub counterparty_kind: CounterpartyKind,
    pub amount: Money,
    #[ts(as = "String")]
    pub paid_on: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Fields of a bank deposit for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BankDepositInput {
    pub bank_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Fields of a credit sale for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreditInput {
    pub customer_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    #[serde(default)]
    pub description: Option<String>,
}

/// One line of a meter-reading batch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MeterReadingInput {
    pub nozzle_id: String,
    pub fuel_type: String,
    /// Volume sold. Must equal `closing_reading - opening_reading`.
    pub sale: Volume,
    #[serde(default)]
    pub fuel_rate: Option<Money>,
    pub total_amount: Money,
    pub opening_reading: Volume,
    pub closing_reading: Volume,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl MeterReadingInput {
    /// Volume dispensed between the two readings.
    pub fn difference(&self) -> Volume {
        self.closing_reading - self.opening_reading
    }
}

/// A batch of meter readings committed all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MeterReadingBatch {
    pub items: Vec<MeterReadingInput>,
}

impl FromStr for CounterpartyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(CounterpartyKind::Customer),
            "supplier" => Ok(CounterpartyKind::Supplier),
            _ => Err(ValidationError::InvalidFormat {
                field: "counterpartyKind".to_string(),
                reason: "must be customer or supplier".to_string(),
            }),
        }
    }
}
