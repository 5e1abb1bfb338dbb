//! # Daily Totals
//!
//! The cash summary of one branch on one business day, derived from the
//! day's transactions and the carry-forward.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cash_balance = (total_sale + carry_forward + total_payments)           │
//! │               - (total_expense + total_credit + total_non_cash)         │
//! │               - total_bank_deposits                                     │
//! │                                                                         │
//! │  total_sale     = Σ sale.rate                                           │
//! │  total_non_cash = Σ sale.(atm + paytm + fleet)                          │
//! │  total_payments = customer payments + supplier payments                 │
//! │                                                                         │
//! │  drift = cash_balance - ledger_balance                                  │
//! │  (zero when every sale's rate equals its tenders plus the day's credit) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::day::DayKey;
use crate::money::Money;
use crate::types::{BankDeposit, CounterpartyKind, Credit, Expense, Payment, Sale};

/// The same-day transactions a summary is computed from.
#[derive(Debug, Clone, Copy)]
pub struct DayActivity<'a> {
    pub sales: &'a [Sale],
    pub expenses: &'a [Expense],
    pub credits: &'a [Credit],
    pub payments: &'a [Payment],
    pub deposits: &'a [BankDeposit],
}

/// Cash summary for a branch and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub branch_id: String,
    pub day: DayKey,
    pub total_sale: Money,
    /// Sum of every balance receipt row before the day, which is the
    /// previous day's closing balance.
    pub carry_forward: Money,
    pub total_customer_payments: Money,
    pub total_supplier_payments: Money,
    pub total_expense: Money,
    pub total_credit: Money,
    pub total_non_cash: Money,
    pub total_bank_deposits: Money,
    pub cash_balance: Money,
    /// Stored closing balance of the day.
    pub ledger_balance: Money,
    pub drift: Money,
}

impl DailyTotals {
    pub fn compute(
        branch_id: &str,
        day: DayKey,
        carry_forward: Money,
        ledger_balance: Money,
        activity: &DayActivity<'_>,
    ) -> Self {
        let total_sale: Money = activity.sales.iter().map(|s| s.rate).sum();
        let total_non_cash: Money = activity.sales.iter().map(Sale::non_cash_payments).sum();
        let total_expense: Money = activity.expenses.iter().map(|e| e.amount).sum();
        let total_credit: Money = activity.credits.iter().map(|c| c.amount).sum();
        let total_bank_deposits: Money = activity.deposits.iter().map(|d| d.amount).sum();

        let payments_of = |kind: CounterpartyKind| -> Money {
            activity
                .payments
                .iter()
                .filter(|p| p.counterparty_kind == kind)
                .map(|p| p.amount)
                .sum()
        };
        let total_customer_payments = payments_of(CounterpartyKind::Customer);
        let total_supplier_payments = payments_of(CounterpartyKind::Supplier);

        let cash_balance = (total_sale
            + carry_forward
            + total_customer_payments
            + total_supplier_payments)
            - (total_expense + total_credit + total_non_cash)
            - total_bank_deposits;

        DailyTotals {
            branch_id: branch_id.to_string(),
            day,
            total_sale,
            carry_forward,
            total_customer_payments,
            total_supplier_payments,
            total_expense,
            total_credit,
            total_non_cash,
            total_bank_deposits,
            cash_balance,
            ledger_balance,
            drift: cash_balance - ledger_balance,
        }
    }
}
