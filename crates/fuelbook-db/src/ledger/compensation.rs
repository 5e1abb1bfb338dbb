//! Applies a [`LedgerPlan`] on an open transaction.
//!
//! Planning is pure and lives in `fuelbook_core::compensation`; this module
//! only turns each planned delta into a single-row increment.

use fuelbook_core::LedgerPlan;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{balance_receipt, bank, counterparty};

/// Applies every delta of `plan` for `branch_id`.
///
/// Cash deltas lazily create the day's balance receipt. Bank and
/// counterparty deltas require an existing row in the same branch and fail
/// with NotFound otherwise, which aborts the caller's unit of work.
pub(crate) async fn apply_plan(
    conn: &mut SqliteConnection,
    branch_id: &str,
    plan: &LedgerPlan,
) -> DbResult<()> {
    for delta in &plan.cash {
        debug!(kind = %plan.kind, branch_id, day = %delta.key, delta = %delta.amount, "Cash adjustment");
        balance_receipt::tx_adjust(conn, branch_id, delta.key, delta.amount).await?;
    }

    for delta in &plan.bank {
        debug!(kind = %plan.kind, bank_id = %delta.key, delta = %delta.amount, "Bank adjustment");
        bank::tx_adjust_balance(conn, branch_id, &delta.key, delta.amount).await?;
    }

    for delta in &plan.outstanding {
        debug!(
            kind = %plan.kind,
            counterparty_id = %delta.key,
            delta = %delta.amount,
            "Outstanding adjustment"
        );
        counterparty::tx_adjust_outstanding(conn, branch_id, &delta.key, delta.amount).await?;
    }

    Ok(())
}
