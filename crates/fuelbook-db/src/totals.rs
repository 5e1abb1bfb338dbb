//! # Daily Totals Aggregator
//!
//! Builds the daily report: the day's raw transactions plus the cash
//! summary derived from them. Read-only.
//!
//! All reads run in one transaction so the lists, the carry-forward and the
//! stored closing balance come from the same snapshot.

use fuelbook_core::{
    BankDeposit, Credit, DailyTotals, DayActivity, DayKey, Expense, Payment, RequestContext, Sale,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{balance_receipt, bank_deposit, credit, expense, payment, sale};

/// One branch's day, as served by the report endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub totals: DailyTotals,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
    pub credits: Vec<Credit>,
    pub payments: Vec<Payment>,
    pub deposits: Vec<BankDeposit>,
}

#[derive(Debug, Clone)]
pub struct DailyTotalsAggregator {
    pool: SqlitePool,
}

impl DailyTotalsAggregator {
    pub fn new(pool: SqlitePool) -> Self {
        DailyTotalsAggregator { pool }
    }

    /// Report for `day` in `branch_id`, or the caller's own branch.
    ///
    /// A branch the caller cannot access is reported as NotFound.
    pub async fn daily_report(
        &self,
        ctx: &RequestContext,
        branch_id: Option<&str>,
        day: DayKey,
    ) -> DbResult<DailyReport> {
        let branch_id = branch_id.unwrap_or(&ctx.branch_id);
        if !ctx.can_access(branch_id) {
            return Err(DbError::not_found("Branch", branch_id));
        }

        let mut tx = self.pool.begin().await?;
        let sales = sale::list_for_day(&mut tx, branch_id, day).await?;
        let expenses = expense::list_for_day(&mut tx, branch_id, day).await?;
        let credits = credit::list_for_day(&mut tx, branch_id, day).await?;
        let payments = payment::list_for_day(&mut tx, branch_id, day).await?;
        let deposits = bank_deposit::list_for_day(&mut tx, branch_id, day).await?;
        let carry_forward = balance_receipt::carry_forward(&mut tx, branch_id, day).await?;
        let ledger_balance = balance_receipt::closing_balance(&mut tx, branch_id, day).await?;
        tx.rollback().await?;

        let activity = DayActivity {
            sales: &sales,
            expenses: &expenses,
            credits: &credits,
            payments: &payments,
            deposits: &deposits,
        };
        let totals = DailyTotals::compute(branch_id, day, carry_forward, ledger_balance, &activity);

        if totals.drift.is_zero() {
            debug!(branch_id, day = %day, cash_balance = %totals.cash_balance, "Daily totals computed");
        } else {
            // Sales whose rate differs from their tenders plus credit show up here.
            warn!(
                branch_id,
                day = %day,
                cash_balance = %totals.cash_balance,
                ledger_balance = %totals.ledger_balance,
                drift = %totals.drift,
                "Daily totals drift from ledger"
            );
        }

        Ok(DailyReport {
            totals,
            sales,
            expenses,
            credits,
            payments,
            deposits,
        })
    }
}
