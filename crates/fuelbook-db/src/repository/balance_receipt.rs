//! # Balance Receipt Repository
//!
//! The per-branch, per-day cash ledger.
//!
//! ## Row Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balance_receipts (branch_id, day) UNIQUE                              │
//! │                                                                         │
//! │  day          amount (net cash movement of the day)                    │
//! │  ──────────   ──────                                                    │
//! │  2024-01-04    1500        carry_forward(01-05)   = 1500                │
//! │  2024-01-05    -200        closing_balance(01-05) = 1300                │
//! │  2024-01-06       0        (last entry deleted, row kept at zero)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are created by the first [`tx_adjust`] for a day and are never
//! deleted. The store does not know why an adjustment happened.

use chrono::Utc;
use fuelbook_core::{BalanceReceipt, DayKey, Money};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Read access to balance receipts.
#[derive(Debug, Clone)]
pub struct BalanceReceiptRepository {
    pool: SqlitePool,
}

impl BalanceReceiptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BalanceReceiptRepository { pool }
    }

    /// Gets the row for a branch and day, if any adjustment has touched it.
    pub async fn get(&self, branch_id: &str, day: DayKey) -> DbResult<Option<BalanceReceipt>> {
        let mut conn = self.pool.acquire().await?;
        find(&mut conn, branch_id, day).await
    }

    /// The stored amount for a day, zero when no row exists.
    pub async fn amount(&self, branch_id: &str, day: DayKey) -> DbResult<Money> {
        Ok(self
            .get(branch_id, day)
            .await?
            .map(|r| r.amount)
            .unwrap_or_default())
    }

    /// Sum of every day strictly before `day`.
    pub async fn carry_forward(&self, branch_id: &str, day: DayKey) -> DbResult<Money> {
        let mut conn = self.pool.acquire().await?;
        carry_forward(&mut conn, branch_id, day).await
    }

    /// Sum of every day up to and including `day`.
    pub async fn closing_balance(&self, branch_id: &str, day: DayKey) -> DbResult<Money> {
        let mut conn = self.pool.acquire().await?;
        closing_balance(&mut conn, branch_id, day).await
    }

    /// All rows of a branch, oldest first.
    pub async fn list_for_branch(&self, branch_id: &str) -> DbResult<Vec<BalanceReceipt>> {
        let rows = sqlx::query_as::<_, BalanceReceipt>(
            r#"
            SELECT id, branch_id, day, amount, created_at, updated_at
            FROM balance_receipts
            WHERE branch_id = ?1
            ORDER BY day
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

pub(crate) async fn find(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Option<BalanceReceipt>> {
    let row = sqlx::query_as::<_, BalanceReceipt>(
        r#"
        SELECT id, branch_id, day, amount, created_at, updated_at
        FROM balance_receipts
        WHERE branch_id = ?1 AND day = ?2
        "#,
    )
    .bind(branch_id)
    .bind(day)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

pub(crate) async fn carry_forward(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Money> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM balance_receipts WHERE branch_id = ?1 AND day < ?2",
    )
    .bind(branch_id)
    .bind(day)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Money::from_paise(total))
}

pub(crate) async fn closing_balance(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Money> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM balance_receipts WHERE branch_id = ?1 AND day <= ?2",
    )
    .bind(branch_id)
    .bind(day)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Money::from_paise(total))
}

/// Adds `delta` to the row for a branch and day, creating it if absent.
///
/// One statement, so the read-modify-write cannot interleave with another
/// writer. Must run on the caller's transaction.
pub async fn tx_adjust(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
    delta: Money,
) -> DbResult<BalanceReceipt> {
    let now = Utc::now();

    let receipt = sqlx::query_as::<_, BalanceReceipt>(
        r#"
        INSERT INTO balance_receipts (id, branch_id, day, amount, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT (branch_id, day) DO UPDATE SET
            amount = balance_receipts.amount + excluded.amount,
            updated_at = excluded.updated_at
        RETURNING id, branch_id, day, amount, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(branch_id)
    .bind(day)
    .bind(delta)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    debug!(
        branch_id = %branch_id,
        day = %day,
        delta = %delta,
        amount = %receipt.amount,
        "Balance receipt adjusted"
    );

    Ok(receipt)
}

// =============================================================================
// Unit Tests
// =============================================================================
