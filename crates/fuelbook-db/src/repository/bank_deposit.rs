//! # Bank Deposit Repository
//!
//! Storage for till-to-bank deposits. Writes run inside ledger units of
//! work only.

use fuelbook_core::{range_of, BankDeposit, DayKey};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Read access to bank deposits.
#[derive(Debug, Clone)]
pub struct BankDepositRepository {
    pool: SqlitePool,
}

impl BankDepositRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BankDepositRepository { pool }
    }

    /// Gets a deposit by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BankDeposit>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Lists a branch's deposits on one business day.
    pub async fn list_for_day(&self, branch_id: &str, day: DayKey) -> DbResult<Vec<BankDeposit>> {
        let mut conn = self.pool.acquire().await?;
        list_for_day(&mut conn, branch_id, day).await
    }
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<BankDeposit>> {
    let deposit = sqlx::query_as::<_, BankDeposit>(
        r#"
        SELECT id, branch_id, bank_id, date, amount, reference, created_at, updated_at
        FROM bank_deposits
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(deposit)
}

pub(crate) async fn list_for_day(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Vec<BankDeposit>> {
    let (start, end) = range_of(day);

    let deposits = sqlx::query_as::<_, BankDeposit>(
        r#"
        SELECT id, branch_id, bank_id, date, amount, reference, created_at, updated_at
        FROM bank_deposits
        WHERE branch_id = ?1 AND date >= ?2 AND date < ?3
        ORDER BY date, created_at
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(deposits)
}

pub(crate) async fn tx_insert(conn: &mut SqliteConnection, deposit: &BankDeposit) -> DbResult<()> {
    debug!(id = %deposit.id, bank_id = %deposit.bank_id, "Inserting bank deposit");

    sqlx::query(
        r#"
        INSERT INTO bank_deposits (
            id, branch_id, bank_id, date, amount, reference, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&deposit.id)
    .bind(&deposit.branch_id)
    .bind(&deposit.bank_id)
    .bind(deposit.date)
    .bind(deposit.amount)
    .bind(&deposit.reference)
    .bind(deposit.created_at)
    .bind(deposit.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn tx_update(conn: &mut SqliteConnection, deposit: &BankDeposit) -> DbResult<()> {
    debug!(id = %deposit.id, "Updating bank deposit");

    let result = sqlx::query(
        r#"
        UPDATE bank_deposits SET
            bank_id = ?2,
            date = ?3,
            amount = ?4,
            reference = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&deposit.id)
    .bind(&deposit.bank_id)
    .bind(deposit.date)
    .bind(deposit.amount)
    .bind(&deposit.reference)
    .bind(deposit.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("BankDeposit", &deposit.id));
    }

    Ok(())
}

pub(crate) async fn tx_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting bank deposit");

    let result = sqlx::query("DELETE FROM bank_deposits WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("BankDeposit", id));
    }

    Ok(())
}
