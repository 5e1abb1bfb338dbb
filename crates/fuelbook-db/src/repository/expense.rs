//! # Expense Repository
//!
//! Storage for expenses. Writes run inside ledger units of work only.

use fuelbook_core::{range_of, DayKey, Expense};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Read access to expenses.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Lists a branch's expenses on one business day.
    pub async fn list_for_day(&self, branch_id: &str, day: DayKey) -> DbResult<Vec<Expense>> {
        let mut conn = self.pool.acquire().await?;
        list_for_day(&mut conn, branch_id, day).await
    }
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Expense>> {
    let expense = sqlx::query_as::<_, Expense>(
        r#"
        SELECT id, branch_id, date, amount, bank_id, description, created_at, updated_at
        FROM expenses
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(expense)
}

pub(crate) async fn list_for_day(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Vec<Expense>> {
    let (start, end) = range_of(day);

    let expenses = sqlx::query_as::<_, Expense>(
        r#"
        SELECT id, branch_id, date, amount, bank_id, description, created_at, updated_at
        FROM expenses
        WHERE branch_id = ?1 AND date >= ?2 AND date < ?3
        ORDER BY date, created_at
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(expenses)
}

pub(crate) async fn tx_insert(conn: &mut SqliteConnection, expense: &Expense) -> DbResult<()> {
    debug!(id = %expense.id, branch_id = %expense.branch_id, "Inserting expense");

    sqlx::query(
        r#"
        INSERT INTO expenses (
            id, branch_id, date, amount, bank_id, description, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&expense.id)
    .bind(&expense.branch_id)
    .bind(expense.date)
    .bind(expense.amount)
    .bind(&expense.bank_id)
    .bind(&expense.description)
    .bind(expense.created_at)
    .bind(expense.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn tx_update(conn: &mut SqliteConnection, expense: &Expense) -> DbResult<()> {
    debug!(id = %expense.id, "Updating expense");

    let result = sqlx::query(
        r#"
        UPDATE expenses SET
            date = ?2,
            amount = ?3,
            bank_id = ?4,
            description = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&expense.id)
    .bind(expense.date)
    .bind(expense.amount)
    .bind(&expense.bank_id)
    .bind(&expense.description)
    .bind(expense.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Expense", &expense.id));
    }

    Ok(())
}

pub(crate) async fn tx_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting expense");

    let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Expense", id));
    }

    Ok(())
}
