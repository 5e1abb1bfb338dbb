//! # Credit Repository
//!
//! Storage for credit sales. Writes run inside ledger units of work only.

use fuelbook_core::{range_of, Credit, DayKey};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Read access to credit sales.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Gets a credit by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Credit>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Lists a branch's credit sales on one business day.
    pub async fn list_for_day(&self, branch_id: &str, day: DayKey) -> DbResult<Vec<Credit>> {
        let mut conn = self.pool.acquire().await?;
        list_for_day(&mut conn, branch_id, day).await
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Credit>> {
    let credit = sqlx::query_as::<_, Credit>(
        r#"
        SELECT id, branch_id, customer_id, date, amount, description, created_at, updated_at
        FROM credits
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(credit)
}

pub(crate) async fn list_for_day(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Vec<Credit>> {
    let (start, end) = range_of(day);

    let credits = sqlx::query_as::<_, Credit>(
        r#"
        SELECT id, branch_id, customer_id, date, amount, description, created_at, updated_at
        FROM credits
        WHERE branch_id = ?1 AND date >= ?2 AND date < ?3
        ORDER BY date, created_at
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(credits)
}

pub(crate) async fn tx_insert(conn: &mut SqliteConnection, credit: &Credit) -> DbResult<()> {
    debug!(id = %credit.id, customer_id = %credit.customer_id, "Inserting credit");

    sqlx::query(
        r#"
        INSERT INTO credits (
            id, branch_id, customer_id, date, amount, description, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&credit.id)
    .bind(&credit.branch_id)
    .bind(&credit.customer_id)
    .bind(credit.date)
    .bind(credit.amount)
    .bind(&credit.description)
    .bind(credit.created_at)
    .bind(credit.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn tx_update(conn: &mut SqliteConnection, credit: &Credit) -> DbResult<()> {
    debug!(id = %credit.id, "Updating credit");

    let result = sqlx::query(
        r#"
        UPDATE credits SET
            customer_id = ?2,
            date = ?3,
            amount = ?4,
            description = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&credit.id)
    .bind(&credit.customer_id)
    .bind(credit.date)
    .bind(credit.amount)
    .bind(&credit.description)
    .bind(credit.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Credit", &credit.id));
    }

    Ok(())
}

pub(crate) async fn tx_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting credit");

    let result = sqlx::query("DELETE FROM credits WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Credit", id));
    }

    Ok(())
}
