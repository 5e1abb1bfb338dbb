//! # Payment Repository
//!
//! Storage for customer and supplier payments. Writes run inside ledger
//! units of work only.

use fuelbook_core::{range_of, DayKey, Payment};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Read access to payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Lists a branch's payments made on one business day.
    pub async fn list_for_day(&self, branch_id: &str, day: DayKey) -> DbResult<Vec<Payment>> {
        let mut conn = self.pool.acquire().await?;
        list_for_day(&mut conn, branch_id, day).await
    }
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        SELECT
            id, branch_id, counterparty_id, counterparty_kind,
            amount, paid_on, note, created_at, updated_at
        FROM payments
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(payment)
}

pub(crate) async fn list_for_day(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Vec<Payment>> {
    let (start, end) = range_of(day);

    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT
            id, branch_id, counterparty_id, counterparty_kind,
            amount, paid_on, note, created_at, updated_at
        FROM payments
        WHERE branch_id = ?1 AND paid_on >= ?2 AND paid_on < ?3
        ORDER BY paid_on, created_at
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(payments)
}

pub(crate) async fn tx_insert(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
    debug!(id = %payment.id, counterparty_id = %payment.counterparty_id, "Inserting payment");

    sqlx::query(
        r#"
        INSERT INTO payments (
            id, branch_id, counterparty_id, counterparty_kind,
            amount, paid_on, note, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.branch_id)
    .bind(&payment.counterparty_id)
    .bind(payment.counterparty_kind)
    .bind(payment.amount)
    .bind(payment.paid_on)
    .bind(&payment.note)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn tx_update(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
    debug!(id = %payment.id, "Updating payment");

    let result = sqlx::query(
        r#"
        UPDATE payments SET
            counterparty_id = ?2,
            counterparty_kind = ?3,
            amount = ?4,
            paid_on = ?5,
            note = ?6,
            updated_at = ?7
        WHERE id = ?1
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.counterparty_id)
    .bind(payment.counterparty_kind)
    .bind(payment.amount)
    .bind(payment.paid_on)
    .bind(&payment.note)
    .bind(payment.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Payment", &payment.id));
    }

    Ok(())
}

pub(crate) async fn tx_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting payment");

    let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Payment", id));
    }

    Ok(())
}
