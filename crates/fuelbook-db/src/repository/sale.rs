//! # Sale Repository
//!
//! Storage for daily sales sheets.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE   ledger.create_sale()  → tx_insert + cash +cashPayment     │
//! │  2. EDIT     ledger.update_sale()  → tx_update + compensating deltas   │
//! │  3. DELETE   ledger.delete_sale()  → tx_delete + cash -cashPayment     │
//! │                                                                         │
//! │  Writes only happen inside a ledger unit of work. This module never    │
//! │  touches balance_receipts itself.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fuelbook_core::{range_of, DayKey, Sale};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Read access to sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Lists a branch's sales on one business day.
    pub async fn list_for_day(&self, branch_id: &str, day: DayKey) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        list_for_day(&mut conn, branch_id, day).await
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT
            id, branch_id, date,
            cash_payment, atm_payment, paytm_payment, fleet_payment,
            fuel_totals, rate,
            created_at, updated_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

pub(crate) async fn list_for_day(
    conn: &mut SqliteConnection,
    branch_id: &str,
    day: DayKey,
) -> DbResult<Vec<Sale>> {
    let (start, end) = range_of(day);

    let sales = sqlx::query_as::<_, Sale>(
        r#"
        SELECT
            id, branch_id, date,
            cash_payment, atm_payment, paytm_payment, fleet_payment,
            fuel_totals, rate,
            created_at, updated_at
        FROM sales
        WHERE branch_id = ?1 AND date >= ?2 AND date < ?3
        ORDER BY date, created_at
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(sales)
}

pub(crate) async fn tx_insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, branch_id = %sale.branch_id, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, branch_id, date,
            cash_payment, atm_payment, paytm_payment, fleet_payment,
            fuel_totals, rate,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.branch_id)
    .bind(sale.date)
    .bind(sale.cash_payment)
    .bind(sale.atm_payment)
    .bind(sale.paytm_payment)
    .bind(sale.fleet_payment)
    .bind(Json(&sale.fuel_totals))
    .bind(sale.rate)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn tx_update(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, "Updating sale");

    let result = sqlx::query(
        r#"
        UPDATE sales SET
            date = ?2,
            cash_payment = ?3,
            atm_payment = ?4,
            paytm_payment = ?5,
            fleet_payment = ?6,
            fuel_totals = ?7,
            rate = ?8,
            updated_at = ?9
        WHERE id = ?1
        "#,
    )
    .bind(&sale.id)
    .bind(sale.date)
    .bind(sale.cash_payment)
    .bind(sale.atm_payment)
    .bind(sale.paytm_payment)
    .bind(sale.fleet_payment)
    .bind(Json(&sale.fuel_totals))
    .bind(sale.rate)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", &sale.id));
    }

    Ok(())
}

pub(crate) async fn tx_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting sale");

    let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", id));
    }

    Ok(())
}
