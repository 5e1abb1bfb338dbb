//! # Counterparty Repository
//!
//! Customers and suppliers with an outstanding balance. Payments lower it,
//! credit sales raise it; both go through [`tx_adjust_outstanding`].

use chrono::Utc;
use fuelbook_core::{Counterparty, Money};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for customers and suppliers.
#[derive(Debug, Clone)]
pub struct CounterpartyRepository {
    pool: SqlitePool,
}

impl CounterpartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CounterpartyRepository { pool }
    }

    /// Gets a counterparty by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Counterparty>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Inserts a counterparty (seed data and tests).
    pub async fn insert(&self, party: &Counterparty) -> DbResult<()> {
        debug!(id = %party.id, kind = %party.kind, "Inserting counterparty");

        sqlx::query(
            r#"
            INSERT INTO counterparties (
                id, branch_id, kind, name, outstanding_payments, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&party.id)
        .bind(&party.branch_id)
        .bind(party.kind)
        .bind(&party.name)
        .bind(party.outstanding_payments)
        .bind(party.created_at)
        .bind(party.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Counterparty>> {
    let party = sqlx::query_as::<_, Counterparty>(
        r#"
        SELECT id, branch_id, kind, name, outstanding_payments, created_at, updated_at
        FROM counterparties
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(party)
}

/// Adds `delta` to a counterparty's outstanding balance.
///
/// The counterparty must belong to `branch_id`; otherwise NotFound.
pub async fn tx_adjust_outstanding(
    conn: &mut SqliteConnection,
    branch_id: &str,
    counterparty_id: &str,
    delta: Money,
) -> DbResult<Counterparty> {
    let party = sqlx::query_as::<_, Counterparty>(
        r#"
        UPDATE counterparties
        SET outstanding_payments = outstanding_payments + ?1,
            updated_at = ?2
        WHERE id = ?3 AND branch_id = ?4
        RETURNING id, branch_id, kind, name, outstanding_payments, created_at, updated_at
        "#,
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(counterparty_id)
    .bind(branch_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Counterparty", counterparty_id))?;

    debug!(
        counterparty_id = %counterparty_id,
        delta = %delta,
        outstanding = %party.outstanding_payments,
        "Outstanding balance adjusted"
    );

    Ok(party)
}
