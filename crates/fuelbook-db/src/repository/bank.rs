//! # Bank Repository
//!
//! Bank accounts and their running balances. Balances only move through
//! [`tx_adjust_balance`], called by the ledger for bank-funded expenses and
//! bank deposits.

use chrono::Utc;
use fuelbook_core::{Bank, Money};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for bank accounts.
#[derive(Debug, Clone)]
pub struct BankRepository {
    pool: SqlitePool,
}

impl BankRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BankRepository { pool }
    }

    /// Gets a bank by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bank>> {
        let bank = sqlx::query_as::<_, Bank>(
            r#"
            SELECT id, branch_id, name, balance_amount, created_at, updated_at
            FROM banks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bank)
    }

    /// Lists the banks of a branch by name.
    pub async fn list_for_branch(&self, branch_id: &str) -> DbResult<Vec<Bank>> {
        let banks = sqlx::query_as::<_, Bank>(
            r#"
            SELECT id, branch_id, name, balance_amount, created_at, updated_at
            FROM banks
            WHERE branch_id = ?1
            ORDER BY name
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(banks)
    }

    /// Inserts a bank (seed data and tests).
    pub async fn insert(&self, bank: &Bank) -> DbResult<()> {
        debug!(id = %bank.id, name = %bank.name, "Inserting bank");

        sqlx::query(
            r#"
            INSERT INTO banks (id, branch_id, name, balance_amount, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&bank.id)
        .bind(&bank.branch_id)
        .bind(&bank.name)
        .bind(bank.balance_amount)
        .bind(bank.created_at)
        .bind(bank.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Adds `delta` to a bank's balance.
///
/// The bank must belong to `branch_id`; otherwise this is a NotFound and
/// the caller's transaction should roll back.
pub async fn tx_adjust_balance(
    conn: &mut SqliteConnection,
    branch_id: &str,
    bank_id: &str,
    delta: Money,
) -> DbResult<Bank> {
    let bank = sqlx::query_as::<_, Bank>(
        r#"
        UPDATE banks
        SET balance_amount = balance_amount + ?1,
            updated_at = ?2
        WHERE id = ?3 AND branch_id = ?4
        RETURNING id, branch_id, name, balance_amount, created_at, updated_at
        "#,
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(bank_id)
    .bind(branch_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Bank", bank_id))?;

    debug!(bank_id = %bank_id, delta = %delta, balance = %bank.balance_amount, "Bank balance adjusted");

    Ok(bank)
}
