//! # Ledger Mutators
//!
//! Create, update and delete for every entity that moves the cash ledger,
//! a bank balance or a counterparty's outstanding figure.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  One mutation = one SQLite transaction                  │
//! │                                                                         │
//! │  input.validate()            ← rejected inputs never open a tx         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── load old entity         ← missing or other branch → NotFound      │
//! │  ├── build new entity                                                   │
//! │  ├── LedgerPlan::for_change(old, new)                                   │
//! │  ├── apply_plan              ← balance_receipts / banks / parties       │
//! │  └── tx_insert | tx_update | tx_delete                                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction, which rolls everything back.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each entity module adds its operations to [`LedgerService`]:
//! [`sales`], [`expenses`], [`payments`], [`deposits`], [`credits`].

pub mod compensation;
pub mod credits;
pub mod deposits;
pub mod expenses;
pub mod payments;
pub mod sales;

use fuelbook_core::{LedgerEntry, RequestContext};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Entry point for all ledger-moving mutations.
#[derive(Debug, Clone)]
pub struct LedgerService {
    pool: SqlitePool,
}

impl LedgerService {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerService { pool }
    }
}

/// Resolves a loaded entity against the caller's branch.
///
/// An entity in a branch the caller cannot see is reported exactly like a
/// missing one.
fn visible_to<E: LedgerEntry>(
    ctx: &RequestContext,
    found: Option<E>,
    entity: &str,
    id: &str,
) -> DbResult<E> {
    match found {
        Some(e) if ctx.can_access(e.branch_id()) => Ok(e),
        _ => Err(DbError::not_found(entity, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, sale_input, TestBranch};
    use fuelbook_core::{DayKey, Money, RequestContext, Role};

    #[tokio::test]
    async fn test_other_branch_is_not_found() {
        let t = TestBranch::new().await;
        let sale = t
            .db
            .ledger()
            .create_sale(&t.ctx, sale_input(at(5, 6), 10_000))
            .await
            .unwrap();

        let outsider = RequestContext::new("u-x", "other-branch", Role::Manager);
        let err = t
            .db
            .ledger()
            .delete_sale(&outsider, &sale.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // The failed delete left the ledger alone.
        let day: DayKey = "2024-01-05".parse().unwrap();
        assert_eq!(
            t.db.balance_receipts().amount(&t.branch_id, day).await.unwrap(),
            Money::from_paise(10_000)
        );

        let admin = RequestContext::new("u-a", "other-branch", Role::Admin);
        t.db.ledger().delete_sale(&admin, &sale.id).await.unwrap();
        assert!(t
            .db
            .balance_receipts()
            .amount(&t.branch_id, day)
            .await
            .unwrap()
            .is_zero());
    }
}
