//! Expense mutations. A bank-funded expense also draws down its bank.

use chrono::Utc;
use fuelbook_core::{Expense, ExpenseInput, LedgerPlan, RequestContext};
use tracing::info;
use uuid::Uuid;

use super::compensation::apply_plan;
use super::{visible_to, LedgerService};
use crate::error::DbResult;
use crate::repository::expense;

impl LedgerService {
    pub async fn create_expense(
        &self,
        ctx: &RequestContext,
        input: ExpenseInput,
    ) -> DbResult<Expense> {
        input.validate()?;

        let now = Utc::now();
        let new = Expense {
            id: Uuid::new_v4().to_string(),
            branch_id: ctx.branch_id.clone(),
            date: input.date,
            amount: input.amount,
            bank_id: input.bank_id,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        let plan = LedgerPlan::for_create(&new);

        let mut tx = self.pool.begin().await?;
        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        expense::tx_insert(&mut tx, &new).await?;
        tx.commit().await?;

        info!(
            id = %new.id,
            branch_id = %new.branch_id,
            amount = %new.amount,
            bank_id = ?new.bank_id,
            actor = %ctx.actor_id,
            "Expense created"
        );
        Ok(new)
    }

    /// Replaces an expense's fields.
    ///
    /// Moving the expense between banks reverses it on the old bank and
    /// applies it on the new one; gaining or losing a bank applies only
    /// the matching half.
    pub async fn update_expense(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: ExpenseInput,
    ) -> DbResult<Expense> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, expense::find_by_id(&mut tx, id).await?, "Expense", id)?;

        let new = Expense {
            date: input.date,
            amount: input.amount,
            bank_id: input.bank_id,
            description: input.description,
            updated_at: Utc::now(),
            ..old.clone()
        };
        let plan = LedgerPlan::for_update(&old, &new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        expense::tx_update(&mut tx, &new).await?;
        tx.commit().await?;

        info!(id = %new.id, net_cash = %plan.net_cash(), actor = %ctx.actor_id, "Expense updated");
        Ok(new)
    }

    pub async fn delete_expense(&self, ctx: &RequestContext, id: &str) -> DbResult<Expense> {
        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, expense::find_by_id(&mut tx, id).await?, "Expense", id)?;
        let plan = LedgerPlan::for_delete(&old);

        apply_plan(&mut tx, &old.branch_id, &plan).await?;
        expense::tx_delete(&mut tx, &old.id).await?;
        tx.commit().await?;

        info!(id = %old.id, actor = %ctx.actor_id, "Expense deleted");
        Ok(old)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::test_support::{at, day, expense_input, TestBranch};
    use fuelbook_core::Money;

    #[tokio::test]
    async fn test_delete_reversal() {
        let t = TestBranch::new().await;
        let ledger = t.db.ledger();
        let expense = ledger
            .create_expense(&t.ctx, expense_input(at(5, 6), 200, None))
            .await
            .unwrap();
        assert_eq!(t.receipt(day("2024-01-05")).await, Money::from_paise(-200));

        ledger.delete_expense(&t.ctx, &expense.id).await.unwrap();

        assert!(t.receipt(day("2024-01-05")).await.is_zero());
    }

    #[tokio::test]
    async fn test_bank_funded_expense_moves_bank() {
        let t = TestBranch::new().await;
        let bank = t.bank(50_000).await;
        let ledger = t.db.ledger();

        let expense = ledger
            .create_expense(&t.ctx, expense_input(at(5, 6), 2_000, Some(&bank)))
            .await
            .unwrap();
        assert_eq!(t.bank_balance(&bank).await, Money::from_paise(48_000));
        assert_eq!(t.receipt(day("2024-01-05")).await, Money::from_paise(-2_000));

        ledger
            .update_expense(&t.ctx, &expense.id, expense_input(at(5, 6), 3_500, Some(&bank)))
            .await
            .unwrap();
        assert_eq!(t.bank_balance(&bank).await, Money::from_paise(46_500));

        ledger.delete_expense(&t.ctx, &expense.id).await.unwrap();
        assert_eq!(t.bank_balance(&bank).await, Money::from_paise(50_000));
    }

    #[tokio::test]
    async fn test_switching_banks() {
        let t = TestBranch::new().await;
        let first = t.bank(10_000).await;
        let second = t.bank(10_000).await;
        let ledger = t.db.ledger();

        let expense = ledger
            .create_expense(&t.ctx, expense_input(at(5, 6), 1_000, Some(&first)))
            .await
            .unwrap();
        ledger
            .update_expense(&t.ctx, &expense.id, expense_input(at(5, 6), 1_000, Some(&second)))
            .await
            .unwrap();
        assert_eq!(t.bank_balance(&first).await, Money::from_paise(10_000));
        assert_eq!(t.bank_balance(&second).await, Money::from_paise(9_000));

        ledger
            .update_expense(&t.ctx, &expense.id, expense_input(at(5, 6), 1_000, None))
            .await
            .unwrap();
        assert_eq!(t.bank_balance(&second).await, Money::from_paise(10_000));
    }

    #[tokio::test]
    async fn test_unknown_bank_rolls_back() {
        let t = TestBranch::new().await;
        let missing = uuid::Uuid::new_v4().to_string();

        let err = t
            .db
            .ledger()
            .create_expense(&t.ctx, expense_input(at(5, 6), 1_000, Some(&missing)))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(t
            .db
            .balance_receipts()
            .get(&t.branch_id, day("2024-01-05"))
            .await
            .unwrap()
            .is_none());
    }
}
