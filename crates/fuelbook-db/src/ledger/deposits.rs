//! Bank deposit mutations: cash leaves the till and lands in a bank.

use chrono::Utc;
use fuelbook_core::{BankDeposit, BankDepositInput, LedgerPlan, RequestContext};
use tracing::info;
use uuid::Uuid;

use super::compensation::apply_plan;
use super::{visible_to, LedgerService};
use crate::error::DbResult;
use crate::repository::bank_deposit;

impl LedgerService {
    pub async fn create_deposit(
        &self,
        ctx: &RequestContext,
        input: BankDepositInput,
    ) -> DbResult<BankDeposit> {
        input.validate()?;

        let now = Utc::now();
        let new = BankDeposit {
            id: Uuid::new_v4().to_string(),
            branch_id: ctx.branch_id.clone(),
            bank_id: input.bank_id,
            date: input.date,
            amount: input.amount,
            reference: input.reference,
            created_at: now,
            updated_at: now,
        };
        let plan = LedgerPlan::for_create(&new);

        let mut tx = self.pool.begin().await?;
        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        bank_deposit::tx_insert(&mut tx, &new).await?;
        tx.commit().await?;

        info!(
            id = %new.id,
            bank_id = %new.bank_id,
            amount = %new.amount,
            actor = %ctx.actor_id,
            "Bank deposit created"
        );
        Ok(new)
    }

    pub async fn update_deposit(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: BankDepositInput,
    ) -> DbResult<BankDeposit> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let old = visible_to(
            ctx,
            bank_deposit::find_by_id(&mut tx, id).await?,
            "BankDeposit",
            id,
        )?;

        let new = BankDeposit {
            bank_id: input.bank_id,
            date: input.date,
            amount: input.amount,
            reference: input.reference,
            updated_at: Utc::now(),
            ..old.clone()
        };
        let plan = LedgerPlan::for_update(&old, &new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        bank_deposit::tx_update(&mut tx, &new).await?;
        tx.commit().await?;

        info!(id = %new.id, net_cash = %plan.net_cash(), actor = %ctx.actor_id, "Bank deposit updated");
        Ok(new)
    }

    pub async fn delete_deposit(&self, ctx: &RequestContext, id: &str) -> DbResult<BankDeposit> {
        let mut tx = self.pool.begin().await?;
        let old = visible_to(
            ctx,
            bank_deposit::find_by_id(&mut tx, id).await?,
            "BankDeposit",
            id,
        )?;
        let plan = LedgerPlan::for_delete(&old);

        apply_plan(&mut tx, &old.branch_id, &plan).await?;
        bank_deposit::tx_delete(&mut tx, &old.id).await?;
        tx.commit().await?;

        info!(id = %old.id, actor = %ctx.actor_id, "Bank deposit deleted");
        Ok(old)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{at, day, deposit_input, TestBranch};
    use fuelbook_core::Money;

    #[tokio::test]
    async fn test_deposit_lifecycle() {
        let t = TestBranch::new().await;
        let bank = t.bank(0).await;
        let ledger = t.db.ledger();

        let deposit = ledger
            .create_deposit(&t.ctx, deposit_input(&bank, at(5, 10), 30_000))
            .await
            .unwrap();
        assert_eq!(t.receipt(day("2024-01-05")).await, Money::from_paise(-30_000));
        assert_eq!(t.bank_balance(&bank).await, Money::from_paise(30_000));

        ledger
            .update_deposit(&t.ctx, &deposit.id, deposit_input(&bank, at(6, 10), 25_000))
            .await
            .unwrap();
        assert!(t.receipt(day("2024-01-05")).await.is_zero());
        assert_eq!(t.receipt(day("2024-01-06")).await, Money::from_paise(-25_000));
        assert_eq!(t.bank_balance(&bank).await, Money::from_paise(25_000));

        ledger.delete_deposit(&t.ctx, &deposit.id).await.unwrap();
        assert!(t.receipt(day("2024-01-06")).await.is_zero());
        assert!(t.bank_balance(&bank).await.is_zero());
    }
}
