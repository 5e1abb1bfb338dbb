//! Customer and supplier payment mutations.
//!
//! A payment adds to the day's cash and lowers the counterparty's
//! outstanding figure by the same amount.

use chrono::Utc;
use fuelbook_core::{
    LedgerPlan, Payment, PaymentInput, RequestContext, ValidationError,
};
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use super::compensation::apply_plan;
use super::{visible_to, LedgerService};
use crate::error::{DbError, DbResult};
use crate::repository::{counterparty, payment};

/// Checks that the counterparty exists in `branch_id` and has the kind the
/// payment claims.
async fn check_counterparty(
    conn: &mut SqliteConnection,
    branch_id: &str,
    input: &PaymentInput,
) -> DbResult<()> {
    let party = counterparty::find_by_id(conn, &input.counterparty_id)
        .await?
        .filter(|p| p.branch_id == branch_id)
        .ok_or_else(|| DbError::not_found("Counterparty", &input.counterparty_id))?;

    if party.kind != input.counterparty_kind {
        return Err(ValidationError::Inconsistent {
            field: "counterpartyKind".to_string(),
            reason: format!("counterparty is a {}", party.kind),
        }
        .into());
    }

    Ok(())
}

impl LedgerService {
    pub async fn create_payment(
        &self,
        ctx: &RequestContext,
        input: PaymentInput,
    ) -> DbResult<Payment> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        check_counterparty(&mut tx, &ctx.branch_id, &input).await?;

        let now = Utc::now();
        let new = Payment {
            id: Uuid::new_v4().to_string(),
            branch_id: ctx.branch_id.clone(),
            counterparty_id: input.counterparty_id,
            counterparty_kind: input.counterparty_kind,
            amount: input.amount,
            paid_on: input.paid_on,
            note: input.note,
            created_at: now,
            updated_at: now,
        };
        let plan = LedgerPlan::for_create(&new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        payment::tx_insert(&mut tx, &new).await?;
        tx.commit().await?;

        info!(
            id = %new.id,
            counterparty_id = %new.counterparty_id,
            kind = %new.counterparty_kind,
            amount = %new.amount,
            actor = %ctx.actor_id,
            "Payment created"
        );
        Ok(new)
    }

    pub async fn update_payment(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: PaymentInput,
    ) -> DbResult<Payment> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, payment::find_by_id(&mut tx, id).await?, "Payment", id)?;
        check_counterparty(&mut tx, &old.branch_id, &input).await?;

        let new = Payment {
            counterparty_id: input.counterparty_id,
            counterparty_kind: input.counterparty_kind,
            amount: input.amount,
            paid_on: input.paid_on,
            note: input.note,
            updated_at: Utc::now(),
            ..old.clone()
        };
        let plan = LedgerPlan::for_update(&old, &new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        payment::tx_update(&mut tx, &new).await?;
        tx.commit().await?;

        info!(id = %new.id, net_cash = %plan.net_cash(), actor = %ctx.actor_id, "Payment updated");
        Ok(new)
    }

    pub async fn delete_payment(&self, ctx: &RequestContext, id: &str) -> DbResult<Payment> {
        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, payment::find_by_id(&mut tx, id).await?, "Payment", id)?;
        let plan = LedgerPlan::for_delete(&old);

        apply_plan(&mut tx, &old.branch_id, &plan).await?;
        payment::tx_delete(&mut tx, &old.id).await?;
        tx.commit().await?;

        info!(id = %old.id, actor = %ctx.actor_id, "Payment deleted");
        Ok(old)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::test_support::{at, day, payment_input, TestBranch};
    use fuelbook_core::{CoreError, CounterpartyKind, Money};

    #[tokio::test]
    async fn test_payment_moves_cash_and_outstanding() {
        let t = TestBranch::new().await;
        let customer = t.counterparty(CounterpartyKind::Customer, 10_000).await;
        let ledger = t.db.ledger();

        let payment = ledger
            .create_payment(
                &t.ctx,
                payment_input(&customer, CounterpartyKind::Customer, at(5, 6), 4_000),
            )
            .await
            .unwrap();
        assert_eq!(t.receipt(day("2024-01-05")).await, Money::from_paise(4_000));
        assert_eq!(t.outstanding(&customer).await, Money::from_paise(6_000));

        ledger
            .update_payment(
                &t.ctx,
                &payment.id,
                payment_input(&customer, CounterpartyKind::Customer, at(6, 6), 5_000),
            )
            .await
            .unwrap();
        assert!(t.receipt(day("2024-01-05")).await.is_zero());
        assert_eq!(t.receipt(day("2024-01-06")).await, Money::from_paise(5_000));
        assert_eq!(t.outstanding(&customer).await, Money::from_paise(5_000));

        ledger.delete_payment(&t.ctx, &payment.id).await.unwrap();
        assert_eq!(t.outstanding(&customer).await, Money::from_paise(10_000));
        assert!(t.receipt(day("2024-01-06")).await.is_zero());
    }

    #[tokio::test]
    async fn test_kind_must_match_counterparty() {
        let t = TestBranch::new().await;
        let supplier = t.counterparty(CounterpartyKind::Supplier, 0).await;

        let err = t
            .db
            .ledger()
            .create_payment(
                &t.ctx,
                payment_input(&supplier, CounterpartyKind::Customer, at(5, 6), 100),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_counterparty_is_not_found() {
        let t = TestBranch::new().await;
        let missing = uuid::Uuid::new_v4().to_string();

        let err = t
            .db
            .ledger()
            .create_payment(
                &t.ctx,
                payment_input(&missing, CounterpartyKind::Customer, at(5, 6), 100),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
