//! Credit-sale mutations. Credits never touch the cash ledger; they raise
//! the customer's outstanding figure.

use chrono::Utc;
use fuelbook_core::{
    CounterpartyKind, Credit, CreditInput, LedgerPlan, RequestContext, ValidationError,
};
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use super::compensation::apply_plan;
use super::{visible_to, LedgerService};
use crate::error::{DbError, DbResult};
use crate::repository::{counterparty, credit};

async fn check_customer(
    conn: &mut SqliteConnection,
    branch_id: &str,
    customer_id: &str,
) -> DbResult<()> {
    let party = counterparty::find_by_id(conn, customer_id)
        .await?
        .filter(|p| p.branch_id == branch_id)
        .ok_or_else(|| DbError::not_found("Customer", customer_id))?;

    if party.kind != CounterpartyKind::Customer {
        return Err(ValidationError::Inconsistent {
            field: "customerId".to_string(),
            reason: "credit can only be given to a customer".to_string(),
        }
        .into());
    }

    Ok(())
}

impl LedgerService {
    pub async fn create_credit(
        &self,
        ctx: &RequestContext,
        input: CreditInput,
    ) -> DbResult<Credit> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        check_customer(&mut tx, &ctx.branch_id, &input.customer_id).await?;

        let now = Utc::now();
        let new = Credit {
            id: Uuid::new_v4().to_string(),
            branch_id: ctx.branch_id.clone(),
            customer_id: input.customer_id,
            date: input.date,
            amount: input.amount,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        let plan = LedgerPlan::for_create(&new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        credit::tx_insert(&mut tx, &new).await?;
        tx.commit().await?;

        info!(
            id = %new.id,
            customer_id = %new.customer_id,
            amount = %new.amount,
            actor = %ctx.actor_id,
            "Credit created"
        );
        Ok(new)
    }

    pub async fn update_credit(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: CreditInput,
    ) -> DbResult<Credit> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, credit::find_by_id(&mut tx, id).await?, "Credit", id)?;
        check_customer(&mut tx, &old.branch_id, &input.customer_id).await?;

        let new = Credit {
            customer_id: input.customer_id,
            date: input.date,
            amount: input.amount,
            description: input.description,
            updated_at: Utc::now(),
            ..old.clone()
        };
        let plan = LedgerPlan::for_update(&old, &new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        credit::tx_update(&mut tx, &new).await?;
        tx.commit().await?;

        info!(id = %new.id, actor = %ctx.actor_id, "Credit updated");
        Ok(new)
    }

    pub async fn delete_credit(&self, ctx: &RequestContext, id: &str) -> DbResult<Credit> {
        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, credit::find_by_id(&mut tx, id).await?, "Credit", id)?;
        let plan = LedgerPlan::for_delete(&old);

        apply_plan(&mut tx, &old.branch_id, &plan).await?;
        credit::tx_delete(&mut tx, &old.id).await?;
        tx.commit().await?;

        info!(id = %old.id, actor = %ctx.actor_id, "Credit deleted");
        Ok(old)
    }
}
