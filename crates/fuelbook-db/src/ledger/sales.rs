//! Sale mutations. Only `cash_payment` feeds the cash ledger.

use chrono::Utc;
use fuelbook_core::{LedgerPlan, RequestContext, Sale, SaleInput};
use tracing::info;
use uuid::Uuid;

use super::compensation::apply_plan;
use super::{visible_to, LedgerService};
use crate::error::DbResult;
use crate::repository::sale;

impl LedgerService {
    /// Records a sale and adds its cash payment to the day's balance.
    pub async fn create_sale(&self, ctx: &RequestContext, input: SaleInput) -> DbResult<Sale> {
        input.validate()?;

        let now = Utc::now();
        let new = Sale {
            id: Uuid::new_v4().to_string(),
            branch_id: ctx.branch_id.clone(),
            date: input.date,
            cash_payment: input.cash_payment,
            atm_payment: input.atm_payment,
            paytm_payment: input.paytm_payment,
            fleet_payment: input.fleet_payment,
            fuel_totals: input.fuel_totals,
            rate: input.rate,
            created_at: now,
            updated_at: now,
        };
        let plan = LedgerPlan::for_create(&new);

        let mut tx = self.pool.begin().await?;
        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        sale::tx_insert(&mut tx, &new).await?;
        tx.commit().await?;

        info!(id = %new.id, branch_id = %new.branch_id, cash = %new.cash_payment, actor = %ctx.actor_id, "Sale created");
        Ok(new)
    }

    /// Replaces a sale's fields, moving its cash contribution if the amount
    /// or the day changed.
    pub async fn update_sale(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: SaleInput,
    ) -> DbResult<Sale> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, sale::find_by_id(&mut tx, id).await?, "Sale", id)?;

        let new = Sale {
            date: input.date,
            cash_payment: input.cash_payment,
            atm_payment: input.atm_payment,
            paytm_payment: input.paytm_payment,
            fleet_payment: input.fleet_payment,
            fuel_totals: input.fuel_totals,
            rate: input.rate,
            updated_at: Utc::now(),
            ..old.clone()
        };
        let plan = LedgerPlan::for_update(&old, &new);

        apply_plan(&mut tx, &new.branch_id, &plan).await?;
        sale::tx_update(&mut tx, &new).await?;
        tx.commit().await?;

        info!(id = %new.id, net_cash = %plan.net_cash(), actor = %ctx.actor_id, "Sale updated");
        Ok(new)
    }

    /// Deletes a sale and takes its cash payment back out of its day.
    pub async fn delete_sale(&self, ctx: &RequestContext, id: &str) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;
        let old = visible_to(ctx, sale::find_by_id(&mut tx, id).await?, "Sale", id)?;
        let plan = LedgerPlan::for_delete(&old);

        apply_plan(&mut tx, &old.branch_id, &plan).await?;
        sale::tx_delete(&mut tx, &old.id).await?;
        tx.commit().await?;

        info!(id = %old.id, actor = %ctx.actor_id, "Sale deleted");
        Ok(old)
    }
}
