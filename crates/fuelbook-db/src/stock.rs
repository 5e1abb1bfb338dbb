//! # Stock Reservation Engine
//!
//! All-or-nothing commit of a meter-reading batch.
//!
//! ## Batch State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Received ──► Validating ──┬──► Rejected      (nothing written)        │
//! │                            │                                            │
//! │                            └──► Committing ──┬──► Committed             │
//! │                                   ▲   │      │                          │
//! │                                   └───┘      └──► Failed  (rolled back) │
//! │                              retry on write                             │
//! │                              conflict (≤ 3)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Validating (read-only snapshot)
//! - every line passes field validation
//! - the nozzle exists in a branch the caller can access and dispenses the
//!   line's fuel type
//! - no reading exists for (nozzle, day), in the database or twice in the batch
//! - the branch has a tank for the fuel type
//! - summed draws per tank and per stock row fit in what they hold
//!
//! ## Committing (one transaction)
//! Readings are inserted, tanks and stock rows drawn down with conditional
//! updates, and each nozzle's opening reading advanced to its last closing
//! reading. A conditional update that matches no row means another batch got
//! there first; the batch fails as InsufficientStock.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::Utc;
use fuelbook_core::validation::MAX_READING_ML;
use fuelbook_core::{
    bucket_of, CoreError, DayKey, MeterReading, MeterReadingBatch, MeterReadingInput,
    RequestContext, ValidationError, Volume, MAX_COMMIT_ATTEMPTS,
};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::fuel;
use crate::retry::retry_on_conflict;

// =============================================================================
// Batch State
// =============================================================================

/// Lifecycle of one batch. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Received,
    Validating,
    Rejected,
    Committing,
    Committed,
    Failed,
}

impl BatchState {
    pub const fn as_str(self) -> &'static str {
        match self {
            BatchState::Received => "received",
            BatchState::Validating => "validating",
            BatchState::Rejected => "rejected",
            BatchState::Committing => "committing",
            BatchState::Committed => "committed",
            BatchState::Failed => "failed",
        }
    }

    /// Whether the batch has reached a final state.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            BatchState::Rejected | BatchState::Committed | BatchState::Failed
        )
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub batch_id: String,
    pub count: usize,
}

// =============================================================================
// Commit Plan
// =============================================================================

/// A draw on one tank or stock row, summed over the batch.
#[derive(Debug, Clone)]
struct Draw {
    row_id: String,
    branch_id: String,
    fuel_type: String,
    amount: Volume,
}

impl Draw {
    fn add(&mut self, difference: Volume) -> Result<(), ValidationError> {
        self.amount = self
            .amount
            .checked_add(difference)
            .ok_or_else(|| ValidationError::TooLarge {
                field: "sale".to_string(),
                max: MAX_READING_ML,
            })?;
        Ok(())
    }
}

/// Everything the commit phase writes, fixed by validation.
#[derive(Debug, Clone)]
struct CommitPlan {
    batch_id: String,
    /// Sorted by reading time so each nozzle's cursor ends at its latest
    /// closing reading.
    readings: Vec<MeterReading>,
    tank_draws: Vec<Draw>,
    stock_draws: Vec<Draw>,
}

// =============================================================================
// Engine
// =============================================================================

/// Validates and commits meter-reading batches.
#[derive(Debug, Clone)]
pub struct StockReservationEngine {
    pool: SqlitePool,
}

impl StockReservationEngine {
    pub fn new(pool: SqlitePool) -> Self {
        StockReservationEngine { pool }
    }

    /// Commits every line of `batch`, or none of them.
    ///
    /// ## Errors
    /// - `Core(EmptyBatch | Validation | FuelTypeMismatch | DuplicateReading
    ///   | TankNotFound | InsufficientStock)`: batch rejected, nothing written
    /// - `NotFound`: a nozzle is missing or belongs to another branch
    /// - `Conflict`: still locked after the last attempt
    pub async fn commit_batch(
        &self,
        ctx: &RequestContext,
        batch: MeterReadingBatch,
    ) -> DbResult<BatchOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        transition(&batch_id, BatchState::Received);

        transition(&batch_id, BatchState::Validating);
        let plan = match self.validate(ctx, &batch_id, batch.items).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(batch_id = %batch_id, state = %BatchState::Rejected, error = %err, "Batch rejected");
                return Err(err);
            }
        };

        transition(&batch_id, BatchState::Committing);
        let plan = &plan;
        match retry_on_conflict(MAX_COMMIT_ATTEMPTS, |attempt| self.commit_plan(plan, attempt)).await
        {
            Ok(count) => {
                info!(
                    batch_id = %batch_id,
                    state = %BatchState::Committed,
                    count,
                    actor = %ctx.actor_id,
                    "Meter reading batch committed"
                );
                Ok(BatchOutcome { batch_id, count })
            }
            Err(err) => {
                warn!(batch_id = %batch_id, state = %BatchState::Failed, error = %err, "Batch failed");
                Err(err)
            }
        }
    }

    /// Read-only validation over one snapshot. Produces the commit plan.
    async fn validate(
        &self,
        ctx: &RequestContext,
        batch_id: &str,
        mut items: Vec<MeterReadingInput>,
    ) -> DbResult<CommitPlan> {
        if items.is_empty() {
            return Err(CoreError::EmptyBatch.into());
        }
        for item in &items {
            item.validate()?;
        }
        items.sort_by_key(|item| item.date);

        // Rolled back on drop; only used for a consistent read.
        let mut snapshot = self.pool.begin().await?;
        let conn: &mut SqliteConnection = &mut snapshot;

        let now = Utc::now();
        let mut seen: HashSet<(String, DayKey)> = HashSet::new();
        let mut tanks: BTreeMap<String, (Volume, Draw)> = BTreeMap::new();
        let mut stocks: BTreeMap<String, (Volume, Draw)> = BTreeMap::new();
        let mut readings = Vec::with_capacity(items.len());

        for item in items {
            let nozzle = fuel::find_nozzle(conn, &item.nozzle_id)
                .await?
                .filter(|n| ctx.can_access(&n.branch_id))
                .ok_or_else(|| DbError::not_found("Nozzle", &item.nozzle_id))?;

            if nozzle.fuel_type != item.fuel_type {
                return Err(CoreError::FuelTypeMismatch {
                    nozzle_id: nozzle.id,
                    expected: nozzle.fuel_type,
                    actual: item.fuel_type,
                }
                .into());
            }

            let day = bucket_of(item.date);
            if !seen.insert((nozzle.id.clone(), day))
                || fuel::reading_exists(conn, &nozzle.id, day).await?
            {
                return Err(CoreError::DuplicateReading {
                    nozzle_id: nozzle.id,
                    day,
                }
                .into());
            }

            let difference = item.difference();

            let tank = fuel::find_tank_for_fuel(conn, &nozzle.branch_id, &nozzle.fuel_type)
                .await?
                .ok_or_else(|| CoreError::TankNotFound {
                    branch_id: nozzle.branch_id.clone(),
                    fuel_type: nozzle.fuel_type.clone(),
                })?;
            let (_, draw) = tanks.entry(tank.id.clone()).or_insert_with(|| {
                (
                    tank.current_level,
                    Draw {
                        row_id: tank.id.clone(),
                        branch_id: tank.branch_id.clone(),
                        fuel_type: tank.fuel_type.clone(),
                        amount: Volume::zero(),
                    },
                )
            });
            draw.add(difference)?;

            // A stock row for the fuel item is optional.
            if let Some(stock) = fuel::find_stock(conn, &nozzle.branch_id, &nozzle.fuel_type).await? {
                let (_, draw) = stocks.entry(stock.id.clone()).or_insert_with(|| {
                    (
                        stock.quantity,
                        Draw {
                            row_id: stock.id.clone(),
                            branch_id: stock.branch_id.clone(),
                            fuel_type: stock.item.clone(),
                            amount: Volume::zero(),
                        },
                    )
                });
                draw.add(difference)?;
            }

            readings.push(MeterReading {
                id: Uuid::new_v4().to_string(),
                branch_id: nozzle.branch_id,
                nozzle_id: nozzle.id,
                day,
                recorded_at: item.date,
                fuel_type: item.fuel_type,
                opening_reading: item.opening_reading,
                closing_reading: item.closing_reading,
                difference,
                fuel_rate: item.fuel_rate,
                total_amount: item.total_amount,
                created_at: now,
            });
        }

        let tank_draws = check_sufficient(tanks)?;
        let stock_draws = check_sufficient(stocks)?;

        debug!(
            batch_id,
            readings = readings.len(),
            tanks = tank_draws.len(),
            stocks = stock_draws.len(),
            "Batch validated"
        );

        Ok(CommitPlan {
            batch_id: batch_id.to_string(),
            readings,
            tank_draws,
            stock_draws,
        })
    }

    /// One commit attempt. Every attempt opens a fresh transaction.
    async fn commit_plan(&self, plan: &CommitPlan, attempt: u32) -> DbResult<usize> {
        debug!(batch_id = %plan.batch_id, attempt, "Committing batch");

        let mut tx = self.pool.begin().await?;

        for reading in &plan.readings {
            fuel::tx_insert_reading(&mut tx, reading)
                .await
                .map_err(|err| match err {
                    DbError::UniqueViolation { .. } => CoreError::DuplicateReading {
                        nozzle_id: reading.nozzle_id.clone(),
                        day: reading.day,
                    }
                    .into(),
                    other => other,
                })?;
        }

        for draw in &plan.tank_draws {
            if !fuel::tx_draw_tank(&mut tx, &draw.row_id, draw.amount).await? {
                let available = fuel::find_tank_for_fuel(&mut tx, &draw.branch_id, &draw.fuel_type)
                    .await?
                    .map(|t| t.current_level)
                    .unwrap_or_default();
                return Err(insufficient(draw, available));
            }
        }

        for draw in &plan.stock_draws {
            if !fuel::tx_draw_stock(&mut tx, &draw.row_id, draw.amount).await? {
                let available = fuel::find_stock(&mut tx, &draw.branch_id, &draw.fuel_type)
                    .await?
                    .map(|s| s.quantity)
                    .unwrap_or_default();
                return Err(insufficient(draw, available));
            }
        }

        for reading in &plan.readings {
            fuel::tx_advance_nozzle(&mut tx, &reading.nozzle_id, reading.closing_reading).await?;
        }

        tx.commit().await?;
        Ok(plan.readings.len())
    }
}

fn transition(batch_id: &str, state: BatchState) {
    debug!(batch_id, state = %state, terminal = state.is_terminal(), "Batch state");
}

fn insufficient(draw: &Draw, available: Volume) -> DbError {
    CoreError::InsufficientStock {
        fuel_type: draw.fuel_type.clone(),
        available,
        requested: draw.amount,
    }
    .into()
}

/// Rejects the first draw larger than what its row holds.
fn check_sufficient(rows: BTreeMap<String, (Volume, Draw)>) -> DbResult<Vec<Draw>> {
    let mut draws = Vec::with_capacity(rows.len());
    for (_, (available, draw)) in rows {
        if draw.amount > available {
            return Err(insufficient(&draw, available));
        }
        draws.push(draw);
    }
    Ok(draws)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, day, reading_input, TestBranch};
    use fuelbook_core::Role;

    fn batch(items: Vec<MeterReadingInput>) -> MeterReadingBatch {
        MeterReadingBatch { items }
    }

    async fn level(t: &TestBranch, fuel_type: &str) -> Volume {
        t.db.fuel()
            .get_tank_for_fuel(&t.branch_id, fuel_type)
            .await
            .unwrap()
            .unwrap()
            .current_level
    }

    async fn quantity(t: &TestBranch, item: &str) -> Volume {
        t.db.fuel()
            .get_stock(&t.branch_id, item)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    #[tokio::test]
    async fn test_commit_draws_down_and_advances_nozzle() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        t.stock("petrol", 10_000).await;
        let nozzle = t.nozzle("petrol", 1_000).await;

        let outcome = t
            .db
            .stock()
            .commit_batch(&t.ctx, batch(vec![reading_input(&nozzle, at(5, 6), 1_000, 3_000)]))
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert_eq!(level(&t, "petrol").await, Volume::from_ml(8_000));
        assert_eq!(quantity(&t, "petrol").await, Volume::from_ml(8_000));
        let advanced = t.db.fuel().get_nozzle(&nozzle.id).await.unwrap().unwrap();
        assert_eq!(advanced.opening_reading, Volume::from_ml(3_000));

        let readings = t
            .db
            .fuel()
            .list_readings_for_day(&t.branch_id, day("2024-01-05"))
            .await
            .unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].difference, Volume::from_ml(2_000));
    }

    #[tokio::test]
    async fn test_shared_tank_shortfall_rejects_whole_batch() {
        let t = TestBranch::new().await;
        t.tank("diesel", 20_000, 3_000).await;
        let first = t.nozzle("diesel", 0).await;
        let second = t.nozzle("diesel", 0).await;

        let err = t
            .db
            .stock()
            .commit_batch(
                &t.ctx,
                batch(vec![
                    reading_input(&first, at(5, 6), 0, 2_000),
                    reading_input(&second, at(5, 6), 0, 2_000),
                ]),
            )
            .await
            .unwrap_err();

        match err {
            DbError::Core(CoreError::InsufficientStock {
                fuel_type,
                available,
                requested,
            }) => {
                assert_eq!(fuel_type, "diesel");
                assert_eq!(available, Volume::from_ml(3_000));
                assert_eq!(requested, Volume::from_ml(4_000));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(level(&t, "diesel").await, Volume::from_ml(3_000));
        assert!(t
            .db
            .fuel()
            .list_readings_for_day(&t.branch_id, day("2024-01-05"))
            .await
            .unwrap()
            .is_empty());
        let untouched = t.db.fuel().get_nozzle(&first.id).await.unwrap().unwrap();
        assert!(untouched.opening_reading.ml() == 0);
    }

    #[tokio::test]
    async fn test_stock_shortfall_rejects() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        t.stock("petrol", 500).await;
        let nozzle = t.nozzle("petrol", 0).await;

        let err = t
            .db
            .stock()
            .commit_batch(&t.ctx, batch(vec![reading_input(&nozzle, at(5, 6), 0, 1_000)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(level(&t, "petrol").await, Volume::from_ml(10_000));
        assert_eq!(quantity(&t, "petrol").await, Volume::from_ml(500));
    }

    #[tokio::test]
    async fn test_oversized_readings_rejected_without_writes() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        let first = t.nozzle("petrol", 0).await;
        let second = t.nozzle("petrol", 0).await;

        let err = t
            .db
            .stock()
            .commit_batch(
                &t.ctx,
                batch(vec![
                    reading_input(&first, at(5, 6), 0, i64::MAX),
                    reading_input(&second, at(5, 6), 0, i64::MAX),
                ]),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));
        assert_eq!(level(&t, "petrol").await, Volume::from_ml(10_000));
        assert!(t
            .db
            .fuel()
            .list_readings_for_day(&t.branch_id, day("2024-01-05"))
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_draw_overflow_is_a_validation_error() {
        let mut draw = Draw {
            row_id: "tank-1".into(),
            branch_id: "branch-1".into(),
            fuel_type: "petrol".into(),
            amount: Volume::from_ml(i64::MAX - 1),
        };
        assert!(draw.add(Volume::from_ml(1)).is_ok());
        assert!(matches!(
            draw.add(Volume::from_ml(1)),
            Err(ValidationError::TooLarge { ref field, .. }) if field == "sale"
        ));
        assert_eq!(draw.amount, Volume::from_ml(i64::MAX));
    }

    #[tokio::test]
    async fn test_duplicate_within_batch() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        let nozzle = t.nozzle("petrol", 0).await;

        let err = t
            .db
            .stock()
            .commit_batch(
                &t.ctx,
                batch(vec![
                    reading_input(&nozzle, at(5, 6), 0, 100),
                    reading_input(&nozzle, at(5, 12), 100, 200),
                ]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::DuplicateReading { .. })));
        assert_eq!(level(&t, "petrol").await, Volume::from_ml(10_000));
    }

    #[tokio::test]
    async fn test_duplicate_across_batches() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        let nozzle = t.nozzle("petrol", 0).await;
        let engine = t.db.stock();

        engine
            .commit_batch(&t.ctx, batch(vec![reading_input(&nozzle, at(5, 6), 0, 100)]))
            .await
            .unwrap();
        let err = engine
            .commit_batch(&t.ctx, batch(vec![reading_input(&nozzle, at(5, 15), 100, 200)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::DuplicateReading { .. })));
        assert_eq!(level(&t, "petrol").await, Volume::from_ml(9_900));
    }

    #[tokio::test]
    async fn test_fuel_type_mismatch() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        let nozzle = t.nozzle("petrol", 0).await;
        let mut line = reading_input(&nozzle, at(5, 6), 0, 100);
        line.fuel_type = "diesel".into();

        let err = t
            .db
            .stock()
            .commit_batch(&t.ctx, batch(vec![line]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::FuelTypeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_empty_batch_and_missing_tank() {
        let t = TestBranch::new().await;
        let engine = t.db.stock();

        let err = engine.commit_batch(&t.ctx, batch(vec![])).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::EmptyBatch)));

        let nozzle = t.nozzle("cng", 0).await;
        let err = engine
            .commit_batch(&t.ctx, batch(vec![reading_input(&nozzle, at(5, 6), 0, 100)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::TankNotFound { .. })));
    }

    #[tokio::test]
    async fn test_nozzle_of_other_branch_is_not_found() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        let nozzle = t.nozzle("petrol", 0).await;
        let outsider = RequestContext::new("u-x", "elsewhere", Role::Staff);

        let err = t
            .db
            .stock()
            .commit_batch(&outsider, batch(vec![reading_input(&nozzle, at(5, 6), 0, 100)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_lines_applied_in_date_order() {
        let t = TestBranch::new().await;
        t.tank("petrol", 20_000, 10_000).await;
        let nozzle = t.nozzle("petrol", 0).await;

        t.db.stock()
            .commit_batch(
                &t.ctx,
                batch(vec![
                    reading_input(&nozzle, at(6, 6), 100, 250),
                    reading_input(&nozzle, at(5, 6), 0, 100),
                ]),
            )
            .await
            .unwrap();

        let advanced = t.db.fuel().get_nozzle(&nozzle.id).await.unwrap().unwrap();
        assert_eq!(advanced.opening_reading, Volume::from_ml(250));
        assert_eq!(level(&t, "petrol").await, Volume::from_ml(9_750));
    }

    #[tokio::test]
    async fn test_stale_plan_cannot_drive_tank_negative() {
        let t = TestBranch::new().await;
        let tank = t.tank("petrol", 20_000, 1_000).await;
        let nozzle = t.nozzle("petrol", 0).await;
        let engine = t.db.stock();

        let plan = engine
            .validate(&t.ctx, "batch-1", vec![reading_input(&nozzle, at(5, 6), 0, 800)])
            .await
            .unwrap();

        // Another writer drains the tank between validation and commit.
        let mut conn = t.db.pool().acquire().await.unwrap();
        assert!(fuel::tx_draw_tank(&mut conn, &tank.id, Volume::from_ml(500)).await.unwrap());
        drop(conn);

        let err = engine.commit_plan(&plan, 1).await.unwrap_err();
        match err {
            DbError::Core(CoreError::InsufficientStock { available, .. }) => {
                assert_eq!(available, Volume::from_ml(500));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert!(t
            .db
            .fuel()
            .list_readings_for_day(&t.branch_id, day("2024-01-05"))
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(BatchState::Committed.is_terminal());
        assert!(BatchState::Rejected.is_terminal());
        assert!(!BatchState::Committing.is_terminal());
        assert_eq!(BatchState::Validating.to_string(), "validating");
    }
}
