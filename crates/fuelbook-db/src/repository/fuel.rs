//! # Fuel Repository
//!
//! Nozzles, tanks, stock rows and meter readings.
//!
//! The stock reservation engine reads these during validation and mutates
//! them during its commit. Level changes are conditional updates so a stale
//! validation snapshot can never drive a tank or stock row negative.

use chrono::Utc;
use fuelbook_core::{DayKey, MeterReading, Nozzle, Stock, Tank, Volume};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for fuel equipment and readings.
#[derive(Debug, Clone)]
pub struct FuelRepository {
    pool: SqlitePool,
}

impl FuelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FuelRepository { pool }
    }

    // =========================================================================
    // Nozzles
    // =========================================================================

    /// Gets a nozzle by ID.
    pub async fn get_nozzle(&self, id: &str) -> DbResult<Option<Nozzle>> {
        let mut conn = self.pool.acquire().await?;
        find_nozzle(&mut conn, id).await
    }

    /// Inserts a nozzle (seed data and tests).
    pub async fn insert_nozzle(&self, nozzle: &Nozzle) -> DbResult<()> {
        debug!(id = %nozzle.id, fuel_type = %nozzle.fuel_type, "Inserting nozzle");

        sqlx::query(
            r#"
            INSERT INTO nozzles (id, branch_id, machine_id, fuel_type, opening_reading, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&nozzle.id)
        .bind(&nozzle.branch_id)
        .bind(&nozzle.machine_id)
        .bind(&nozzle.fuel_type)
        .bind(nozzle.opening_reading)
        .bind(nozzle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Tanks
    // =========================================================================

    /// Gets the tank holding `fuel_type` at a branch.
    pub async fn get_tank_for_fuel(&self, branch_id: &str, fuel_type: &str) -> DbResult<Option<Tank>> {
        let mut conn = self.pool.acquire().await?;
        find_tank_for_fuel(&mut conn, branch_id, fuel_type).await
    }

    /// Inserts a tank (seed data and tests).
    pub async fn insert_tank(&self, tank: &Tank) -> DbResult<()> {
        debug!(id = %tank.id, fuel_type = %tank.fuel_type, "Inserting tank");

        sqlx::query(
            r#"
            INSERT INTO tanks (id, branch_id, fuel_type, capacity, current_level, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&tank.id)
        .bind(&tank.branch_id)
        .bind(&tank.fuel_type)
        .bind(tank.capacity)
        .bind(tank.current_level)
        .bind(tank.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Stocks
    // =========================================================================

    /// Gets a branch's stock row for an item.
    pub async fn get_stock(&self, branch_id: &str, item: &str) -> DbResult<Option<Stock>> {
        let mut conn = self.pool.acquire().await?;
        find_stock(&mut conn, branch_id, item).await
    }

    /// Inserts a stock row (seed data and tests).
    pub async fn insert_stock(&self, stock: &Stock) -> DbResult<()> {
        debug!(id = %stock.id, item = %stock.item, "Inserting stock");

        sqlx::query(
            r#"
            INSERT INTO stocks (id, branch_id, item, quantity, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&stock.id)
        .bind(&stock.branch_id)
        .bind(&stock.item)
        .bind(stock.quantity)
        .bind(stock.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Meter readings
    // =========================================================================

    /// Lists a branch's meter readings for one business day.
    pub async fn list_readings_for_day(
        &self,
        branch_id: &str,
        day: DayKey,
    ) -> DbResult<Vec<MeterReading>> {
        let readings = sqlx::query_as::<_, MeterReading>(
            r#"
            SELECT
                id, branch_id, nozzle_id, day, recorded_at, fuel_type,
                opening_reading, closing_reading, difference,
                fuel_rate, total_amount, created_at
            FROM meter_readings
            WHERE branch_id = ?1 AND day = ?2
            ORDER BY recorded_at, created_at
            "#,
        )
        .bind(branch_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(readings)
    }
}

// =============================================================================
// Connection-level helpers used by the stock reservation engine
// =============================================================================

pub(crate) async fn find_nozzle(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Nozzle>> {
    let nozzle = sqlx::query_as::<_, Nozzle>(
        r#"
        SELECT id, branch_id, machine_id, fuel_type, opening_reading, updated_at
        FROM nozzles
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(nozzle)
}

pub(crate) async fn find_tank_for_fuel(
    conn: &mut SqliteConnection,
    branch_id: &str,
    fuel_type: &str,
) -> DbResult<Option<Tank>> {
    let tank = sqlx::query_as::<_, Tank>(
        r#"
        SELECT id, branch_id, fuel_type, capacity, current_level, updated_at
        FROM tanks
        WHERE branch_id = ?1 AND fuel_type = ?2
        "#,
    )
    .bind(branch_id)
    .bind(fuel_type)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(tank)
}

pub(crate) async fn find_stock(
    conn: &mut SqliteConnection,
    branch_id: &str,
    item: &str,
) -> DbResult<Option<Stock>> {
    let stock = sqlx::query_as::<_, Stock>(
        r#"
        SELECT id, branch_id, item, quantity, updated_at
        FROM stocks
        WHERE branch_id = ?1 AND item = ?2
        "#,
    )
    .bind(branch_id)
    .bind(item)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(stock)
}

/// Whether a reading already exists for the nozzle on the given day.
pub(crate) async fn reading_exists(
    conn: &mut SqliteConnection,
    nozzle_id: &str,
    day: DayKey,
) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM meter_readings WHERE nozzle_id = ?1 AND day = ?2",
    )
    .bind(nozzle_id)
    .bind(day)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

pub(crate) async fn tx_insert_reading(
    conn: &mut SqliteConnection,
    reading: &MeterReading,
) -> DbResult<()> {
    debug!(
        id = %reading.id,
        nozzle_id = %reading.nozzle_id,
        day = %reading.day,
        difference = %reading.difference,
        "Inserting meter reading"
    );

    sqlx::query(
        r#"
        INSERT INTO meter_readings (
            id, branch_id, nozzle_id, day, recorded_at, fuel_type,
            opening_reading, closing_reading, difference,
            fuel_rate, total_amount, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&reading.id)
    .bind(&reading.branch_id)
    .bind(&reading.nozzle_id)
    .bind(reading.day)
    .bind(reading.recorded_at)
    .bind(&reading.fuel_type)
    .bind(reading.opening_reading)
    .bind(reading.closing_reading)
    .bind(reading.difference)
    .bind(reading.fuel_rate)
    .bind(reading.total_amount)
    .bind(reading.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Draws `amount` from a tank, only if the tank still holds that much.
///
/// Returns `false` when the level would go negative; the row is untouched.
pub(crate) async fn tx_draw_tank(
    conn: &mut SqliteConnection,
    tank_id: &str,
    amount: Volume,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tanks
        SET current_level = current_level - ?1,
            updated_at = ?2
        WHERE id = ?3 AND current_level >= ?1
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(tank_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Draws `amount` from a stock row, only if the row still holds that much.
pub(crate) async fn tx_draw_stock(
    conn: &mut SqliteConnection,
    stock_id: &str,
    amount: Volume,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE stocks
        SET quantity = quantity - ?1,
            updated_at = ?2
        WHERE id = ?3 AND quantity >= ?1
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(stock_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Moves a nozzle's opening reading to the last committed closing reading.
pub(crate) async fn tx_advance_nozzle(
    conn: &mut SqliteConnection,
    nozzle_id: &str,
    closing_reading: Volume,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE nozzles
        SET opening_reading = ?1,
            updated_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(closing_reading)
    .bind(Utc::now())
    .bind(nozzle_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Nozzle", nozzle_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    fn tank(branch_id: &str, fuel_type: &str, capacity: i64, level: i64) -> Tank {
        Tank {
            id: Uuid::new_v4().to_string(),
            branch_id: branch_id.to_string(),
            fuel_type: fuel_type.to_string(),
            capacity: Volume::from_ml(capacity),
            current_level: Volume::from_ml(level),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_draw_tank_is_conditional() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fuel();
        let t = tank("b1", "petrol", 10_000, 500);
        repo.insert_tank(&t).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(tx_draw_tank(&mut conn, &t.id, Volume::from_ml(300)).await.unwrap());
        assert!(!tx_draw_tank(&mut conn, &t.id, Volume::from_ml(300)).await.unwrap());
        drop(conn);

        let after = repo.get_tank_for_fuel("b1", "petrol").await.unwrap().unwrap();
        assert_eq!(after.current_level, Volume::from_ml(200));
    }

    #[tokio::test]
    async fn test_tank_unique_per_branch_fuel() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fuel();
        repo.insert_tank(&tank("b1", "diesel", 1_000, 0)).await.unwrap();

        let err = repo.insert_tank(&tank("b1", "diesel", 1_000, 0)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        repo.insert_tank(&tank("b2", "diesel", 1_000, 0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_reading_exists_and_advance_nozzle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fuel();
        let nozzle = Nozzle {
            id: Uuid::new_v4().to_string(),
            branch_id: "b1".to_string(),
            machine_id: "m1".to_string(),
            fuel_type: "petrol".to_string(),
            opening_reading: Volume::from_ml(1_000),
            updated_at: Utc::now(),
        };
        repo.insert_nozzle(&nozzle).await.unwrap();

        let day: DayKey = "2024-01-05".parse().unwrap();
        let now = Utc::now();
        let reading = MeterReading {
            id: Uuid::new_v4().to_string(),
            branch_id: "b1".to_string(),
            nozzle_id: nozzle.id.clone(),
            day,
            recorded_at: now,
            fuel_type: "petrol".to_string(),
            opening_reading: Volume::from_ml(1_000),
            closing_reading: Volume::from_ml(1_400),
            difference: Volume::from_ml(400),
            fuel_rate: None,
            total_amount: fuelbook_core::Money::from_rupees(40),
            created_at: now,
        };

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(!reading_exists(&mut conn, &nozzle.id, day).await.unwrap());
        tx_insert_reading(&mut conn, &reading).await.unwrap();
        assert!(reading_exists(&mut conn, &nozzle.id, day).await.unwrap());
        tx_advance_nozzle(&mut conn, &nozzle.id, reading.closing_reading)
            .await
            .unwrap();
        drop(conn);

        let advanced = repo.get_nozzle(&nozzle.id).await.unwrap().unwrap();
        assert_eq!(advanced.opening_reading, Volume::from_ml(1_400));
        assert_eq!(repo.list_readings_for_day("b1", day).await.unwrap().len(), 1);
    }
}
