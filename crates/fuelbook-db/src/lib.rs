//! # fuelbook-db: Database Layer for the Fuelbook Back Office
//!
//! SQLite persistence and every unit of work that writes to it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Fuelbook Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (PATCH /sales/{id})                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    fuelbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ledger/        stock.rs          totals.rs                    │   │
//! │  │   mutators       batch engine      daily report                 │   │
//! │  │      │               │                 │                        │   │
//! │  │      ▼               ▼                 ▼                        │   │
//! │  │   repository/  (balance receipts, banks, parties, entities,     │   │
//! │  │                 fuel)                                           │   │
//! │  │      │                                                          │   │
//! │  │   pool.rs  ── SqlitePool, migrations.rs ── embedded SQL         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Table-level access
//! - [`ledger`] - Create/update/delete with compensating ledger adjustments
//! - [`stock`] - Meter-reading batch validation and commit
//! - [`totals`] - Daily cash report
//! - [`retry`] - Bounded retry on write conflicts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fuelbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("fuelbook.db")).await?;
//! let sale = db.ledger().create_sale(&ctx, input).await?;
//! let report = db.totals().daily_report(&ctx, None, day).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;
pub mod stock;
pub mod totals;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::LedgerService;
pub use pool::{Database, DbConfig};
pub use stock::{BatchOutcome, BatchState, StockReservationEngine};
pub use totals::{DailyReport, DailyTotalsAggregator};
