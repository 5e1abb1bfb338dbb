//! # Fuelbook Back Office API
//!
//! HTTP surface of the back office: ledger mutations, meter-reading batches
//! and the daily report.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Back Office API                                 │
//! │                                                                         │
//! │  Request ─► TraceLayer ─► TimeoutLayer ─► Caller extractor ─► handler  │
//! │                                                             │           │
//! │                                   LedgerService ◄───────────┤           │
//! │                                   StockReservationEngine ◄──┤           │
//! │                                   DailyTotalsAggregator ◄───┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ServerConfig`]. Environment variables:
//! - `FUELBOOK_CONFIG` - TOML config file path
//! - `FUELBOOK_BIND_ADDR` - listen address (default: 0.0.0.0)
//! - `FUELBOOK_PORT` - HTTP port (default: 8080)
//! - `FUELBOOK_DATABASE_PATH` - SQLite file (default: ./fuelbook.db)
//! - `FUELBOOK_MAX_CONNECTIONS` - pool size (default: 5)
//! - `FUELBOOK_REQUEST_TIMEOUT_SECS` - per-request bound (default: 30)

pub mod config;
pub mod context;
pub mod error;
pub mod routes;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::build_router;

use fuelbook_db::Database;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
