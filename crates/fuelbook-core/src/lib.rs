//! # fuelbook-core: Pure Business Logic for the Fuelbook Back Office
//!
//! This crate holds the rules of the daily cash ledger as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fuelbook Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  back-office-api (axum)                         │   │
//! │  │     /sales  /expenses  /payments  /meter-readings  /reports     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 fuelbook-db (Database Layer)                    │   │
//! │  │   ledger mutators, stock reservation, balance receipts, totals  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ fuelbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────────┐ ┌────────────┐     │   │
//! │  │  │  money   │ │   day    │ │ compensation │ │ validation │     │   │
//! │  │  │  volume  │ │ DayKey   │ │ LedgerPlan   │ │   rules    │     │   │
//! │  │  └──────────┘ └──────────┘ └──────────────┘ └────────────┘     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and mutation inputs
//! - [`money`] / [`volume`] - Integer paise and millilitres
//! - [`day`] - Business-day buckets on a fixed UTC+5:30 calendar
//! - [`compensation`] - Old effect → new effect ledger planning
//! - [`totals`] - Daily cash summary
//! - [`context`] - Caller identity and branch scoping
//! - [`error`] / [`validation`] - Domain errors and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use fuelbook_core::compensation::{plan_deltas, Contribution, Sign};
//! use fuelbook_core::Money;
//!
//! // Moving a 100 sale from Jan 5 to Jan 6 reverses one day and applies the other
//! let deltas = plan_deltas(
//!     Sign::Plus,
//!     Some(Contribution::new("2024-01-05", Money::from_paise(100))),
//!     Some(Contribution::new("2024-01-06", Money::from_paise(100))),
//! );
//! assert_eq!(deltas[0].amount.paise(), -100);
//! assert_eq!(deltas[1].amount.paise(), 100);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compensation;
pub mod context;
pub mod day;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;
pub mod volume;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use compensation::{EntryKind, LedgerEntry, LedgerPlan};
pub use context::{RequestContext, Role};
pub use day::{bucket_of, range_of, DayKey};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::{DailyTotals, DayActivity};
pub use types::*;
pub use volume::Volume;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Offset of the business calendar from UTC, in seconds (UTC+5:30).
///
/// Fixed, with no daylight saving, so day buckets never shift.
pub const BUSINESS_UTC_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

/// Attempts a meter-reading batch commit gets before a conflict is surfaced.
pub const MAX_COMMIT_ATTEMPTS: u32 = 3;
